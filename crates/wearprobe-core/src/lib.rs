//! Core of `wearprobe`: an integration harness for manually exercising a
//! wearables-pairing SDK.
//!
//! - [`sdk`] -- the [`sdk::WearablesSdk`] contract and a simulated binding.
//! - [`harness`] -- [`harness::IntegrationHarness`], which turns SDK calls,
//!   callbacks and failures into observable state and log entries.
//! - [`config_values`] -- the read-once configuration keys.
//! - [`event_log`] -- the append-only timestamped log.

pub mod config_values;
pub mod event_log;
pub mod harness;
pub mod sdk;

pub use config_values::{ConfigKey, ConfigValue, ConfigValues};
pub use harness::{HarnessOptions, IntegrationHarness};
