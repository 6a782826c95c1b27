//! The seam between the harness and a wearables-pairing SDK.
//!
//! # Architecture
//!
//! ```text
//! IntegrationHarness
//!     |
//!     v
//! Arc<dyn WearablesSdk>
//!     |   configure(&ConfigValues)
//!     |   add_registration_state_listener(cb) --> ListenerSubscription
//!     |   start_registration().await
//!     |   start_unregistration().await
//!     |   handle_url(url).await
//!     v
//! vendor binding / SimulatedSdk
//! ```

pub mod simulated;
pub mod subscription;
pub mod trait_def;
pub mod types;

pub use simulated::{ScriptedFailure, SimulatedSdk, SimulatorSettings};
pub use subscription::ListenerSubscription;
pub use trait_def::WearablesSdk;
pub use types::{RawRegistrationState, RegistrationState, SdkError, SdkErrorKind, StateListener};
