//! Point-in-time copy of the harness's observable fields.

use serde::Serialize;

use crate::config_values::ConfigValues;
use crate::sdk::RegistrationState;

/// What a surface needs to render the harness.
#[derive(Debug, Clone, Serialize)]
pub struct HarnessSnapshot {
    pub sdk: String,
    pub config: Option<ConfigValues>,
    pub configure_error: Option<String>,
    pub registration_state: Option<RegistrationState>,
    pub subscribed: bool,
    pub in_flight: usize,
    pub logs: Vec<String>,
}

impl HarnessSnapshot {
    /// Registration state for display; `"unknown"` before the SDK reports.
    pub fn registration_label(&self) -> String {
        self.registration_state
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
