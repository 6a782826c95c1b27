//! Messages delivered to the harness's owning context.

use crate::sdk::{RawRegistrationState, SdkError};

/// An asynchronous SDK command the harness can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkCommand {
    Registration,
    Unregistration,
}

impl SdkCommand {
    /// Name of the SDK operation, as it appears in log lines.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Registration => "startRegistration()",
            Self::Unregistration => "startUnregistration()",
        }
    }
}

/// Everything that reaches the harness from outside its owning context.
///
/// SDK listener callbacks and spawned SDK calls both report through the same
/// channel, so the order events are applied in is the order they completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessEvent {
    /// The SDK reported a registration state. `generation` identifies the
    /// listener registration that delivered it.
    StateChanged {
        generation: u64,
        raw: RawRegistrationState,
    },
    /// A `start_registration` / `start_unregistration` call resolved.
    CommandFinished {
        command: SdkCommand,
        outcome: Result<(), SdkError>,
    },
    /// A `handle_url` call resolved.
    LinkHandled {
        url: String,
        outcome: Result<bool, SdkError>,
    },
    /// The auto-registration timer elapsed.
    AutoRegisterDue,
}
