//! Types shared across the SDK seam: registration state, SDK errors, and the
//! listener callback signature.

use std::fmt;

use serde::{Serialize, Serializer};

/// Raw registration-state code as reported by the SDK.
pub type RawRegistrationState = i64;

/// Callback invoked by the SDK on every registration-state change.
///
/// May be called from any thread; implementations must not block.
pub type StateListener = Box<dyn Fn(RawRegistrationState) + Send + Sync>;

// ---------------------------------------------------------------------------
// RegistrationState
// ---------------------------------------------------------------------------

/// Pairing status reported by the SDK.
///
/// ```text
/// 0 -> unavailable
/// 1 -> available
/// 2 -> registering
/// 3 -> registered
/// _ -> unknown(raw)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationState {
    Unavailable,
    Available,
    Registering,
    Registered,
    /// A code this build does not recognize, kept verbatim so states added
    /// by newer SDK releases still show up.
    Unknown(RawRegistrationState),
}

impl RegistrationState {
    pub const UNAVAILABLE: RawRegistrationState = 0;
    pub const AVAILABLE: RawRegistrationState = 1;
    pub const REGISTERING: RawRegistrationState = 2;
    pub const REGISTERED: RawRegistrationState = 3;

    /// Map a raw SDK code. Total: unrecognized codes become `Unknown(raw)`.
    pub fn from_raw(raw: RawRegistrationState) -> Self {
        match raw {
            Self::UNAVAILABLE => Self::Unavailable,
            Self::AVAILABLE => Self::Available,
            Self::REGISTERING => Self::Registering,
            Self::REGISTERED => Self::Registered,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("unavailable"),
            Self::Available => f.write_str("available"),
            Self::Registering => f.write_str("registering"),
            Self::Registered => f.write_str("registered"),
            Self::Unknown(raw) => write!(f, "unknown({raw})"),
        }
    }
}

impl Serialize for RegistrationState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// SdkError
// ---------------------------------------------------------------------------

/// Category of an SDK failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SdkErrorKind {
    ConfigurationError,
    RegistrationError,
    NetworkError,
    InvalidUrl,
    /// Any category the harness has no dedicated variant for.
    Other(String),
}

impl SdkErrorKind {
    /// Parse a kind name. Unrecognized names become [`SdkErrorKind::Other`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "ConfigurationError" => Self::ConfigurationError,
            "RegistrationError" => Self::RegistrationError,
            "NetworkError" => Self::NetworkError,
            "InvalidUrl" => Self::InvalidUrl,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for SdkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationError => f.write_str("ConfigurationError"),
            Self::RegistrationError => f.write_str("RegistrationError"),
            Self::NetworkError => f.write_str("NetworkError"),
            Self::InvalidUrl => f.write_str("InvalidUrl"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// A failure reported by the SDK.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {description}")]
pub struct SdkError {
    pub kind: SdkErrorKind,
    pub description: String,
}

impl SdkError {
    pub fn new(kind: SdkErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}
