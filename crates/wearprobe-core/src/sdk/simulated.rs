//! In-process stand-in for the wearables SDK.
//!
//! Walks the same registration states a real SDK reports, with a fixed
//! latency per call, and can be told to fail individual operations. Used by
//! the CLI when no vendor binding is linked in.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::subscription::ListenerSubscription;
use super::trait_def::WearablesSdk;
use super::types::{
    RawRegistrationState, RegistrationState, SdkError, SdkErrorKind, StateListener,
};
use crate::config_values::{ConfigKey, ConfigValues};

/// A failure the simulator should report instead of succeeding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedFailure {
    pub kind: String,
    pub description: String,
}

impl ScriptedFailure {
    pub fn to_error(&self) -> SdkError {
        SdkError::new(SdkErrorKind::from_name(&self.kind), self.description.clone())
    }
}

/// Tunables for [`SimulatedSdk`], loadable from the `[simulator]` config
/// section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    /// Delay applied to every asynchronous call, in milliseconds.
    pub latency_ms: u64,
    /// Raw state reported before any registration activity.
    pub initial_state: RawRegistrationState,
    pub fail_configure: Option<ScriptedFailure>,
    pub fail_registration: Option<ScriptedFailure>,
    pub fail_unregistration: Option<ScriptedFailure>,
    pub fail_link: Option<ScriptedFailure>,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            latency_ms: 500,
            initial_state: RegistrationState::AVAILABLE,
            fail_configure: None,
            fail_registration: None,
            fail_unregistration: None,
            fail_link: None,
        }
    }
}

#[derive(Default)]
struct SimState {
    raw: RawRegistrationState,
    configured: bool,
    url_scheme: Option<String>,
}

struct Inner {
    settings: SimulatorSettings,
    state: Mutex<SimState>,
    listeners: Mutex<HashMap<Uuid, Arc<StateListener>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Inner {
    fn set_state(&self, raw: RawRegistrationState) {
        lock(&self.state).raw = raw;
        // Call listeners outside the lock so they may call back in.
        let listeners: Vec<Arc<StateListener>> = lock(&self.listeners).values().cloned().collect();
        debug!(
            state = %RegistrationState::from_raw(raw),
            listeners = listeners.len(),
            "simulated sdk state change"
        );
        for listener in listeners {
            listener(raw);
        }
    }

    fn current(&self) -> RegistrationState {
        RegistrationState::from_raw(lock(&self.state).raw)
    }

    fn ensure_configured(&self) -> Result<(), SdkError> {
        if lock(&self.state).configured {
            Ok(())
        } else {
            Err(SdkError::new(
                SdkErrorKind::ConfigurationError,
                "SDK is not configured",
            ))
        }
    }
}

/// Simulated wearables SDK.
#[derive(Clone)]
pub struct SimulatedSdk {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SimulatedSdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedSdk")
            .field("settings", &self.inner.settings)
            .field("state", &self.inner.current())
            .finish()
    }
}

impl SimulatedSdk {
    pub fn new(settings: SimulatorSettings) -> Self {
        let state = SimState {
            raw: settings.initial_state,
            ..SimState::default()
        };
        Self {
            inner: Arc::new(Inner {
                settings,
                state: Mutex::new(state),
                listeners: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Current simulated state.
    pub fn state(&self) -> RegistrationState {
        self.inner.current()
    }

    /// Number of listeners currently registered.
    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }

    /// Push an arbitrary raw state to every listener, as an SDK update
    /// introducing new states would.
    pub fn inject_state(&self, raw: RawRegistrationState) {
        self.inner.set_state(raw);
    }

    async fn latency(&self) {
        let ms = self.inner.settings.latency_ms;
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl WearablesSdk for SimulatedSdk {
    fn name(&self) -> &str {
        "simulated"
    }

    fn configure(&self, config: &ConfigValues) -> Result<(), SdkError> {
        if let Some(failure) = &self.inner.settings.fail_configure {
            return Err(failure.to_error());
        }
        for key in [ConfigKey::MetaAppId, ConfigKey::ClientToken] {
            if !config.get(key).is_present() {
                return Err(SdkError::new(
                    SdkErrorKind::ConfigurationError,
                    format!("{key} is missing from the configuration"),
                ));
            }
        }

        let mut state = lock(&self.inner.state);
        state.configured = true;
        state.url_scheme = config
            .get(ConfigKey::AppLinkUrlScheme)
            .as_deref()
            .map(str::to_owned);
        Ok(())
    }

    fn add_registration_state_listener(&self, listener: StateListener) -> ListenerSubscription {
        let id = Uuid::new_v4();
        let listener = Arc::new(listener);
        lock(&self.inner.listeners).insert(id, Arc::clone(&listener));

        // New listeners hear the current state right away.
        let current = lock(&self.inner.state).raw;
        listener(current);

        let inner = Arc::downgrade(&self.inner);
        ListenerSubscription::new(id, move || {
            if let Some(inner) = inner.upgrade() {
                lock(&inner.listeners).remove(&id);
            }
        })
    }

    async fn start_registration(&self) -> Result<(), SdkError> {
        self.inner.ensure_configured()?;
        if let Some(failure) = &self.inner.settings.fail_registration {
            self.latency().await;
            return Err(failure.to_error());
        }
        if self.inner.current() == RegistrationState::Registered {
            return Err(SdkError::new(
                SdkErrorKind::RegistrationError,
                "already registered",
            ));
        }

        self.inner.set_state(RegistrationState::REGISTERING);
        self.latency().await;
        self.inner.set_state(RegistrationState::REGISTERED);
        Ok(())
    }

    async fn start_unregistration(&self) -> Result<(), SdkError> {
        self.inner.ensure_configured()?;
        if let Some(failure) = &self.inner.settings.fail_unregistration {
            self.latency().await;
            return Err(failure.to_error());
        }
        if self.inner.current() != RegistrationState::Registered {
            return Err(SdkError::new(
                SdkErrorKind::RegistrationError,
                "not registered",
            ));
        }

        self.latency().await;
        self.inner.set_state(RegistrationState::AVAILABLE);
        Ok(())
    }

    async fn handle_url(&self, url: &str) -> Result<bool, SdkError> {
        let Some((scheme, _)) = url.split_once(':') else {
            return Err(SdkError::new(
                SdkErrorKind::InvalidUrl,
                format!("no scheme in {url:?}"),
            ));
        };
        if scheme.is_empty() {
            return Err(SdkError::new(
                SdkErrorKind::InvalidUrl,
                format!("empty scheme in {url:?}"),
            ));
        }

        self.latency().await;
        if let Some(failure) = &self.inner.settings.fail_link {
            return Err(failure.to_error());
        }

        let expected = lock(&self.inner.state).url_scheme.clone();
        Ok(expected.is_some_and(|s| s.eq_ignore_ascii_case(scheme)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
