//! Shared test utilities for wearprobe integration tests.
//!
//! Provides [`ScriptedSdk`], a [`WearablesSdk`] test double whose outcomes
//! are queued up front and whose asynchronous calls can be held open until
//! the test releases them, so completion order is under the test's control.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;
use uuid::Uuid;

use wearprobe_core::config_values::ConfigValues;
use wearprobe_core::sdk::{
    ListenerSubscription, RawRegistrationState, SdkError, SdkErrorKind, StateListener,
    WearablesSdk,
};

/// One queued outcome, optionally held until a gate is released.
struct Step<T> {
    outcome: T,
    gate: Option<oneshot::Receiver<()>>,
}

#[derive(Default)]
struct Script {
    configure: VecDeque<Result<(), SdkError>>,
    registration: VecDeque<Step<Result<(), SdkError>>>,
    unregistration: VecDeque<Step<Result<(), SdkError>>>,
    links: VecDeque<Step<Result<bool, SdkError>>>,
    calls: Vec<String>,
}

#[derive(Default)]
struct Listeners {
    active: HashMap<Uuid, Arc<StateListener>>,
    added: usize,
}

/// Scriptable SDK double.
///
/// Unscripted calls succeed (`handle_url` returns `false`).
#[derive(Clone, Default)]
pub struct ScriptedSdk {
    script: Arc<Mutex<Script>>,
    listeners: Arc<Mutex<Listeners>>,
}

impl ScriptedSdk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_configure(&self, outcome: Result<(), SdkError>) {
        self.script.lock().unwrap().configure.push_back(outcome);
    }

    pub fn push_registration(&self, outcome: Result<(), SdkError>) {
        self.script.lock().unwrap().registration.push_back(Step {
            outcome,
            gate: None,
        });
    }

    /// Queue a registration outcome that is not delivered until the returned
    /// sender fires (or is dropped).
    pub fn push_registration_gated(&self, outcome: Result<(), SdkError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().unwrap().registration.push_back(Step {
            outcome,
            gate: Some(rx),
        });
        tx
    }

    pub fn push_unregistration(&self, outcome: Result<(), SdkError>) {
        self.script.lock().unwrap().unregistration.push_back(Step {
            outcome,
            gate: None,
        });
    }

    pub fn push_link(&self, outcome: Result<bool, SdkError>) {
        self.script.lock().unwrap().links.push_back(Step {
            outcome,
            gate: None,
        });
    }

    /// Deliver `raw` to every active listener.
    pub fn emit(&self, raw: RawRegistrationState) {
        let listeners: Vec<Arc<StateListener>> =
            self.listeners.lock().unwrap().active.values().cloned().collect();
        for listener in listeners {
            listener(raw);
        }
    }

    /// Listeners currently registered.
    pub fn active_listeners(&self) -> usize {
        self.listeners.lock().unwrap().active.len()
    }

    /// Listeners ever registered.
    pub fn listeners_added(&self) -> usize {
        self.listeners.lock().unwrap().added
    }

    /// Names of the SDK operations invoked so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.script.lock().unwrap().calls.push(call.into());
    }
}

async fn resolve<T>(step: Option<Step<T>>, default: T) -> T {
    match step {
        Some(Step { outcome, gate }) => {
            if let Some(gate) = gate {
                // A dropped sender releases the gate too.
                let _ = gate.await;
            }
            outcome
        }
        None => default,
    }
}

#[async_trait]
impl WearablesSdk for ScriptedSdk {
    fn name(&self) -> &str {
        "scripted"
    }

    fn configure(&self, _config: &ConfigValues) -> Result<(), SdkError> {
        self.record("configure");
        self.script
            .lock()
            .unwrap()
            .configure
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn add_registration_state_listener(&self, listener: StateListener) -> ListenerSubscription {
        self.record("add_registration_state_listener");
        let id = Uuid::new_v4();
        {
            let mut listeners = self.listeners.lock().unwrap();
            listeners.active.insert(id, Arc::new(listener));
            listeners.added += 1;
        }
        let listeners = Arc::clone(&self.listeners);
        ListenerSubscription::new(id, move || {
            listeners.lock().unwrap().active.remove(&id);
        })
    }

    async fn start_registration(&self) -> Result<(), SdkError> {
        self.record("start_registration");
        let step = self.script.lock().unwrap().registration.pop_front();
        resolve(step, Ok(())).await
    }

    async fn start_unregistration(&self) -> Result<(), SdkError> {
        self.record("start_unregistration");
        let step = self.script.lock().unwrap().unregistration.pop_front();
        resolve(step, Ok(())).await
    }

    async fn handle_url(&self, url: &str) -> Result<bool, SdkError> {
        self.record(format!("handle_url {url}"));
        let step = self.script.lock().unwrap().links.pop_front();
        resolve(step, Ok(false)).await
    }
}

/// Shorthand for an [`SdkError`] with a named kind.
pub fn sdk_error(kind: &str, description: &str) -> SdkError {
    SdkError::new(SdkErrorKind::from_name(kind), description)
}

/// Build a static configuration source with the given `MWDAT` entries.
pub fn mwdat_source(entries: &[(&str, &str)]) -> toml::Table {
    let mut section = toml::Table::new();
    for (key, value) in entries {
        section.insert((*key).to_string(), toml::Value::String((*value).to_string()));
    }
    let mut root = toml::Table::new();
    root.insert("MWDAT".to_string(), toml::Value::Table(section));
    root
}

/// A source with every recognized key present.
pub fn full_source() -> toml::Table {
    mwdat_source(&[
        ("MetaAppID", "app-123"),
        ("ClientToken", "token-abc"),
        ("TeamID", "TEAM42"),
        ("AppLinkURLScheme", "wearprobe"),
    ])
}
