//! The integration harness: mediates between a user-facing surface and a
//! wearables SDK.
//!
//! The harness is owned by a single task. Surfaces call its methods and read
//! its observable fields through `&`/`&mut` access on that task. SDK calls
//! run as spawned tasks and report back through an mpsc channel, as do the
//! SDK's state-change callbacks; the owning task applies those messages with
//! [`IntegrationHarness::process_next`] and friends.
//!
//! ```text
//! surface --register()--> harness --spawn--> sdk.start_registration()
//!                            ^                       |
//!                            |   HarnessEvent::CommandFinished
//!                            +---------- channel ----+
//!                            ^
//!                            |   HarnessEvent::StateChanged
//!                  sdk listener callback
//! ```
//!
//! SDK failures never escape: they become log entries (and, for
//! configuration, the [`IntegrationHarness::configure_error`] field).

pub mod events;
pub mod snapshot;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config_values::{ConfigKey, ConfigValues, SECTION};
use crate::event_log::{EventLog, LogEntry};
use crate::sdk::{ListenerSubscription, RegistrationState, SdkError, SdkErrorKind, WearablesSdk};

pub use events::{HarnessEvent, SdkCommand};
pub use snapshot::HarnessSnapshot;

/// Optional harness behavior.
#[derive(Debug, Clone, Default)]
pub struct HarnessOptions {
    /// When set, [`IntegrationHarness::start`] schedules a `register()` this
    /// long after startup. Used for unattended test runs.
    pub auto_register: Option<Duration>,
}

struct ActiveSubscription {
    handle: ListenerSubscription,
    generation: u64,
}

/// Mediates all interaction between a surface and a [`WearablesSdk`].
pub struct IntegrationHarness {
    sdk: Arc<dyn WearablesSdk>,
    source: toml::Table,
    options: HarnessOptions,

    config: Option<ConfigValues>,
    configure_error: Option<String>,
    registration_state: Option<RegistrationState>,
    log: EventLog,

    subscription: Option<ActiveSubscription>,
    listener_generation: u64,
    in_flight: usize,

    tx: mpsc::UnboundedSender<HarnessEvent>,
    rx: mpsc::UnboundedReceiver<HarnessEvent>,
}

impl std::fmt::Debug for IntegrationHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationHarness")
            .field("sdk", &self.sdk.name())
            .field("registration_state", &self.registration_state)
            .field("subscribed", &self.subscription.is_some())
            .field("in_flight", &self.in_flight)
            .field("log_len", &self.log.len())
            .finish()
    }
}

impl IntegrationHarness {
    /// Create a harness around `sdk`. `source` is the static configuration
    /// source; it is not read until [`Self::initialize`].
    pub fn new(sdk: Arc<dyn WearablesSdk>, source: toml::Table, options: HarnessOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sdk,
            source,
            options,
            config: None,
            configure_error: None,
            registration_state: None,
            log: EventLog::new(),
            subscription: None,
            listener_generation: 0,
            in_flight: 0,
            tx,
            rx,
        }
    }

    /// Startup sequence: initialize, subscribe, and arm the auto-register
    /// timer if one is configured.
    pub fn start(&mut self) {
        self.initialize();
        self.subscribe_to_registration_state();
        if let Some(delay) = self.options.auto_register {
            self.schedule_register(delay);
        }
    }

    // -- Configuration --

    /// Read the configuration values (first call only) and configure the SDK.
    pub fn initialize(&mut self) {
        self.ensure_config_read();
        self.configure();
    }

    /// Call the SDK's `configure`. Returns whether it succeeded.
    ///
    /// Failure is recorded in [`Self::configure_error`] as well as the log;
    /// success clears any earlier error.
    pub fn configure(&mut self) -> bool {
        self.ensure_config_read();
        let Some(config) = self.config.as_ref() else {
            return false;
        };
        match self.sdk.configure(config) {
            Ok(()) => {
                info!(sdk = self.sdk.name(), "sdk configured");
                self.append_log("✅ Wearables.configure() succeeded");
                self.configure_error = None;
                true
            }
            Err(e) => {
                warn!(sdk = self.sdk.name(), error = %e, "sdk configure failed");
                self.append_log(format!("❌ Wearables.configure() failed: {e}"));
                self.configure_error = Some(e.to_string());
                false
            }
        }
    }

    fn ensure_config_read(&mut self) {
        let source = &self.source;
        let log = &mut self.log;
        self.config.get_or_insert_with(|| {
            let read = ConfigValues::read_from(source);
            if read.section_found {
                for (key, value) in read.values.iter() {
                    if key != ConfigKey::AppLinkUrlScheme {
                        log.append(format!("Plist {key}: \"{value}\""));
                    }
                }
            } else {
                warn!(section = SECTION, "configuration section missing");
                log.append(format!("⚠️ {SECTION} key not found in configuration source"));
            }
            read.values
        });
    }

    // -- Registration state --

    /// Register for SDK state notifications.
    ///
    /// Returns `false` without doing anything if a subscription is already
    /// active; call [`Self::teardown`] first to replace it.
    pub fn subscribe_to_registration_state(&mut self) -> bool {
        if let Some(active) = &self.subscription {
            debug!(subscription = %active.handle.id(), "already subscribed; ignoring");
            return false;
        }

        self.listener_generation += 1;
        let generation = self.listener_generation;
        let tx = self.tx.clone();
        let handle = self
            .sdk
            .add_registration_state_listener(Box::new(move |raw| {
                // The receiver is gone only once the harness is dropped.
                let _ = tx.send(HarnessEvent::StateChanged { generation, raw });
            }));

        info!(subscription = %handle.id(), generation, "subscribed to registration state");
        self.subscription = Some(ActiveSubscription { handle, generation });
        true
    }

    /// Release the state subscription, if any.
    pub fn teardown(&mut self) {
        if let Some(active) = self.subscription.take() {
            let id = active.handle.id();
            active.handle.cancel();
            info!(subscription = %id, "unsubscribed from registration state");
            self.append_log("Registration state listener removed");
        }
    }

    // -- Commands --

    /// Ask the SDK to start registration. Returns immediately; the outcome
    /// is logged when it arrives.
    pub fn register(&mut self) {
        self.dispatch(SdkCommand::Registration);
    }

    /// Ask the SDK to start unregistration.
    pub fn unregister(&mut self) {
        self.dispatch(SdkCommand::Unregistration);
    }

    fn dispatch(&mut self, command: SdkCommand) {
        self.append_log(format!("Calling {}...", command.operation()));
        debug!(operation = command.operation(), "dispatching sdk command");

        let sdk = Arc::clone(&self.sdk);
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = match command {
                SdkCommand::Registration => {
                    guarded(async move { sdk.start_registration().await }).await
                }
                SdkCommand::Unregistration => {
                    guarded(async move { sdk.start_unregistration().await }).await
                }
            };
            let _ = tx.send(HarnessEvent::CommandFinished { command, outcome });
        });
    }

    /// Forward an incoming app link to the SDK.
    pub fn handle_incoming_link(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.append_log(format!("Deep link received: {url}"));

        let sdk = Arc::clone(&self.sdk);
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let call_url = url.clone();
            let outcome = guarded(async move { sdk.handle_url(&call_url).await }).await;
            let _ = tx.send(HarnessEvent::LinkHandled { url, outcome });
        });
    }

    /// Call [`Self::register`] after `delay`.
    pub fn schedule_register(&mut self, delay: Duration) {
        info!(?delay, "auto-registration scheduled");
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(HarnessEvent::AutoRegisterDue);
        });
    }

    // -- Log --

    /// Append a timestamped entry to the log.
    pub fn append_log(&mut self, message: impl Into<String>) {
        self.log.append(message);
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    // -- Event pumping --

    /// Wait for the next inbound event without applying it.
    pub async fn next_event(&mut self) -> Option<HarnessEvent> {
        self.rx.recv().await
    }

    /// Apply one inbound event to the observable state.
    pub fn apply(&mut self, event: HarnessEvent) {
        match event {
            HarnessEvent::StateChanged { generation, raw } => {
                let current = self.subscription.as_ref().map(|s| s.generation);
                if current != Some(generation) {
                    debug!(generation, raw, "dropping notification from released listener");
                    return;
                }
                let state = RegistrationState::from_raw(raw);
                info!(%state, raw, "registration state changed");
                self.registration_state = Some(state);
                self.append_log(format!("Registration state → {state}"));
            }
            HarnessEvent::CommandFinished { command, outcome } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match outcome {
                    Ok(()) => {
                        info!(operation = command.operation(), "sdk command completed");
                        self.append_log(format!("✅ {} completed", command.operation()));
                    }
                    Err(e) => {
                        warn!(operation = command.operation(), error = %e, "sdk command failed");
                        self.append_log(format!(
                            "❌ {} error: {} - {}",
                            command.operation(),
                            e.kind,
                            e.description
                        ));
                    }
                }
            }
            HarnessEvent::LinkHandled { url, outcome } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match outcome {
                    Ok(handled) => {
                        info!(%url, handled, "link handled");
                        self.append_log(format!("handleUrl result: {handled}"));
                    }
                    Err(e) => {
                        warn!(%url, error = %e, "link handling failed");
                        self.append_log(format!("handleUrl error: {} - {}", e.kind, e.description));
                    }
                }
            }
            HarnessEvent::AutoRegisterDue => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.append_log("Auto-registration timer fired");
                self.register();
            }
        }
    }

    /// Wait for one event and apply it. Returns `false` if the channel is
    /// closed.
    pub async fn process_next(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    /// Apply every event that is already queued. Returns how many were
    /// applied.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Process events until no dispatched SDK call is outstanding, then drain
    /// whatever else is queued.
    pub async fn run_until_idle(&mut self) {
        while self.in_flight > 0 {
            if !self.process_next().await {
                break;
            }
        }
        self.process_pending();
    }

    /// Process events as they arrive for `duration`.
    pub async fn run_for(&mut self, duration: Duration) {
        let deadline = tokio::time::Instant::now() + duration;
        while let Ok(Some(event)) = tokio::time::timeout_at(deadline, self.next_event()).await {
            self.apply(event);
        }
    }

    // -- Observable fields --

    /// Configuration values, once read.
    pub fn config_values(&self) -> Option<&ConfigValues> {
        self.config.as_ref()
    }

    /// Rendering of the most recent `configure` failure, if the last attempt
    /// failed.
    pub fn configure_error(&self) -> Option<&str> {
        self.configure_error.as_deref()
    }

    /// Latest state reported by the SDK; `None` before the first report.
    pub fn registration_state(&self) -> Option<RegistrationState> {
        self.registration_state
    }

    pub fn logs(&self) -> &[LogEntry] {
        self.log.entries()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Number of dispatched SDK calls (and armed timers) not yet reported.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn snapshot(&self) -> HarnessSnapshot {
        HarnessSnapshot {
            sdk: self.sdk.name().to_string(),
            config: self.config.clone(),
            configure_error: self.configure_error.clone(),
            registration_state: self.registration_state,
            subscribed: self.subscription.is_some(),
            in_flight: self.in_flight,
            logs: self.log.entries().iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Run an SDK future on its own task so a panicking binding turns into an
/// [`SdkError`] instead of a lost completion.
async fn guarded<T, F>(call: F) -> Result<T, SdkError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, SdkError>> + Send + 'static,
{
    match tokio::spawn(call).await {
        Ok(outcome) => outcome,
        Err(join_err) => Err(SdkError::new(
            SdkErrorKind::Other("Panic".to_string()),
            join_err.to_string(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
