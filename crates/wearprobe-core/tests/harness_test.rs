//! Integration tests for the integration harness, driven by a scripted SDK.

use std::sync::Arc;
use std::time::Duration;

use wearprobe_core::config_values::{ConfigKey, ConfigValue};
use wearprobe_core::harness::{HarnessOptions, IntegrationHarness};
use wearprobe_core::sdk::RegistrationState;
use wearprobe_test_utils::{ScriptedSdk, full_source, mwdat_source, sdk_error};

// ===========================================================================
// Helpers
// ===========================================================================

fn harness_with(sdk: &ScriptedSdk, source: toml::Table) -> IntegrationHarness {
    IntegrationHarness::new(Arc::new(sdk.clone()), source, HarnessOptions::default())
}

fn messages(harness: &IntegrationHarness) -> Vec<String> {
    harness.logs().iter().map(|e| e.message.clone()).collect()
}

// ===========================================================================
// Log
// ===========================================================================

#[test]
fn log_length_tracks_appends_since_last_clear() {
    let sdk = ScriptedSdk::new();
    let mut harness = harness_with(&sdk, full_source());

    let batches: [&[&str]; 3] = [&["a", "b", "c"], &[], &["d", "e"]];
    for batch in batches {
        harness.clear_log();
        assert!(harness.logs().is_empty());
        for msg in batch {
            harness.append_log(*msg);
        }
        assert_eq!(harness.logs().len(), batch.len());
        let got: Vec<&str> = harness.logs().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(got, batch.to_vec());
    }
}

#[test]
fn clear_log_empties_regardless_of_length() {
    let sdk = ScriptedSdk::new();
    let mut harness = harness_with(&sdk, full_source());
    for i in 0..100 {
        harness.append_log(format!("line {i}"));
    }
    harness.clear_log();
    assert!(harness.logs().is_empty());
}

// ===========================================================================
// Configuration
// ===========================================================================

#[test]
fn partial_source_fills_absent_markers() {
    let sdk = ScriptedSdk::new();
    let mut harness = harness_with(&sdk, mwdat_source(&[("MetaAppID", "abc123")]));
    harness.initialize();

    let values = harness.config_values().unwrap();
    assert_eq!(
        values.get(ConfigKey::MetaAppId),
        &ConfigValue::Present("abc123".to_string())
    );
    assert_eq!(values.get(ConfigKey::ClientToken).to_string(), "(absent)");
    assert_eq!(values.get(ConfigKey::TeamId).to_string(), "(absent)");
    assert_eq!(values.get(ConfigKey::AppLinkUrlScheme).to_string(), "(absent)");

    let logs: Vec<&str> = harness.logs().iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        &logs[..3],
        [
            "Plist MetaAppID: \"abc123\"",
            "Plist ClientToken: \"(absent)\"",
            "Plist TeamID: \"(absent)\"",
        ]
    );
}

#[test]
fn configure_failure_sets_error_and_success_clears_it() {
    let sdk = ScriptedSdk::new();
    sdk.push_configure(Err(sdk_error("ConfigurationError", "MetaAppID rejected")));
    sdk.push_configure(Ok(()));
    let mut harness = harness_with(&sdk, full_source());

    harness.initialize();
    let err = harness.configure_error().unwrap().to_string();
    assert!(err.contains("MetaAppID rejected"), "unexpected: {err}");
    let last = harness.logs().last().unwrap().message.clone();
    assert!(last.contains("MetaAppID rejected"), "unexpected: {last}");

    assert!(harness.configure());
    assert!(harness.configure_error().is_none());
    assert_eq!(
        harness.logs().last().unwrap().message,
        "✅ Wearables.configure() succeeded"
    );
    assert_eq!(sdk.calls(), vec!["configure", "configure"]);
}

// ===========================================================================
// Registration state
// ===========================================================================

#[tokio::test]
async fn double_subscribe_keeps_one_listener() {
    let sdk = ScriptedSdk::new();
    let mut harness = harness_with(&sdk, full_source());

    assert!(harness.subscribe_to_registration_state());
    assert!(!harness.subscribe_to_registration_state());
    assert_eq!(sdk.active_listeners(), 1);
    assert_eq!(sdk.listeners_added(), 1);

    // One notification, one log line.
    sdk.emit(RegistrationState::REGISTERING);
    assert_eq!(harness.process_pending(), 1);
    assert_eq!(messages(&harness), vec!["Registration state → registering"]);
}

#[tokio::test]
async fn unknown_raw_state_is_carried_through() {
    let sdk = ScriptedSdk::new();
    let mut harness = harness_with(&sdk, full_source());
    harness.subscribe_to_registration_state();

    sdk.emit(7);
    harness.process_next().await;
    assert_eq!(
        harness.registration_state(),
        Some(RegistrationState::Unknown(7))
    );
    assert_eq!(messages(&harness), vec!["Registration state → unknown(7)"]);
}

#[tokio::test]
async fn teardown_unsubscribes_and_ignores_late_notifications() {
    let sdk = ScriptedSdk::new();
    let mut harness = harness_with(&sdk, full_source());
    harness.subscribe_to_registration_state();

    sdk.emit(RegistrationState::AVAILABLE);
    harness.teardown();
    assert_eq!(sdk.active_listeners(), 0);

    harness.process_pending();
    assert_eq!(harness.registration_state(), None);

    assert!(harness.subscribe_to_registration_state());
    assert_eq!(sdk.active_listeners(), 1);
    assert_eq!(sdk.listeners_added(), 2);
}

// ===========================================================================
// Commands
// ===========================================================================

#[tokio::test]
async fn register_network_error_adds_exactly_one_entry() {
    let sdk = ScriptedSdk::new();
    sdk.push_registration(Err(sdk_error("NetworkError", "timeout")));
    let mut harness = harness_with(&sdk, full_source());
    harness.subscribe_to_registration_state();
    sdk.emit(RegistrationState::AVAILABLE);
    harness.process_pending();

    harness.register();
    let dispatched = harness.logs().len();
    assert_eq!(
        harness.logs()[dispatched - 1].message,
        "Calling startRegistration()..."
    );

    harness.run_until_idle().await;
    assert_eq!(harness.logs().len(), dispatched + 1);
    let entry = &harness.logs()[dispatched].message;
    assert!(entry.contains("NetworkError"), "unexpected: {entry}");
    assert!(entry.contains("timeout"), "unexpected: {entry}");
    assert_eq!(
        harness.registration_state(),
        Some(RegistrationState::Available)
    );
}

#[tokio::test]
async fn concurrent_registers_are_not_coalesced() {
    let sdk = ScriptedSdk::new();
    let mut harness = harness_with(&sdk, full_source());

    harness.register();
    harness.register();
    harness.register();
    assert_eq!(harness.in_flight(), 3);
    harness.run_until_idle().await;

    let completed = messages(&harness)
        .iter()
        .filter(|m| *m == "✅ startRegistration() completed")
        .count();
    assert_eq!(completed, 3);
    assert_eq!(
        sdk.calls(),
        vec!["start_registration", "start_registration", "start_registration"]
    );
}

#[tokio::test]
async fn log_reflects_completion_order() {
    let sdk = ScriptedSdk::new();
    let first = sdk.push_registration_gated(Err(sdk_error("RegistrationError", "first")));
    let second = sdk.push_registration_gated(Err(sdk_error("RegistrationError", "second")));
    let mut harness = harness_with(&sdk, full_source());

    harness.register();
    harness.register();
    tokio::task::yield_now().await;

    second.send(()).unwrap();
    harness.process_next().await;
    first.send(()).unwrap();
    harness.process_next().await;

    let logs = messages(&harness);
    assert_eq!(logs.len(), 4);
    assert!(logs[2].ends_with("second"), "unexpected: {logs:?}");
    assert!(logs[3].ends_with("first"), "unexpected: {logs:?}");
}

#[tokio::test(start_paused = true)]
async fn run_for_applies_events_until_the_deadline() {
    let sdk = ScriptedSdk::new();
    let early = sdk.push_registration_gated(Ok(()));
    let late = sdk.push_registration_gated(Ok(()));
    let mut harness = harness_with(&sdk, full_source());

    harness.register();
    harness.register();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let _ = early.send(());
    });

    let started = tokio::time::Instant::now();
    harness.run_for(Duration::from_millis(50)).await;
    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(harness.in_flight(), 1);

    let completed = |h: &IntegrationHarness| {
        messages(h)
            .iter()
            .filter(|m| *m == "✅ startRegistration() completed")
            .count()
    };
    assert_eq!(completed(&harness), 1);

    late.send(()).unwrap();
    harness.run_until_idle().await;
    assert_eq!(harness.in_flight(), 0);
    assert_eq!(completed(&harness), 2);
}

#[tokio::test]
async fn unregister_success_and_failure() {
    let sdk = ScriptedSdk::new();
    sdk.push_unregistration(Ok(()));
    sdk.push_unregistration(Err(sdk_error("RegistrationError", "not registered")));
    let mut harness = harness_with(&sdk, full_source());

    harness.unregister();
    harness.run_until_idle().await;
    harness.unregister();
    harness.run_until_idle().await;

    assert_eq!(
        messages(&harness),
        vec![
            "Calling startUnregistration()...",
            "✅ startUnregistration() completed",
            "Calling startUnregistration()...",
            "❌ startUnregistration() error: RegistrationError - not registered",
        ]
    );
}

#[tokio::test]
async fn link_outcomes_are_logged() {
    let sdk = ScriptedSdk::new();
    sdk.push_link(Ok(true));
    let mut harness = harness_with(&sdk, full_source());

    harness.handle_incoming_link("wearprobe://done");
    harness.run_until_idle().await;
    sdk.push_link(Err(sdk_error("InvalidUrl", "unsupported host")));
    harness.handle_incoming_link("wearprobe://elsewhere");
    harness.run_until_idle().await;

    assert_eq!(
        messages(&harness),
        vec![
            "Deep link received: wearprobe://done",
            "handleUrl result: true",
            "Deep link received: wearprobe://elsewhere",
            "handleUrl error: InvalidUrl - unsupported host",
        ]
    );
    assert!(harness.configure_error().is_none());
}

#[tokio::test]
async fn harness_stays_usable_after_failures() {
    let sdk = ScriptedSdk::new();
    sdk.push_configure(Err(sdk_error("ConfigurationError", "bad token")));
    sdk.push_registration(Err(sdk_error("NetworkError", "offline")));
    let mut harness = harness_with(&sdk, full_source());

    harness.start();
    harness.register();
    harness.run_until_idle().await;
    harness.register();
    harness.run_until_idle().await;

    assert_eq!(
        harness.logs().last().unwrap().message,
        "✅ startRegistration() completed"
    );
    assert_eq!(harness.in_flight(), 0);
}
