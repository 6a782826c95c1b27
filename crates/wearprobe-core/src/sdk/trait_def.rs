//! The `WearablesSdk` trait -- the contract the harness expects from a
//! wearables-pairing SDK binding.
//!
//! The trait is object-safe so the harness can hold an
//! `Arc<dyn WearablesSdk>` and hand clones of it to spawned tasks.

use async_trait::async_trait;

use super::subscription::ListenerSubscription;
use super::types::{SdkError, StateListener};
use crate::config_values::ConfigValues;

/// A wearables-pairing SDK client.
///
/// Implementors wrap a concrete SDK (or stand in for one, see
/// [`super::SimulatedSdk`]) and report failures as [`SdkError`] values.
#[async_trait]
pub trait WearablesSdk: Send + Sync {
    /// Human-readable name for this binding (e.g. "simulated").
    fn name(&self) -> &str;

    /// Configure the SDK from the values read at startup. Synchronous.
    fn configure(&self, config: &ConfigValues) -> Result<(), SdkError>;

    /// Register `listener` for registration-state changes.
    ///
    /// The listener stays registered until the returned subscription is
    /// dropped or cancelled.
    fn add_registration_state_listener(&self, listener: StateListener) -> ListenerSubscription;

    /// Begin registration. Resolves when the SDK has accepted or rejected
    /// the request; the resulting state changes arrive via listeners.
    async fn start_registration(&self) -> Result<(), SdkError>;

    /// Begin unregistration.
    async fn start_unregistration(&self) -> Result<(), SdkError>;

    /// Offer an incoming app link to the SDK. Returns whether the SDK
    /// recognized and consumed it.
    async fn handle_url(&self, url: &str) -> Result<bool, SdkError>;
}

// Compile-time assertion: WearablesSdk must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn WearablesSdk) {}
};

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// A binding that accepts everything and never notifies.
    struct NoopSdk;

    #[async_trait]
    impl WearablesSdk for NoopSdk {
        fn name(&self) -> &str {
            "noop"
        }

        fn configure(&self, _config: &ConfigValues) -> Result<(), SdkError> {
            Ok(())
        }

        fn add_registration_state_listener(&self, _listener: StateListener) -> ListenerSubscription {
            ListenerSubscription::new(Uuid::nil(), || {})
        }

        async fn start_registration(&self) -> Result<(), SdkError> {
            Ok(())
        }

        async fn start_unregistration(&self) -> Result<(), SdkError> {
            Ok(())
        }

        async fn handle_url(&self, _url: &str) -> Result<bool, SdkError> {
            Ok(false)
        }
    }

    #[test]
    fn sdk_is_object_safe() {
        let sdk: Box<dyn WearablesSdk> = Box::new(NoopSdk);
        assert_eq!(sdk.name(), "noop");
    }

    #[tokio::test]
    async fn noop_sdk_calls_succeed() {
        let sdk: Box<dyn WearablesSdk> = Box::new(NoopSdk);

        sdk.configure(&ConfigValues::all_absent()).unwrap();
        sdk.start_registration().await.unwrap();
        sdk.start_unregistration().await.unwrap();
        assert!(!sdk.handle_url("app://x").await.unwrap());

        let sub = sdk.add_registration_state_listener(Box::new(|_| {}));
        assert_eq!(sub.id(), Uuid::nil());
    }
}
