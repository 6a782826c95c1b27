//! Handle for an active registration-state listener.

use std::fmt;

use uuid::Uuid;

/// An active listener registration.
///
/// Dropping the handle unsubscribes. The SDK supplies the release closure
/// when it hands the subscription out; it runs at most once.
pub struct ListenerSubscription {
    id: Uuid,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerSubscription {
    /// Create a subscription whose `release` closure removes the listener.
    pub fn new(id: Uuid, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            release: Some(Box::new(release)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Unsubscribe now rather than at drop time.
    pub fn cancel(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for ListenerSubscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for ListenerSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSubscription")
            .field("id", &self.id)
            .field("active", &self.release.is_some())
            .finish()
    }
}
