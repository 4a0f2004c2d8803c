use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

/// One logical request slot: at most one query is live in it at a time.
///
/// Starting a new request cancels the previous one; the superseded
/// request's rejection is swallowed by its caller, never surfaced as a
/// failure. All tokens are children of the root shutdown token, so
/// teardown cancels whatever is still in flight.
pub struct QuerySlot {
    root: CancellationToken,
    current: Mutex<Option<CancellationToken>>,
}

impl QuerySlot {
    pub fn new(root: CancellationToken) -> Self {
        Self {
            root,
            current: Mutex::new(None),
        }
    }

    /// Cancels any in-flight request in this slot and returns the token
    /// for the new one.
    pub fn begin(&self) -> CancellationToken {
        let mut current = self.current.lock().unwrap();
        if let Some(previous) = current.take() {
            previous.cancel();
        }
        let token = self.root.child_token();
        *current = Some(token.clone());
        token
    }

    pub fn cancel_current(&self) {
        if let Some(token) = self.current.lock().unwrap().take() {
            token.cancel();
        }
    }
}
