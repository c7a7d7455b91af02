// Scoped completion for legacy asynchronous-capable hooks

use crate::compiler::Callback;
use crate::error::HostError;

/// Owns a legacy completion callback and invokes it exactly once
///
/// `complete` signals success. If the guard is dropped first (early return or
/// unwinding) the callback still fires: with no error on a normal exit, with
/// `HostError::Interrupted` while panicking.
pub(crate) struct Completion {
    event: &'static str,
    callback: Option<Callback>,
}

impl Completion {
    pub(crate) fn new(event: &'static str, callback: Callback) -> Self {
        Self {
            event,
            callback: Some(callback),
        }
    }

    pub(crate) fn complete(mut self) {
        self.fire(None);
    }

    fn fire(&mut self, error: Option<HostError>) {
        if let Some(callback) = self.callback.take() {
            tracing::debug!(event = self.event, ok = error.is_none(), "Signalled completion");
            callback(error);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        let error = std::thread::panicking().then(|| HostError::Interrupted {
            event: self.event.to_string(),
        });
        self.fire(error);
    }
}
