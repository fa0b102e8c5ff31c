//! Change notification seam.

use bazaar_types::Notice;
use std::sync::Arc;

/// Receives a notice after every successful state change.
///
/// Implementations must not fail the operation; delivery is best-effort.
pub trait Notifier: Send + Sync {
    /// Publish a notice to interested peers.
    fn notify(&self, notice: Notice);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// A notifier that discards every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notice: Notice) {}
}
