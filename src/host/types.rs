use std::sync::Arc;

/// Handle returned by [`DocumentHost::add_listener`], required for removal.
///
/// Holding the handle is the only way to unsubscribe; there is no
/// callback-identity comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Callback invoked on a visibility change event.
///
/// Carries no payload: the subscriber re-reads the hidden flag from the
/// host, so the event is purely a wake-up.
pub type VisibilityListener = Arc<dyn Fn() + Send + Sync>;

/// A document-like environment the tracker can observe.
///
/// Implementations must deliver events synchronously on whichever thread
/// drives them; the tracker never spawns threads of its own.
pub trait DocumentHost: Send + Sync {
    /// Current value of a named boolean property, or `None` when the
    /// property is not defined on this host.
    fn flag(&self, name: &str) -> Option<bool>;

    /// Register a listener for a named event. Registration is synchronous
    /// and cannot fail; unknown event names simply never fire.
    fn add_listener(&self, event: &str, listener: VisibilityListener) -> ListenerId;

    /// Remove a previously registered listener. Unknown handles are
    /// ignored.
    fn remove_listener(&self, event: &str, id: ListenerId);
}
