use super::types::{ListenerId, VisibilityListener};
use crate::safe_lock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Event-name-keyed listener registry shared by host implementations.
///
/// Dispatch snapshots the listener list before invoking anything, so a
/// callback may add or remove listeners on the same host without
/// deadlocking. Ids are never reused.
pub(crate) struct ListenerTable {
    entries: Mutex<HashMap<String, Vec<(ListenerId, VisibilityListener)>>>,
    next_id: AtomicU64,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn add(&self, event: &str, listener: VisibilityListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut entries = safe_lock(&self.entries, "ListenerTable");
        entries
            .entry(event.to_string())
            .or_default()
            .push((id, listener));
        id
    }

    pub fn remove(&self, event: &str, id: ListenerId) {
        let mut entries = safe_lock(&self.entries, "ListenerTable");
        if let Some(listeners) = entries.get_mut(event) {
            listeners.retain(|(listener_id, _)| *listener_id != id);
        }
    }

    /// Listeners currently registered for an event, in registration order.
    pub fn snapshot(&self, event: &str) -> Vec<VisibilityListener> {
        let entries = safe_lock(&self.entries, "ListenerTable");
        entries
            .get(event)
            .map(|listeners| {
                listeners
                    .iter()
                    .map(|(_, listener)| VisibilityListener::clone(listener))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count(&self, event: &str) -> usize {
        let entries = safe_lock(&self.entries, "ListenerTable");
        entries.get(event).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_ids_are_unique() {
        let table = ListenerTable::new();
        let a = table.add("change", Arc::new(|| {}));
        let b = table.add("change", Arc::new(|| {}));
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_only_drops_matching_id() {
        let table = ListenerTable::new();
        let a = table.add("change", Arc::new(|| {}));
        let _b = table.add("change", Arc::new(|| {}));

        table.remove("change", a);
        assert_eq!(table.count("change"), 1);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let table = ListenerTable::new();
        let id = table.add("change", Arc::new(|| {}));
        table.remove("change", id);
        // Second removal of the same handle, and removal on an event that
        // was never registered.
        table.remove("change", id);
        table.remove("other", id);
        assert_eq!(table.count("change"), 0);
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        let table = ListenerTable::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in [1, 2, 3] {
            let order = Arc::clone(&order);
            table.add(
                "change",
                Arc::new(move || order.lock().unwrap().push(tag)),
            );
        }

        for listener in table.snapshot("change") {
            listener();
        }
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_listener_may_remove_itself_during_dispatch() {
        let table = Arc::new(ListenerTable::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let table_ref = Arc::clone(&table);
        let calls_ref = Arc::clone(&calls);
        let id_slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));
        let id_slot_ref = Arc::clone(&id_slot);

        let id = table.add(
            "change",
            Arc::new(move || {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                if let Some(id) = *id_slot_ref.lock().unwrap() {
                    table_ref.remove("change", id);
                }
            }),
        );
        *id_slot.lock().unwrap() = Some(id);

        for listener in table.snapshot("change") {
            listener();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(table.count("change"), 0);
    }
}
