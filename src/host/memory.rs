use super::listeners::ListenerTable;
use super::types::{DocumentHost, ListenerId, VisibilityListener};
use crate::error::HostError;
use crate::safe_lock;
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-process, fully drivable document host.
///
/// Embedders that receive visibility state from some outer source (a
/// webview callback, an IPC message) define the flag their environment
/// speaks, then push updates with [`set_flag`](Self::set_flag) and
/// [`dispatch`](Self::dispatch). Tests use it the same way.
pub struct MemoryDocument {
    flags: Mutex<HashMap<String, bool>>,
    listeners: ListenerTable,
}

impl MemoryDocument {
    /// A document with no flags defined. Until a flag is defined this is
    /// an unsupported environment.
    pub fn new() -> Self {
        Self {
            flags: Mutex::new(HashMap::new()),
            listeners: ListenerTable::new(),
        }
    }

    /// A document with a single flag already defined.
    pub fn with_flag(name: &str, value: bool) -> Result<Self, HostError> {
        let doc = Self::new();
        doc.define_flag(name, value)?;
        Ok(doc)
    }

    /// Declare a property on the document. Redefining an existing flag
    /// overwrites its value.
    pub fn define_flag(&self, name: &str, value: bool) -> Result<(), HostError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HostError::InvalidInput {
                field: "name",
                reason: "cannot be empty".into(),
            });
        }

        let mut flags = safe_lock(&self.flags, "MemoryDocument");
        flags.insert(name.to_string(), value);
        Ok(())
    }

    /// Update a previously defined property. Does not dispatch any event;
    /// callers decide when the change notification goes out.
    pub fn set_flag(&self, name: &str, value: bool) -> Result<(), HostError> {
        let mut flags = safe_lock(&self.flags, "MemoryDocument");
        match flags.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(HostError::UnknownFlag {
                name: name.to_string(),
            }),
        }
    }

    /// Synchronously invoke every listener registered for `event`, in
    /// registration order, on the calling thread.
    pub fn dispatch(&self, event: &str) {
        for listener in self.listeners.snapshot(event) {
            listener();
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.count(event)
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentHost for MemoryDocument {
    fn flag(&self, name: &str) -> Option<bool> {
        let flags = safe_lock(&self.flags, "MemoryDocument");
        flags.get(name).copied()
    }

    fn add_listener(&self, event: &str, listener: VisibilityListener) -> ListenerId {
        self.listeners.add(event, listener)
    }

    fn remove_listener(&self, event: &str, id: ListenerId) {
        self.listeners.remove(event, id);
    }
}
