use crate::api::VisibilityApi;
use crate::host::{DocumentHost, ListenerId};
use crate::safe_lock;
use log::{debug, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Snapshot of the tracker's observable flags.
///
/// Serializes with camelCase field names so embedders can hand it straight
/// to a frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityState {
    pub visible: bool,
    pub ever_lost_visibility: bool,
}

struct TrackerFlags {
    visible: AtomicBool,
    ever_lost_visibility: AtomicBool,
    stopped: AtomicBool,
}

impl TrackerFlags {
    fn new() -> Self {
        Self {
            visible: AtomicBool::new(true),
            ever_lost_visibility: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    /// Update rule, run once at startup and on every change event: re-read
    /// the hidden flag, latch if hidden, mirror into `visible`.
    fn apply(&self, host: &dyn DocumentHost, flag_name: &str) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }

        // A flag that vanished from the host reads as not hidden.
        let hidden = host.flag(flag_name).unwrap_or(false);

        // Latch before the visible store: no reader may observe the
        // hidden state with the latch still unset.
        if hidden {
            self.ever_lost_visibility.store(true, Ordering::SeqCst);
        }
        self.visible.store(!hidden, Ordering::SeqCst);
    }
}

/// Tracks whether the observed document has ever lost visibility. This
/// happens when the user switches tabs, minimizes the window, etc.
///
/// The capability is detected once at construction; `start()` subscribes
/// to the host's change event and `stop()` unsubscribes. On a host with no
/// visibility support the flags simply stay at their defaults.
pub struct VisibilityTracker {
    host: Arc<dyn DocumentHost>,
    api: VisibilityApi,
    flags: Arc<TrackerFlags>,
    listener: Mutex<Option<ListenerId>>,
    started: AtomicBool,
}

impl VisibilityTracker {
    pub fn new(host: Arc<dyn DocumentHost>) -> Self {
        let api = VisibilityApi::detect(host.as_ref());
        Self {
            host,
            api,
            flags: Arc::new(TrackerFlags::new()),
            listener: Mutex::new(None),
            started: AtomicBool::new(false),
        }
    }

    /// Evaluate the current hidden state and subscribe to change events.
    ///
    /// The initial evaluation runs synchronously before the listener is
    /// registered, so a page that loads already hidden is observed. Only
    /// the first call does anything; the lifecycle is one-shot.
    pub fn start(&self) {
        if self.flags.stopped.load(Ordering::SeqCst) {
            warn!("visibility tracker already stopped, ignoring start");
            return;
        }
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("visibility tracker already started");
            return;
        }

        let (Some(flag_name), Some(event_name)) = (self.api.hidden_flag(), self.api.event_name())
        else {
            debug!("host has no visibility support, flags stay at defaults");
            return;
        };

        self.flags.apply(self.host.as_ref(), flag_name);

        let flags = Arc::clone(&self.flags);
        let host = Arc::clone(&self.host);
        let id = self
            .host
            .add_listener(event_name, Arc::new(move || flags.apply(host.as_ref(), flag_name)));
        *safe_lock(&self.listener, "VisibilityTracker") = Some(id);

        debug!("visibility tracker listening for {event_name}");
    }

    /// Unsubscribe from the host. Idempotent; safe to call without a prior
    /// `start()`. A change event already in flight becomes a no-op.
    pub fn stop(&self) {
        self.flags.stopped.store(true, Ordering::SeqCst);

        let retained = safe_lock(&self.listener, "VisibilityTracker").take();
        if let Some(id) = retained {
            if let Some(event_name) = self.api.event_name() {
                self.host.remove_listener(event_name, id);
                debug!("visibility tracker unsubscribed from {event_name}");
            }
        }
    }

    /// Whether the document is currently visible. Defaults to `true` and
    /// never changes on an unsupported host.
    pub fn visible(&self) -> bool {
        self.flags.visible.load(Ordering::SeqCst)
    }

    /// One-way latch: `true` once the document has been hidden at least
    /// once, never cleared afterwards.
    pub fn ever_lost_visibility(&self) -> bool {
        self.flags.ever_lost_visibility.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> VisibilityState {
        // Read visible before the latch; together with the store order in
        // apply() this keeps `visible == false, latch unset` unobservable.
        let visible = self.visible();
        let ever_lost_visibility = self.ever_lost_visibility();
        VisibilityState {
            visible,
            ever_lost_visibility,
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.flags.stopped.load(Ordering::SeqCst)
    }

    /// The capability selected at construction.
    pub fn api(&self) -> VisibilityApi {
        self.api
    }
}

impl Drop for VisibilityTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
