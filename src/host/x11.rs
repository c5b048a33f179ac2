//! X11-backed document host for Linux desktops.
//!
//! A toplevel window counts as hidden when its `_NET_WM_STATE` property
//! carries `_NET_WM_STATE_HIDDEN` (minimized or otherwise shelved by the
//! window manager). The host exposes the unprefixed `hidden` /
//! `visibilitychange` name pair.

use super::listeners::ListenerTable;
use super::types::{DocumentHost, ListenerId, VisibilityListener};
use crate::api::{STANDARD_CHANGE_EVENT, STANDARD_HIDDEN_FLAG};
use crate::error::HostError;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    Atom, AtomEnum, ChangeWindowAttributesAux, ConnectionExt, EventMask, Window,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

pub struct X11Document {
    conn: RustConnection,
    window: Window,
    wm_state: Atom,
    wm_state_hidden: Atom,
    last_hidden: AtomicBool,
    listeners: ListenerTable,
}

impl X11Document {
    /// Attach to a specific toplevel window.
    pub fn for_window(window: Window) -> Result<Self, HostError> {
        let (conn, _screen_num) = x11rb::connect(None)?;
        Self::attach(conn, window)
    }

    /// Attach to whichever window the window manager reports as active.
    pub fn for_active_window() -> Result<Self, HostError> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or(HostError::NoScreen)?
            .root;

        let active_atom = intern(&conn, "_NET_ACTIVE_WINDOW")?;
        let reply = conn
            .get_property(false, root, active_atom, AtomEnum::WINDOW, 0, 1)?
            .reply()?;
        let window = reply
            .value32()
            .and_then(|mut values| values.next())
            .filter(|window| *window != 0)
            .ok_or(HostError::NoActiveWindow)?;

        Self::attach(conn, window)
    }

    fn attach(conn: RustConnection, window: Window) -> Result<Self, HostError> {
        let wm_state = intern(&conn, "_NET_WM_STATE")?;
        let wm_state_hidden = intern(&conn, "_NET_WM_STATE_HIDDEN")?;

        // Property events are delivered per-client; this does not disturb
        // the event selection of the window's owner.
        conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().event_mask(EventMask::PROPERTY_CHANGE),
        )?
        .check()?;

        let hidden = query_hidden(&conn, window, wm_state, wm_state_hidden)?;

        Ok(Self {
            conn,
            window,
            wm_state,
            wm_state_hidden,
            last_hidden: AtomicBool::new(hidden),
            listeners: ListenerTable::new(),
        })
    }

    /// Drain pending X events on the calling thread and, if the hidden
    /// state changed, notify `visibilitychange` listeners synchronously.
    ///
    /// Never blocks; embedders call this from their own event loop, and
    /// callbacks run on whichever thread pumps.
    pub fn pump(&self) -> Result<(), HostError> {
        let mut state_touched = false;
        while let Some(event) = self.conn.poll_for_event()? {
            if let Event::PropertyNotify(notify) = event {
                if notify.window == self.window && notify.atom == self.wm_state {
                    state_touched = true;
                }
            }
        }

        if state_touched {
            self.refresh()?;
        }
        Ok(())
    }

    /// Re-read the hidden state, dispatching listeners on a transition.
    fn refresh(&self) -> Result<(), HostError> {
        let hidden = query_hidden(&self.conn, self.window, self.wm_state, self.wm_state_hidden)?;

        if self.last_hidden.swap(hidden, Ordering::SeqCst) != hidden {
            let window = self.window;
            debug!("window {window:#x} hidden state changed to {hidden}");
            for listener in self.listeners.snapshot(STANDARD_CHANGE_EVENT) {
                listener();
            }
        }
        Ok(())
    }
}

impl DocumentHost for X11Document {
    fn flag(&self, name: &str) -> Option<bool> {
        // The cache is refreshed by pump() before listeners run, so the
        // update rule's read never needs a server round-trip.
        (name == STANDARD_HIDDEN_FLAG).then_some(self.last_hidden.load(Ordering::SeqCst))
    }

    fn add_listener(&self, event: &str, listener: VisibilityListener) -> ListenerId {
        self.listeners.add(event, listener)
    }

    fn remove_listener(&self, event: &str, id: ListenerId) {
        self.listeners.remove(event, id);
    }
}

fn intern(conn: &RustConnection, name: &str) -> Result<Atom, HostError> {
    Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
}

fn query_hidden(
    conn: &RustConnection,
    window: Window,
    wm_state: Atom,
    wm_state_hidden: Atom,
) -> Result<bool, HostError> {
    let reply = conn
        .get_property(false, window, wm_state, AtomEnum::ATOM, 0, 1024)?
        .reply()?;

    Ok(reply
        .value32()
        .is_some_and(|mut atoms| atoms.any(|atom| atom == wm_state_hidden)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::VisibilityApi;

    #[test]
    #[ignore] // Requires X11 display
    fn test_attach_to_active_window() {
        let doc = X11Document::for_active_window().unwrap();
        assert_eq!(VisibilityApi::detect(&doc), VisibilityApi::Standard);
        doc.pump().unwrap();
    }
}
