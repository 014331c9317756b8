//! Bounded-wait device resolution
//!
//! The discovery handshake: install a one-shot connect handler, block until
//! the first connected device is reported or the window expires, and leave no
//! registration behind either way.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use tracing::debug;

use crate::audio::device::{ConnectFlow, DeviceEvents};

/// Handoff state shared between the waiting thread and the connect handler,
/// which runs on a collaborator-owned thread.
struct ResolveState<H> {
    found: Mutex<Option<H>>,
    cond: Condvar,
}

/// Waits up to `timeout` for the first connected device reported by `events`.
///
/// The handler may fire before the wait begins; capture and signaling happen
/// under the same mutex the wait predicate reads, so an early event is never
/// lost. Only the first connected device counts: the handler deregisters
/// itself on capture, and the registration is also cleared on the timeout
/// path so a late connect event cannot capture a stale handle.
///
/// Returns `None` when no device connects within the window; that is a normal
/// outcome, not a failure.
pub fn resolve<E: DeviceEvents>(events: &E, timeout: Duration) -> Option<E::Handle> {
    let state = Arc::new(ResolveState {
        found: Mutex::new(None),
        cond: Condvar::new(),
    });

    let shared = Arc::clone(&state);
    events.set_connect_handler(Some(Box::new(move |handle, connected| {
        if !connected {
            return ConnectFlow::Keep;
        }

        let mut found = shared.found.lock().unwrap();
        if found.is_none() {
            *found = Some(handle);
            shared.cond.notify_one();
        }
        ConnectFlow::Deregister
    })));

    let guard = state.found.lock().unwrap();
    let (mut guard, wait_result) = state
        .cond
        .wait_timeout_while(guard, timeout, |found| found.is_none())
        .unwrap();
    let handle = guard.take();
    drop(guard);

    // Clear the registration even when the handler never fired.
    events.set_connect_handler(None);

    if handle.is_none() && wait_result.timed_out() {
        debug!("device discovery window expired after {timeout:?}");
    }
    handle
}
