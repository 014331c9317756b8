//! Output device discovery
//!
//! Models the device-manager collaborator as a single optional connect-handler
//! slot. The collaborator invokes the handler on a thread it owns, once per
//! device it reports; the handler's return value says whether it stays
//! registered, so one-shot deregistration never re-enters the slot lock.
//!
//! The production implementation enumerates cpal host output devices on a
//! spawned thread and reports each as a connect event.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait};
use tracing::{debug, error, warn};

use crate::error::{Error, Result};

/// Opaque handle to a discovered output device.
///
/// Produced once by device resolution and owned by the caller for the length
/// of the playback session.
pub struct DeviceHandle {
    pub(crate) raw: cpal::Device,
    name: String,
}

impl DeviceHandle {
    fn new(raw: cpal::Device) -> Self {
        let name = raw.name().unwrap_or_else(|_| "unknown".to_string());
        Self { raw, name }
    }

    /// Human-readable device name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHandle").field("name", &self.name).finish()
    }
}

/// What a connect handler wants done with its registration after one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectFlow {
    /// Stay registered for further connect events
    Keep,

    /// Remove the registration; later events go unobserved
    Deregister,
}

/// Boxed connect handler: `(handle, connected)` per reported device.
pub type ConnectHandler<H> = Box<dyn FnMut(H, bool) -> ConnectFlow + Send>;

/// Device-discovery collaborator boundary.
///
/// One optional handler slot; installing `None` deregisters. The handler may
/// fire on a collaborator-owned thread at any time after installation,
/// including before the installer starts waiting for it.
pub trait DeviceEvents {
    type Handle: Send + 'static;

    fn set_connect_handler(&self, handler: Option<ConnectHandler<Self::Handle>>);
}

type SharedSlot<H> = Arc<Mutex<Option<ConnectHandler<H>>>>;

/// cpal-backed device monitor.
///
/// Discovery is armed by handler installation: the first `Some` registration
/// spawns the enumeration thread, which then reports each candidate output
/// device as a connect event until the handler deregisters itself or is
/// cleared.
pub struct CpalDeviceMonitor {
    slot: SharedSlot<DeviceHandle>,
    preferred: Option<String>,
    started: AtomicBool,
}

impl CpalDeviceMonitor {
    /// Creates a monitor, optionally restricted to devices named `preferred`.
    pub fn new(preferred: Option<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            preferred,
            started: AtomicBool::new(false),
        }
    }

    fn spawn_discovery(&self) {
        let slot = Arc::clone(&self.slot);
        let preferred = self.preferred.clone();
        thread::spawn(move || {
            let host = cpal::default_host();
            for device in candidate_devices(&host, preferred.as_deref()) {
                let handle = DeviceHandle::new(device);
                debug!("output device connected: {}", handle.name());
                if !deliver(&slot, handle, true) {
                    break;
                }
            }
        });
    }
}

impl DeviceEvents for CpalDeviceMonitor {
    type Handle = DeviceHandle;

    fn set_connect_handler(&self, handler: Option<ConnectHandler<DeviceHandle>>) {
        let installed = handler.is_some();
        *self.slot.lock().unwrap() = handler;

        if installed && !self.started.swap(true, Ordering::SeqCst) {
            self.spawn_discovery();
        }
    }
}

/// Invokes the registered handler, honoring its deregistration directive.
///
/// Returns false when no handler is registered.
fn deliver<H>(slot: &Mutex<Option<ConnectHandler<H>>>, handle: H, connected: bool) -> bool {
    let mut guard = slot.lock().unwrap();
    match guard.as_mut() {
        Some(handler) => {
            if handler(handle, connected) == ConnectFlow::Deregister {
                *guard = None;
            }
            true
        }
        None => false,
    }
}

/// Output devices to report, in reporting order.
///
/// A preferred name restricts enumeration to matching devices, falling back
/// to the default device with a warning when nothing matches. Without a
/// preference the default device is reported first.
fn candidate_devices(host: &cpal::Host, preferred: Option<&str>) -> Vec<cpal::Device> {
    if let Some(name) = preferred {
        match host.output_devices() {
            Ok(devices) => {
                let matched: Vec<_> = devices
                    .filter(|d| d.name().ok().as_deref() == Some(name))
                    .collect();
                if !matched.is_empty() {
                    return matched;
                }
                warn!("requested device '{name}' not found, falling back to default device");
            }
            Err(e) => error!("failed to enumerate output devices: {e}"),
        }
    }

    match host.default_output_device() {
        Some(device) => vec![device],
        None => {
            warn!("no default output device, reporting all outputs");
            match host.output_devices() {
                Ok(devices) => devices.collect(),
                Err(e) => {
                    error!("failed to enumerate output devices: {e}");
                    Vec::new()
                }
            }
        }
    }
}

/// Names of every output device the host reports.
pub fn list_output_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|e| Error::DeviceDiscovery(e.to_string()))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}
