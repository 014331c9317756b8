//! Audio device discovery and output

pub mod device;
pub mod output;
pub mod resolver;
pub mod types;

pub use device::{list_output_devices, ConnectFlow, ConnectHandler, CpalDeviceMonitor, DeviceEvents, DeviceHandle};
pub use output::{AudioSink, CpalAudioSink, SessionCallbacks};
pub use resolver::resolve;
pub use types::{PcmBuffer, SampleFormat};
