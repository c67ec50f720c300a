//! Hardware interaction modules
//!
//! Contains all sysfs and GPIO access: hwmon resolution, sensor discovery,
//! temperature reads, fan writes and the host power line.

mod discovery;
mod fans;
mod gpio;
mod paths;
mod sensors;

pub use discovery::SensorDiscovery;
pub use fans::{FanWriter, WriteOutcome};
pub use gpio::{GpioLine, GpioPowerMonitor, PowerSource};
#[cfg(test)]
pub use gpio::MockPowerSource;
pub use paths::{HwmonResolver, SysfsHwmonResolver};
pub use sensors::{input_path, label_path, read_celsius, TemperatureSampler, ThermalBus};
