//! pecifan Core Library
//!
//! Fan control for a BMC driven by CPU temperatures read over the PECI
//! thermal bus.
//!
//! # Features
//!
//! - **Sensor Discovery**: Finds the per-core `tempN` sensors by label
//! - **Readiness Detection**: Combines the host power-OK GPIO with a probe read
//!   to decide when bus readings can be trusted
//! - **Duty-Cycle Bands**: Maps the hottest core onto a fixed band table
//! - **Debounced Writes**: Fans are only written when the duty cycle changes
//!
//! # Module Structure
//!
//! - `hw/` - Hardware interaction (hwmon resolution, discovery, GPIO, sensors, fans)
//! - `data/` - Data types and runtime configuration
//! - `engine/` - Readiness state machine, mapper, sampling pipeline, controller
//!
//! # Example
//!
//! ```no_run
//! use pf_core::{ControlConfig, FanController, GpioPowerMonitor, SysfsHwmonResolver};
//!
//! let config = ControlConfig::from_constants();
//! let power = GpioPowerMonitor::new(config.power_gpio.clone());
//! let mut controller = FanController::from_config(&config, &SysfsHwmonResolver, power)?;
//!
//! controller.readiness_tick();
//! controller.sampling_tick();
//! # Ok::<(), pf_core::FanControlError>(())
//! ```

// Grouped modules
pub mod data;
pub mod engine;
pub mod hw;

// Standalone modules
pub mod constants;
pub mod error;

// Re-export primary types from data/
pub use data::{
    ControlConfig, CoreTemperature, DutyCycle, DutyCycleBand, PowerState, ReadinessState,
    SensorId, SocketConfig, TemperatureSample,
};

// Re-export error types
pub use error::{FanControlError, Result};

// Re-export engine types
pub use engine::{BusReadinessDetector, DutyCycleMapper, FanController, SamplingPipeline, TickOutcome};

// Re-export hardware types
pub use hw::{
    FanWriter, GpioLine, GpioPowerMonitor, HwmonResolver, PowerSource, SensorDiscovery,
    SysfsHwmonResolver, TemperatureSampler, ThermalBus, WriteOutcome,
};
