//! Data types and configuration
//!
//! Contains the values shared by the hardware and engine modules.

mod config;
mod types;

pub use config::{ControlConfig, SocketConfig};
pub use types::{
    CoreTemperature, DutyCycle, DutyCycleBand, PowerState, ReadinessState, SensorId,
    TemperatureSample,
};
