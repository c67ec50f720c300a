//! Runtime configuration
//!
//! Assembled once at startup from [`crate::constants`]. Nothing is read from
//! disk or the environment; tests build their own instances.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{self, fans, gpio, paths, sensors, timing};
use crate::data::types::DutyCycleBand;
use crate::error::{FanControlError, Result};
use crate::hw::GpioLine;

/// One CPU socket's thermal bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketConfig {
    /// Name used in logs ("CPU0")
    pub name: String,
    /// Device directory; its `hwmon/hwmonN` child holds the sensor files
    pub thermal_device: PathBuf,
}

/// Everything the daemon needs to run
#[derive(Debug, Clone)]
pub struct ControlConfig {
    pub fan_device: PathBuf,
    pub fan_count: usize,
    pub sockets: Vec<SocketConfig>,
    pub cores_per_socket: usize,
    pub first_candidate: usize,
    pub candidate_count: usize,
    pub core_label: String,
    pub power_gpio: GpioLine,
    pub readiness_interval: Duration,
    pub sampling_interval: Duration,
    pub bands: Vec<DutyCycleBand>,
}

impl ControlConfig {
    /// Build the configuration compiled into this binary
    pub fn from_constants() -> Self {
        let mut sockets = vec![SocketConfig {
            name: "CPU0".to_string(),
            thermal_device: PathBuf::from(paths::CPU0_THERMAL_DEVICE),
        }];
        if cfg!(feature = "dual-socket") {
            sockets.push(SocketConfig {
                name: "CPU1".to_string(),
                thermal_device: PathBuf::from(paths::CPU1_THERMAL_DEVICE),
            });
        }

        Self {
            fan_device: PathBuf::from(paths::FAN_DEVICE),
            fan_count: fans::COUNT,
            sockets,
            cores_per_socket: sensors::CORES_PER_SOCKET,
            first_candidate: sensors::FIRST_CANDIDATE,
            candidate_count: sensors::CANDIDATE_COUNT,
            core_label: sensors::CORE_LABEL.to_string(),
            power_gpio: GpioLine {
                chip: gpio::CHIP.to_string(),
                offset: gpio::LINE_OFFSET,
                active_low: gpio::ACTIVE_LOW,
            },
            readiness_interval: timing::READINESS_INTERVAL,
            sampling_interval: timing::SAMPLING_INTERVAL,
            bands: constants::DUTY_CYCLE_BANDS.to_vec(),
        }
    }

    /// Reject values the control loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.fan_count == 0 {
            return Err(FanControlError::invalid_config("fan_count", "must be at least 1"));
        }
        if self.cores_per_socket == 0 {
            return Err(FanControlError::invalid_config(
                "cores_per_socket",
                "must be at least 1",
            ));
        }
        if self.cores_per_socket > self.candidate_count {
            return Err(FanControlError::invalid_config(
                "candidate_count",
                format!(
                    "{} candidates cannot hold {} cores",
                    self.candidate_count, self.cores_per_socket
                ),
            ));
        }
        if self.sockets.is_empty() {
            return Err(FanControlError::invalid_config("sockets", "no thermal bus configured"));
        }
        if self.readiness_interval.is_zero() {
            return Err(FanControlError::invalid_config("readiness_interval", "must be non-zero"));
        }
        if self.sampling_interval.is_zero() {
            return Err(FanControlError::invalid_config("sampling_interval", "must be non-zero"));
        }
        Ok(())
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self::from_constants()
    }
}
