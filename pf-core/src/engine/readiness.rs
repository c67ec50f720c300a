//! Thermal bus readiness
//!
//! The PECI bus only returns real readings once the host CPUs are powered
//! and the bus has finished initializing. This state machine combines the
//! power-OK GPIO with a probe read of one core sensor:
//!
//! ```text
//!   PowerOff --powered--> WaitingForData --probe has data--> Ready
//!      ^                        |                              |
//!      +-------unpowered or GPIO read failure (any state)------+
//! ```
//!
//! One transition at most per tick. The sampling pipeline only ever sees
//! [`BusReadinessDetector::is_ready`].

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::logging::MAX_CONSECUTIVE_ERRORS;
use crate::data::{PowerState, ReadinessState};
use crate::hw::{read_celsius, PowerSource};

/// Polling state machine deciding whether temperature data can be trusted
pub struct BusReadinessDetector<P> {
    power: P,
    probe: PathBuf,
    state: ReadinessState,
    gpio_failures: u32,
}

impl<P: PowerSource> BusReadinessDetector<P> {
    /// Start in [`ReadinessState::PowerOff`], probing `probe` for data
    pub fn new(power: P, probe: impl Into<PathBuf>) -> Self {
        Self {
            power,
            probe: probe.into(),
            state: ReadinessState::PowerOff,
            gpio_failures: 0,
        }
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ReadinessState::Ready
    }

    pub fn probe_path(&self) -> &Path {
        &self.probe
    }

    /// Evaluate one transition and return the new state
    pub fn tick(&mut self) -> ReadinessState {
        let power = match self.power.read_power() {
            Ok(power) => {
                if self.gpio_failures > 0 {
                    info!(failures = self.gpio_failures, "Power GPIO readable again");
                    self.gpio_failures = 0;
                }
                power
            }
            Err(e) => {
                self.gpio_failures += 1;
                if self.gpio_failures == 1 || self.gpio_failures % MAX_CONSECUTIVE_ERRORS == 0 {
                    warn!(
                        error = %e,
                        count = self.gpio_failures,
                        "Power GPIO read failed, treating host as unpowered"
                    );
                }
                return self.transition(ReadinessState::PowerOff);
            }
        };

        let next = match (self.state, power) {
            (_, PowerState::Unpowered) => {
                debug!("Host unpowered");
                ReadinessState::PowerOff
            }
            (ReadinessState::PowerOff, PowerState::Powered) => ReadinessState::WaitingForData,
            (ReadinessState::WaitingForData, PowerState::Powered) => {
                if self.probe_has_data() {
                    ReadinessState::Ready
                } else {
                    ReadinessState::WaitingForData
                }
            }
            (ReadinessState::Ready, PowerState::Powered) => ReadinessState::Ready,
        };
        self.transition(next)
    }

    /// Empty, unreadable or non-numeric input all mean "not initialized yet"
    fn probe_has_data(&self) -> bool {
        match read_celsius(&self.probe) {
            Ok(celsius) => {
                debug!(probe = %self.probe.display(), celsius, "Thermal bus produced data");
                true
            }
            Err(e) => {
                debug!(probe = %self.probe.display(), error = %e, "Thermal bus not ready");
                false
            }
        }
    }

    fn transition(&mut self, next: ReadinessState) -> ReadinessState {
        if next != self.state {
            info!(from = %self.state, to = %next, "Thermal bus readiness changed");
            self.state = next;
        }
        self.state
    }
}
