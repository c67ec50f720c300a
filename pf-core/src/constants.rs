//! Constants and configuration values for pecifan
//!
//! Centralizes all magic numbers, paths, and configuration defaults.
//! The daemon has no config file, flags or environment: everything it needs
//! at runtime is assembled from this module by [`crate::config::ControlConfig`].

use std::time::Duration;

use crate::data::DutyCycleBand;

/// Platform device paths
///
/// These are device directories, not hwmon directories: the kernel assigns the
/// `hwmonN` index at probe time, so the daemon resolves it on startup.
pub mod paths {
    /// PWM/tach controller that exposes the `pwmN` files
    pub const FAN_DEVICE: &str =
        "/sys/devices/platform/ahb/ahb:apb/1e786000.pwm-tacho-controller";

    /// Thermal bus device for the first CPU socket
    pub const CPU0_THERMAL_DEVICE: &str =
        "/sys/bus/peci/devices/peci-0/0-30/peci_cpu.cputemp.0.48";

    /// Thermal bus device for the second CPU socket
    pub const CPU1_THERMAL_DEVICE: &str =
        "/sys/bus/peci/devices/peci-0/0-31/peci_cpu.cputemp.0.49";

    /// Subdirectory of a device that holds its `hwmonN` entries
    pub const HWMON_SUBDIR: &str = "hwmon";

    /// Directory of GPIO character devices
    pub const GPIO_DEV_DIR: &str = "/dev";
}

/// Fan control files
pub mod fans {
    /// Number of fans driven by the daemon (`pwm1` ..= `pwm6`)
    pub const COUNT: usize = 6;

    /// First fan index
    pub const FIRST_INDEX: usize = 1;

    /// PWM control file prefix
    pub const PWM_PREFIX: &str = "pwm";

    /// Suffix of the optional mode file next to each PWM file
    pub const ENABLE_SUFFIX: &str = "_enable";

    /// Value written to `pwmN_enable` for software control
    pub const MANUAL_MODE: u8 = 1;
}

/// Thermal bus sensor files
pub mod sensors {
    /// Per-core sensors each socket must expose
    pub const CORES_PER_SOCKET: usize = 5;

    /// First candidate `tempN` index probed during discovery
    pub const FIRST_CANDIDATE: usize = 1;

    /// Number of candidate indices probed before giving up
    pub const CANDIDATE_COUNT: usize = 64;

    /// Label text that marks a per-core sensor
    pub const CORE_LABEL: &str = "Core";

    /// Sensor file prefix
    pub const TEMP_PREFIX: &str = "temp";

    /// Raw value file suffix
    pub const INPUT_SUFFIX: &str = "_input";

    /// Label file suffix
    pub const LABEL_SUFFIX: &str = "_label";

    /// hwmon reports millidegrees Celsius
    pub const MILLIDEGREE_DIVISOR: i64 = 1000;
}

/// Host power-OK GPIO line
pub mod gpio {
    /// GPIO chip device name under `/dev`
    pub const CHIP: &str = "gpiochip0";

    /// Line offset of the power-OK signal on the chip
    pub const LINE_OFFSET: u32 = 202;

    /// Whether the line is active-low
    pub const ACTIVE_LOW: bool = false;

    /// Consumer label shown by the kernel while the line is requested
    pub const CONSUMER: &str = "pecifand";
}

/// Scheduler timing
pub mod timing {
    use super::Duration;

    /// Period of the bus readiness check
    pub const READINESS_INTERVAL: Duration = Duration::from_secs(1);

    /// Period of the sample -> map -> write pipeline
    pub const SAMPLING_INTERVAL: Duration = Duration::from_secs(1);
}

/// Logging
pub mod logging {
    /// Tracing filter installed by the daemon
    pub const DEFAULT_FILTER: &str = "info";

    /// Repeated failures are logged on the first and every Nth occurrence
    pub const MAX_CONSECUTIVE_ERRORS: u32 = 10;

    /// Path whose presence means journald is available
    pub const JOURNALD_SOCKET: &str = "/run/systemd/journal/socket";
}

/// Temperature to duty-cycle bands
///
/// Ordered by inclusive upper bound; the last band is unbounded.
///
/// | Max core temperature | Duty cycle |
/// |----------------------|------------|
/// | <= 50 °C             | 130        |
/// | 51 ..= 75 °C         | 170        |
/// | 76 ..= 90 °C         | 225        |
/// | > 90 °C              | 255        |
pub const DUTY_CYCLE_BANDS: &[DutyCycleBand] = &[
    DutyCycleBand::up_to(50, 130),
    DutyCycleBand::up_to(75, 170),
    DutyCycleBand::up_to(90, 225),
    DutyCycleBand::above(255),
];
