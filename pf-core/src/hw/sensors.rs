//! Thermal bus sensor access
//!
//! The PECI cputemp driver exposes one `tempN_label`/`tempN_input` pair per
//! sensor. Inputs are millidegrees Celsius and read back empty (or fail) until
//! the host CPU is powered and the bus has been initialized.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::constants::sensors;
use crate::data::{SensorId, TemperatureSample};
use crate::error::{FanControlError, Result};

/// Path of `temp{id}_input` under `dir`
pub fn input_path(dir: &Path, id: &SensorId) -> PathBuf {
    dir.join(format!(
        "{}{}{}",
        sensors::TEMP_PREFIX,
        id,
        sensors::INPUT_SUFFIX
    ))
}

/// Path of `temp{id}_label` under `dir`
pub fn label_path(dir: &Path, id: &SensorId) -> PathBuf {
    dir.join(format!(
        "{}{}{}",
        sensors::TEMP_PREFIX,
        id,
        sensors::LABEL_SUFFIX
    ))
}

/// Read a temperature input and convert millidegrees to whole degrees
///
/// Integer division truncates toward zero, so 50999 reads as 50.
pub fn read_celsius(path: &Path) -> Result<i32> {
    let content = fs::read_to_string(path)
        .map_err(|e| FanControlError::sensor_unavailable(path, e))?;
    let trimmed = content.trim();

    let parse_error = || FanControlError::SensorParse {
        path: path.to_path_buf(),
        content: trimmed.to_string(),
    };

    let millidegrees: i64 = trimmed.parse().map_err(|_| parse_error())?;
    let celsius = millidegrees / sensors::MILLIDEGREE_DIVISOR;
    i32::try_from(celsius).map_err(|_| parse_error())
}

/// One socket's discovered per-core sensors
#[derive(Debug, Clone)]
pub struct ThermalBus {
    name: String,
    dir: PathBuf,
    sensors: Vec<SensorId>,
}

impl ThermalBus {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>, sensors: Vec<SensorId>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            sensors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn sensors(&self) -> &[SensorId] {
        &self.sensors
    }

    /// Input file read by the readiness probe (first discovered sensor)
    pub fn probe_path(&self) -> Option<PathBuf> {
        self.sensors.first().map(|id| input_path(&self.dir, id))
    }

    /// Read every sensor into `sample`, stopping at the first failure.
    ///
    /// A partial sample is never useful: one unreadable core could be the hot one.
    pub fn read_into(&self, sample: &mut TemperatureSample) -> Result<()> {
        for id in &self.sensors {
            let path = input_path(&self.dir, id);
            let celsius = read_celsius(&path)?;
            trace!(bus = %self.name, sensor = %id, celsius, "Read core temperature");
            sample.push(id.clone(), celsius);
        }
        Ok(())
    }
}

/// Reads all thermal buses into one sample
#[derive(Debug, Clone)]
pub struct TemperatureSampler {
    buses: Vec<ThermalBus>,
}

impl TemperatureSampler {
    pub fn new(buses: Vec<ThermalBus>) -> Self {
        Self { buses }
    }

    pub fn buses(&self) -> &[ThermalBus] {
        &self.buses
    }

    /// Sample every core, or produce nothing when the bus is not ready
    pub fn sample(&self, ready: bool) -> Result<Option<TemperatureSample>> {
        if !ready {
            return Ok(None);
        }

        let total = self.buses.iter().map(|b| b.sensors.len()).sum();
        let mut sample = TemperatureSample::with_capacity(total);
        for bus in &self.buses {
            bus.read_into(&mut sample)?;
        }
        Ok(Some(sample))
    }
}
