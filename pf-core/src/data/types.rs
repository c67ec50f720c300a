//! Core data types for pecifan
//!
//! Defines the values that flow between discovery, the readiness detector,
//! the sampler, the duty-cycle mapper and the fan writer.

use std::fmt;

/// Index of a discovered per-core temperature sensor (`temp{id}_input`)
///
/// Immutable once discovery has accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SensorId(String);

impl SensorId {
    pub fn new(index: impl Into<String>) -> Self {
        Self(index.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host power as reported by the power-OK GPIO line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Powered,
    Unpowered,
}

impl From<bool> for PowerState {
    fn from(powered: bool) -> Self {
        if powered {
            Self::Powered
        } else {
            Self::Unpowered
        }
    }
}

/// Whether the thermal bus is producing trustworthy data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadinessState {
    /// Host is off (or its power state could not be read)
    #[default]
    PowerOff,
    /// Host is on but the bus has not produced a reading yet
    WaitingForData,
    /// Readings are valid
    Ready,
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PowerOff => "power-off",
            Self::WaitingForData => "waiting-for-data",
            Self::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// One core's temperature in whole degrees Celsius
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreTemperature {
    pub sensor: SensorId,
    pub celsius: i32,
}

/// All core temperatures read during one sampling tick, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemperatureSample {
    readings: Vec<CoreTemperature>,
}

impl TemperatureSample {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            readings: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sensor: SensorId, celsius: i32) {
        self.readings.push(CoreTemperature { sensor, celsius });
    }

    pub fn readings(&self) -> &[CoreTemperature] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Hottest core, or `None` for an empty sample.
    ///
    /// An empty sample has no aggregate; it must never be read as "cold".
    pub fn max_celsius(&self) -> Option<i32> {
        self.readings.iter().map(|r| r.celsius).max()
    }
}

impl FromIterator<i32> for TemperatureSample {
    /// Builds a sample with sequential sensor ids starting at 1.
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        let readings = iter
            .into_iter()
            .enumerate()
            .map(|(i, celsius)| CoreTemperature {
                sensor: SensorId::new((i + 1).to_string()),
                celsius,
            })
            .collect();
        Self { readings }
    }
}

/// Fan drive strength written to a `pwmN` file (0-255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DutyCycle(pub u8);

impl DutyCycle {
    pub const MAX: DutyCycle = DutyCycle(u8::MAX);

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DutyCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the temperature to duty-cycle table
///
/// `max_celsius` is the inclusive upper bound; `None` marks the open-ended top band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCycleBand {
    pub max_celsius: Option<i32>,
    pub duty: DutyCycle,
}

impl DutyCycleBand {
    pub const fn up_to(max_celsius: i32, duty: u8) -> Self {
        Self {
            max_celsius: Some(max_celsius),
            duty: DutyCycle(duty),
        }
    }

    pub const fn above(duty: u8) -> Self {
        Self {
            max_celsius: None,
            duty: DutyCycle(duty),
        }
    }

    /// Whether `celsius` falls at or below this band's upper bound
    pub fn covers(&self, celsius: i32) -> bool {
        self.max_celsius.map_or(true, |max| celsius <= max)
    }
}
