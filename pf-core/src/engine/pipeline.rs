//! Sample -> map -> write
//!
//! One sampling tick. Any sampler or mapper failure returns before the fan
//! writer is reached, so a bad tick never writes a stale or invented duty cycle.

use crate::data::DutyCycle;
use crate::engine::DutyCycleMapper;
use crate::error::Result;
use crate::hw::{FanWriter, TemperatureSampler, WriteOutcome};

/// What a sampling tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Bus not ready; nothing read or written
    NotReady,
    /// Duty cycle matches the last write; no fan I/O
    Unchanged { celsius: i32, duty: DutyCycle },
    /// New duty cycle written to `fans` fans
    Written {
        celsius: i32,
        duty: DutyCycle,
        fans: usize,
    },
}

/// The sampler, mapper and fan writer run in sequence
#[derive(Debug)]
pub struct SamplingPipeline {
    sampler: TemperatureSampler,
    mapper: DutyCycleMapper,
    writer: FanWriter,
}

impl SamplingPipeline {
    pub fn new(sampler: TemperatureSampler, mapper: DutyCycleMapper, writer: FanWriter) -> Self {
        Self {
            sampler,
            mapper,
            writer,
        }
    }

    pub fn sampler(&self) -> &TemperatureSampler {
        &self.sampler
    }

    pub fn writer(&self) -> &FanWriter {
        &self.writer
    }

    pub fn run(&mut self, ready: bool) -> Result<TickOutcome> {
        let Some(sample) = self.sampler.sample(ready)? else {
            return Ok(TickOutcome::NotReady);
        };

        let (celsius, duty) = self.mapper.map_sample(&sample)?;

        let outcome = match self.writer.write(duty)? {
            WriteOutcome::Unchanged => TickOutcome::Unchanged { celsius, duty },
            WriteOutcome::Written { fans } => TickOutcome::Written {
                celsius,
                duty,
                fans,
            },
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DUTY_CYCLE_BANDS;
    use crate::data::SensorId;
    use crate::error::FanControlError;
    use crate::hw::ThermalBus;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixture {
        thermal: TempDir,
        fans: TempDir,
        pipeline: SamplingPipeline,
    }

    /// Five cores at temp2..temp6, two fans
    fn fixture() -> Fixture {
        let thermal = TempDir::new().unwrap();
        let fans = TempDir::new().unwrap();
        for i in 1..=2 {
            fs::write(fans.path().join(format!("pwm{}", i)), "0").unwrap();
        }

        let ids = (2..=6).map(|i| SensorId::new(i.to_string())).collect();
        let sampler = TemperatureSampler::new(vec![ThermalBus::new("CPU0", thermal.path(), ids)]);
        let mapper = DutyCycleMapper::new(DUTY_CYCLE_BANDS.to_vec()).unwrap();
        let writer = FanWriter::for_hwmon(fans.path(), 2);

        Fixture {
            pipeline: SamplingPipeline::new(sampler, mapper, writer),
            thermal,
            fans,
        }
    }

    fn set_cores(dir: &Path, celsius: &[i32]) {
        for (i, c) in celsius.iter().enumerate() {
            fs::write(dir.join(format!("temp{}_input", i + 2)), (c * 1000).to_string()).unwrap();
        }
    }

    fn pwm1(dir: &Path) -> String {
        fs::read_to_string(dir.join("pwm1")).unwrap()
    }

    #[test]
    fn test_not_ready_does_nothing() {
        let mut f = fixture();
        assert_eq!(f.pipeline.run(false).unwrap(), TickOutcome::NotReady);
        assert_eq!(pwm1(f.fans.path()), "0");
    }

    #[test]
    fn test_cool_cores_map_to_lowest_band() {
        let mut f = fixture();
        set_cores(f.thermal.path(), &[40, 45, 38, 50, 30]);

        assert_eq!(
            f.pipeline.run(true).unwrap(),
            TickOutcome::Written {
                celsius: 50,
                duty: DutyCycle(130),
                fans: 2
            }
        );
        assert_eq!(pwm1(f.fans.path()), "130");
    }

    #[test]
    fn test_hot_core_maps_to_full_speed() {
        let mut f = fixture();
        set_cores(f.thermal.path(), &[60, 91, 70, 65, 55]);

        assert_eq!(
            f.pipeline.run(true).unwrap(),
            TickOutcome::Written {
                celsius: 91,
                duty: DutyCycle(255),
                fans: 2
            }
        );
        assert_eq!(pwm1(f.fans.path()), "255");
    }

    #[test]
    fn test_repeat_tick_is_unchanged() {
        let mut f = fixture();
        set_cores(f.thermal.path(), &[60, 61, 62, 63, 64]);

        f.pipeline.run(true).unwrap();
        // Different temperature, same band
        set_cores(f.thermal.path(), &[70, 61, 62, 63, 64]);
        assert_eq!(
            f.pipeline.run(true).unwrap(),
            TickOutcome::Unchanged {
                celsius: 70,
                duty: DutyCycle(170)
            }
        );
    }

    #[test]
    fn test_unavailable_sensor_skips_fan_write() {
        let mut f = fixture();
        set_cores(f.thermal.path(), &[40, 45, 38, 50, 30]);
        f.pipeline.run(true).unwrap();
        assert_eq!(f.pipeline.writer().last_written(), Some(DutyCycle(130)));

        // Hot tick, but one core disappears
        set_cores(f.thermal.path(), &[95, 95, 95, 95, 95]);
        fs::remove_file(f.thermal.path().join("temp4_input")).unwrap();

        let err = f.pipeline.run(true).unwrap_err();
        assert!(matches!(err, FanControlError::SensorFileUnavailable { .. }));
        assert_eq!(pwm1(f.fans.path()), "130");
        assert_eq!(f.pipeline.writer().last_written(), Some(DutyCycle(130)));
    }

    #[test]
    fn test_parse_failure_skips_fan_write() {
        let mut f = fixture();
        set_cores(f.thermal.path(), &[95, 95, 95, 95, 95]);
        fs::write(f.thermal.path().join("temp6_input"), "").unwrap();

        let err = f.pipeline.run(true).unwrap_err();
        assert!(matches!(err, FanControlError::SensorParse { .. }));
        assert_eq!(pwm1(f.fans.path()), "0");
        assert_eq!(f.pipeline.writer().last_written(), None);
    }

    #[test]
    fn test_empty_sensor_set_is_rejected() {
        let fans = TempDir::new().unwrap();
        fs::write(fans.path().join("pwm1"), "0").unwrap();
        let sampler = TemperatureSampler::new(vec![ThermalBus::new("CPU0", "/unused", Vec::new())]);
        let mapper = DutyCycleMapper::new(DUTY_CYCLE_BANDS.to_vec()).unwrap();
        let mut pipeline = SamplingPipeline::new(sampler, mapper, FanWriter::for_hwmon(fans.path(), 1));

        assert!(matches!(pipeline.run(true), Err(FanControlError::EmptySample)));
        assert_eq!(pwm1(fans.path()), "0");
    }
}
