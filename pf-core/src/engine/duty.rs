//! Temperature to duty-cycle mapping
//!
//! The hottest core selects one band of a fixed, ordered table. There is no
//! hysteresis: a temperature moving across a band edge moves the duty cycle
//! with it on the same tick.

use crate::data::{DutyCycle, DutyCycleBand, TemperatureSample};
use crate::error::{FanControlError, Result};

/// Maps an aggregate temperature onto a duty-cycle band table
#[derive(Debug, Clone)]
pub struct DutyCycleMapper {
    bands: Vec<DutyCycleBand>,
}

impl DutyCycleMapper {
    /// Build a mapper, rejecting tables that are not monotonic.
    ///
    /// Bounds must strictly increase, duty cycles must not decrease, and only
    /// the last band may be (and must be) open-ended.
    pub fn new(bands: Vec<DutyCycleBand>) -> Result<Self> {
        let Some(last) = bands.last() else {
            return Err(FanControlError::invalid_config("bands", "table is empty"));
        };
        if last.max_celsius.is_some() {
            return Err(FanControlError::invalid_config(
                "bands",
                "last band must be open-ended",
            ));
        }

        for pair in bands.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            let Some(lower_max) = lower.max_celsius else {
                return Err(FanControlError::invalid_config(
                    "bands",
                    "only the last band may be open-ended",
                ));
            };
            if upper.max_celsius.is_some_and(|max| max <= lower_max) {
                return Err(FanControlError::invalid_config(
                    "bands",
                    format!("bound after {} °C does not increase", lower_max),
                ));
            }
            if upper.duty < lower.duty {
                return Err(FanControlError::invalid_config(
                    "bands",
                    format!("duty cycle drops above {} °C", lower_max),
                ));
            }
        }

        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[DutyCycleBand] {
        &self.bands
    }

    /// Duty cycle for a single temperature
    pub fn map_temperature(&self, celsius: i32) -> DutyCycle {
        self.bands
            .iter()
            .find(|band| band.covers(celsius))
            .map(|band| band.duty)
            .unwrap_or(DutyCycle::MAX)
    }

    /// Aggregate a sample (maximum across cores) and map it.
    ///
    /// Returns the aggregate alongside the duty cycle. An empty sample is an
    /// error rather than a cold reading.
    pub fn map_sample(&self, sample: &TemperatureSample) -> Result<(i32, DutyCycle)> {
        let hottest = sample.max_celsius().ok_or(FanControlError::EmptySample)?;
        Ok((hottest, self.map_temperature(hottest)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DUTY_CYCLE_BANDS;

    fn mapper() -> DutyCycleMapper {
        DutyCycleMapper::new(DUTY_CYCLE_BANDS.to_vec()).unwrap()
    }

    #[test]
    fn test_band_boundaries() {
        let mapper = mapper();
        let cases = [
            (50, 130),
            (51, 170),
            (75, 170),
            (76, 225),
            (90, 225),
            (91, 255),
        ];
        for (celsius, duty) in cases {
            assert_eq!(mapper.map_temperature(celsius), DutyCycle(duty), "{} °C", celsius);
        }
    }

    #[test]
    fn test_extremes() {
        let mapper = mapper();
        assert_eq!(mapper.map_temperature(-40), DutyCycle(130));
        assert_eq!(mapper.map_temperature(0), DutyCycle(130));
        assert_eq!(mapper.map_temperature(i32::MAX), DutyCycle(255));
    }

    #[test]
    fn test_monotonic_and_stable() {
        let mapper = mapper();
        let mut previous = mapper.map_temperature(-50);
        for celsius in -49..=150 {
            let duty = mapper.map_temperature(celsius);
            assert!(duty >= previous, "duty dropped at {} °C", celsius);
            assert_eq!(duty, mapper.map_temperature(celsius));
            previous = duty;
        }
    }

    #[test]
    fn test_map_sample_uses_hottest_core() {
        let mapper = mapper();

        let cool: TemperatureSample = [40, 45, 38, 50, 30].into_iter().collect();
        assert_eq!(mapper.map_sample(&cool).unwrap(), (50, DutyCycle(130)));

        let hot: TemperatureSample = [60, 91, 70, 65, 55].into_iter().collect();
        assert_eq!(mapper.map_sample(&hot).unwrap(), (91, DutyCycle(255)));
    }

    #[test]
    fn test_empty_sample_is_rejected() {
        let err = mapper().map_sample(&TemperatureSample::default()).unwrap_err();
        assert!(matches!(err, FanControlError::EmptySample));
    }

    #[test]
    fn test_rejects_invalid_tables() {
        assert!(DutyCycleMapper::new(Vec::new()).is_err());

        // Top band bounded
        assert!(DutyCycleMapper::new(vec![DutyCycleBand::up_to(50, 130)]).is_err());

        // Open-ended band in the middle
        assert!(DutyCycleMapper::new(vec![
            DutyCycleBand::above(130),
            DutyCycleBand::above(255),
        ])
        .is_err());

        // Bounds out of order
        assert!(DutyCycleMapper::new(vec![
            DutyCycleBand::up_to(75, 130),
            DutyCycleBand::up_to(50, 170),
            DutyCycleBand::above(255),
        ])
        .is_err());

        // Duty cycle decreasing
        assert!(DutyCycleMapper::new(vec![
            DutyCycleBand::up_to(50, 200),
            DutyCycleBand::above(100),
        ])
        .is_err());
    }

    #[test]
    fn test_single_band_table() {
        let mapper = DutyCycleMapper::new(vec![DutyCycleBand::above(200)]).unwrap();
        assert_eq!(mapper.map_temperature(20), DutyCycle(200));
    }
}
