//! Fan controller
//!
//! Owns the readiness detector and the sampling pipeline and exposes one
//! method per periodic task. The readiness flag is passed to the pipeline by
//! value on each sampling tick; nothing else is shared between the two.

use tracing::{debug, error, info, trace, warn};

use crate::constants::logging::MAX_CONSECUTIVE_ERRORS;
use crate::data::{ControlConfig, ReadinessState};
use crate::engine::{BusReadinessDetector, DutyCycleMapper, SamplingPipeline, TickOutcome};
use crate::error::{FanControlError, Result};
use crate::hw::{
    FanWriter, HwmonResolver, PowerSource, SensorDiscovery, TemperatureSampler, ThermalBus,
};

pub struct FanController<P> {
    readiness: BusReadinessDetector<P>,
    pipeline: SamplingPipeline,
    sampling_failures: u32,
}

impl<P: PowerSource> FanController<P> {
    pub fn new(readiness: BusReadinessDetector<P>, pipeline: SamplingPipeline) -> Self {
        Self {
            readiness,
            pipeline,
            sampling_failures: 0,
        }
    }

    /// Resolve paths, discover sensors and assemble the controller.
    ///
    /// Fails if any socket has fewer core sensors than configured: sampling a
    /// partial set could miss the hottest core.
    pub fn from_config(
        config: &ControlConfig,
        resolver: &impl HwmonResolver,
        power: P,
    ) -> Result<Self> {
        config.validate()?;

        let discovery = SensorDiscovery::from_config(config);
        let mut buses = Vec::with_capacity(config.sockets.len());
        for socket in &config.sockets {
            let dir = resolver.resolve(&socket.thermal_device)?;
            info!(socket = %socket.name, dir = %dir.display(), "Scanning thermal bus");
            let sensors = discovery.discover(&dir)?;
            buses.push(ThermalBus::new(socket.name.clone(), dir, sensors));
        }

        let probe = buses
            .first()
            .and_then(ThermalBus::probe_path)
            .ok_or_else(|| FanControlError::invalid_config("sockets", "no probe sensor"))?;

        let fan_dir = resolver.resolve(&config.fan_device)?;
        let writer = FanWriter::for_hwmon(&fan_dir, config.fan_count);
        writer.enable_manual_mode();
        info!(dir = %fan_dir.display(), fans = config.fan_count, "Fan controller ready");

        let mapper = DutyCycleMapper::new(config.bands.clone())?;
        let pipeline = SamplingPipeline::new(TemperatureSampler::new(buses), mapper, writer);

        Ok(Self::new(BusReadinessDetector::new(power, probe), pipeline))
    }

    pub fn readiness(&self) -> &BusReadinessDetector<P> {
        &self.readiness
    }

    pub fn pipeline(&self) -> &SamplingPipeline {
        &self.pipeline
    }

    /// Periodic task 1: advance the readiness state machine
    pub fn readiness_tick(&mut self) -> ReadinessState {
        self.readiness.tick()
    }

    /// Periodic task 2: sample, map and write.
    ///
    /// Failures are logged here and never propagated; the next tick retries.
    pub fn sampling_tick(&mut self) -> Option<TickOutcome> {
        let ready = self.readiness.is_ready();
        match self.pipeline.run(ready) {
            Ok(outcome) => {
                if self.sampling_failures > 0 {
                    info!(failures = self.sampling_failures, "Sampling recovered");
                    self.sampling_failures = 0;
                }
                log_outcome(&outcome);
                Some(outcome)
            }
            Err(e) => {
                self.sampling_failures += 1;
                let count = self.sampling_failures;
                if count == 1 || count % MAX_CONSECUTIVE_ERRORS == 0 {
                    match &e {
                        FanControlError::FanWrite { .. } => {
                            error!(error = %e, count, "Fan write failed, retrying next tick")
                        }
                        e if e.is_sensor_error() => {
                            warn!(error = %e, count, "Core temperature unreadable, tick skipped")
                        }
                        _ => warn!(error = %e, count, "Sampling tick skipped"),
                    }
                }
                None
            }
        }
    }
}

fn log_outcome(outcome: &TickOutcome) {
    match outcome {
        TickOutcome::NotReady => trace!("Thermal bus not ready, skipping sample"),
        TickOutcome::Unchanged { celsius, duty } => {
            trace!(celsius, duty = %duty, "Duty cycle unchanged")
        }
        TickOutcome::Written {
            celsius,
            duty,
            fans,
        } => debug!(celsius, duty = %duty, fans, "Duty cycle changed"),
    }
}
