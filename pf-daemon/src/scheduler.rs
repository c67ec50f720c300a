//! Periodic task scheduling
//!
//! Two independently armed timers share one current-thread event loop: the
//! readiness check and the sampling pipeline. A tick always runs to
//! completion before the loop polls again, so neither task overlaps itself or
//! the other.

use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use pf_core::{FanController, PowerSource};

/// Recurring job with fixed-rate deadlines
///
/// Deadline n+1 is deadline n plus the period, regardless of how long the
/// tick took. A late tick fires immediately and the schedule catches up.
pub struct PeriodicTask {
    name: &'static str,
    interval: Interval,
}

impl PeriodicTask {
    /// Arm the first deadline one period from now
    pub fn new(name: &'static str, period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        Self { name, interval }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    /// Wait for the next deadline and return it
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}

/// Tick counts reported when the scheduler stops
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    pub readiness_ticks: u64,
    pub sampling_ticks: u64,
}

/// Drive both periodic tasks until `shutdown` completes
pub async fn run_scheduler<P, F>(
    controller: &mut FanController<P>,
    readiness_period: Duration,
    sampling_period: Duration,
    shutdown: F,
) -> SchedulerStats
where
    P: PowerSource,
    F: Future<Output = ()>,
{
    let mut readiness = PeriodicTask::new("readiness", readiness_period);
    let mut sampling = PeriodicTask::new("sampling", sampling_period);
    let mut stats = SchedulerStats::default();

    info!(
        readiness_ms = readiness.period().as_millis() as u64,
        sampling_ms = sampling.period().as_millis() as u64,
        "Scheduler started"
    );

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Scheduler stopping");
                break;
            }
            deadline = readiness.tick() => {
                stats.readiness_ticks += 1;
                let state = controller.readiness_tick();
                debug!(task = readiness.name(), ?deadline, %state, "Tick");
            }
            deadline = sampling.tick() => {
                stats.sampling_ticks += 1;
                controller.sampling_tick();
                debug!(task = sampling.name(), ?deadline, "Tick");
            }
        }
    }

    stats
}
