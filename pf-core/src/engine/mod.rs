//! Fan control engine modules
//!
//! Contains the readiness state machine, the duty-cycle mapper, the
//! per-tick sampling pipeline and the controller that ties them together.

mod controller;
mod duty;
mod pipeline;
mod readiness;

pub use controller::FanController;
pub use duty::DutyCycleMapper;
pub use pipeline::{SamplingPipeline, TickOutcome};
pub use readiness::BusReadinessDetector;
