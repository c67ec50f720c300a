//! Error types, re-exported from `pf-error`

pub use pf_error::{FanControlError, Result};
