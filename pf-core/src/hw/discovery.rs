//! Per-core sensor discovery
//!
//! The cputemp driver mixes package-level sensors (Die, DTS, Tcontrol, ...)
//! with per-core ones, and the core sensors are not numbered contiguously.
//! Discovery walks candidate `tempN_label` files in index order and keeps
//! those whose label contains "Core".

use std::fs;
use std::path::Path;
use tracing::{debug, info, trace};

use crate::data::{ControlConfig, SensorId};
use crate::error::{FanControlError, Result};
use crate::hw::sensors::label_path;

/// Scan parameters for one thermal bus
#[derive(Debug, Clone)]
pub struct SensorDiscovery {
    pub first_candidate: usize,
    pub candidate_count: usize,
    pub label: String,
    pub required: usize,
}

impl SensorDiscovery {
    pub fn from_config(config: &ControlConfig) -> Self {
        Self {
            first_candidate: config.first_candidate,
            candidate_count: config.candidate_count,
            label: config.core_label.clone(),
            required: config.cores_per_socket,
        }
    }

    /// Find `required` core sensors under `dir`, in probe order.
    ///
    /// Stops at the first index that completes the set. Candidates without a
    /// readable label are skipped. Fewer than `required` matches is a
    /// [`FanControlError::DiscoveryShortfall`].
    pub fn discover(&self, dir: &Path) -> Result<Vec<SensorId>> {
        let mut found = Vec::with_capacity(self.required);
        let end = self.first_candidate + self.candidate_count;

        for index in self.first_candidate..end {
            if found.len() == self.required {
                break;
            }

            let id = SensorId::new(index.to_string());
            let path = label_path(dir, &id);
            let label = match fs::read_to_string(&path) {
                Ok(label) => label,
                Err(e) => {
                    trace!(path = %path.display(), error = %e, "No label for candidate");
                    continue;
                }
            };

            if label.contains(self.label.as_str()) {
                debug!(sensor = %id, label = label.trim(), "Accepted core sensor");
                found.push(id);
            }
        }

        if found.len() < self.required {
            return Err(FanControlError::DiscoveryShortfall {
                found: found.len(),
                required: self.required,
                dir: dir.to_path_buf(),
            });
        }

        info!(
            dir = %dir.display(),
            sensors = ?found.iter().map(SensorId::as_str).collect::<Vec<_>>(),
            "Discovered core sensors"
        );
        Ok(found)
    }
}
