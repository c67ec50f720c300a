//! hwmon directory resolution
//!
//! The kernel numbers `hwmonN` directories at probe time, so the same device
//! can land on a different index across boots. A device directory is stable;
//! its `hwmon/` child holds exactly one `hwmonN` entry for single-function
//! drivers such as the PWM controller and the PECI cputemp driver.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::paths;
use crate::error::{FanControlError, Result};

/// Maps a stable device directory to its current hwmon directory
pub trait HwmonResolver {
    fn resolve(&self, device: &Path) -> Result<PathBuf>;
}

/// Resolver that reads `<device>/hwmon/hwmonN` from sysfs
#[derive(Debug, Default, Clone, Copy)]
pub struct SysfsHwmonResolver;

impl HwmonResolver for SysfsHwmonResolver {
    fn resolve(&self, device: &Path) -> Result<PathBuf> {
        let hwmon_dir = device.join(paths::HWMON_SUBDIR);
        let entries = fs::read_dir(&hwmon_dir).map_err(|e| {
            debug!(path = %hwmon_dir.display(), error = %e, "Cannot list hwmon directory");
            FanControlError::HwmonNotFound {
                device: device.to_path_buf(),
            }
        })?;

        let mut candidates: Vec<(u32, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                let index = hwmon_index(name.to_str()?)?;
                Some((index, entry.path()))
            })
            .collect();
        candidates.sort_by_key(|(index, _)| *index);

        if candidates.len() > 1 {
            warn!(
                device = %device.display(),
                count = candidates.len(),
                "Device has several hwmon entries, using the lowest index"
            );
        }

        candidates
            .into_iter()
            .next()
            .map(|(_, path)| path)
            .ok_or_else(|| FanControlError::HwmonNotFound {
                device: device.to_path_buf(),
            })
    }
}

/// Extract N from "hwmonN"
fn hwmon_index(name: &str) -> Option<u32> {
    name.strip_prefix("hwmon")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolves_single_hwmon() {
        let device = TempDir::new().unwrap();
        fs::create_dir_all(device.path().join("hwmon/hwmon3")).unwrap();

        let resolved = SysfsHwmonResolver.resolve(device.path()).unwrap();
        assert_eq!(resolved, device.path().join("hwmon/hwmon3"));
    }

    #[test]
    fn test_picks_lowest_index_and_ignores_other_entries() {
        let device = TempDir::new().unwrap();
        fs::create_dir_all(device.path().join("hwmon/hwmon12")).unwrap();
        fs::create_dir_all(device.path().join("hwmon/hwmon2")).unwrap();
        fs::create_dir_all(device.path().join("hwmon/power")).unwrap();

        let resolved = SysfsHwmonResolver.resolve(device.path()).unwrap();
        assert_eq!(resolved, device.path().join("hwmon/hwmon2"));
    }

    #[test]
    fn test_missing_hwmon_is_an_error() {
        let device = TempDir::new().unwrap();
        let err = SysfsHwmonResolver.resolve(device.path()).unwrap_err();
        assert!(matches!(err, FanControlError::HwmonNotFound { .. }));

        fs::create_dir_all(device.path().join("hwmon")).unwrap();
        let err = SysfsHwmonResolver.resolve(device.path()).unwrap_err();
        assert!(matches!(err, FanControlError::HwmonNotFound { .. }));
    }

    #[test]
    fn test_hwmon_index() {
        assert_eq!(hwmon_index("hwmon0"), Some(0));
        assert_eq!(hwmon_index("hwmon15"), Some(15));
        assert_eq!(hwmon_index("hwmon"), None);
        assert_eq!(hwmon_index("device"), None);
    }
}
