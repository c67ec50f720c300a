//! Fan PWM writes
//!
//! All fans are driven with the same duty cycle. Writes are debounced: a
//! value equal to the last *successful* write causes no I/O at all. A failed
//! batch leaves the remembered value untouched, so the next tick retries even
//! if the duty cycle has not changed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::fans;
use crate::data::DutyCycle;
use crate::error::{FanControlError, Result};

/// Result of a [`FanWriter::write`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Same duty cycle as the last write; nothing touched
    Unchanged,
    /// Duty cycle written to this many fans
    Written { fans: usize },
}

/// Writes a duty cycle to every fan's `pwmN` file
#[derive(Debug, Clone)]
pub struct FanWriter {
    pwm_paths: Vec<PathBuf>,
    last_written: Option<DutyCycle>,
}

impl FanWriter {
    pub fn new(pwm_paths: Vec<PathBuf>) -> Self {
        Self {
            pwm_paths,
            last_written: None,
        }
    }

    /// Writer for `pwm1` ..= `pwm{count}` under a hwmon directory
    pub fn for_hwmon(dir: &Path, count: usize) -> Self {
        let pwm_paths = (fans::FIRST_INDEX..fans::FIRST_INDEX + count)
            .map(|i| dir.join(format!("{}{}", fans::PWM_PREFIX, i)))
            .collect();
        Self::new(pwm_paths)
    }

    pub fn pwm_paths(&self) -> &[PathBuf] {
        &self.pwm_paths
    }

    pub fn last_written(&self) -> Option<DutyCycle> {
        self.last_written
    }

    /// Write `duty` to every fan unless it was the last value written.
    ///
    /// Stops at the first fan that cannot be written. Fans already written in
    /// this batch keep the new value.
    pub fn write(&mut self, duty: DutyCycle) -> Result<WriteOutcome> {
        if self.last_written == Some(duty) {
            return Ok(WriteOutcome::Unchanged);
        }

        for path in &self.pwm_paths {
            write_pwm(path, duty)?;
        }

        debug!(duty = %duty, fans = self.pwm_paths.len(), "Wrote fan duty cycle");
        self.last_written = Some(duty);
        Ok(WriteOutcome::Written {
            fans: self.pwm_paths.len(),
        })
    }

    /// Switch every fan that has a `pwmN_enable` file to manual mode.
    ///
    /// Returns how many fans were switched. Fans without an enable file are
    /// always under software control and are not counted.
    pub fn enable_manual_mode(&self) -> usize {
        let mut enabled = 0;
        for pwm_path in &self.pwm_paths {
            let enable_path = enable_path(pwm_path);
            if !enable_path.exists() {
                continue;
            }
            match std::fs::write(&enable_path, fans::MANUAL_MODE.to_string()) {
                Ok(()) => enabled += 1,
                Err(e) => warn!(
                    path = %enable_path.display(),
                    error = %e,
                    "Failed to enable manual PWM control"
                ),
            }
        }
        if enabled > 0 {
            info!(fans = enabled, "Enabled manual PWM control");
        }
        enabled
    }
}

/// `pwmN` -> `pwmN_enable`
fn enable_path(pwm_path: &Path) -> PathBuf {
    let mut name = pwm_path.file_name().unwrap_or_default().to_os_string();
    name.push(fans::ENABLE_SUFFIX);
    pwm_path.with_file_name(name)
}

/// Write without creating: a missing sysfs file is a failure, not a new file
fn write_pwm(path: &Path, duty: DutyCycle) -> Result<()> {
    let fan_error = |source: std::io::Error| FanControlError::FanWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(fan_error)?;
    file.write_all(duty.to_string().as_bytes()).map_err(fan_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fan_dir(count: usize) -> TempDir {
        let dir = TempDir::new().unwrap();
        for i in 1..=count {
            fs::write(dir.path().join(format!("pwm{}", i)), "0").unwrap();
        }
        dir
    }

    fn read(dir: &Path, name: &str) -> String {
        fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn test_paths_for_hwmon() {
        let writer = FanWriter::for_hwmon(Path::new("/hwmon0"), 6);
        assert_eq!(writer.pwm_paths().len(), 6);
        assert_eq!(writer.pwm_paths()[0], PathBuf::from("/hwmon0/pwm1"));
        assert_eq!(writer.pwm_paths()[5], PathBuf::from("/hwmon0/pwm6"));
    }

    #[test]
    fn test_writes_every_fan() {
        let dir = fan_dir(6);
        let mut writer = FanWriter::for_hwmon(dir.path(), 6);

        let outcome = writer.write(DutyCycle(170)).unwrap();
        assert_eq!(outcome, WriteOutcome::Written { fans: 6 });
        for i in 1..=6 {
            assert_eq!(read(dir.path(), &format!("pwm{}", i)), "170");
        }
        assert_eq!(writer.last_written(), Some(DutyCycle(170)));
    }

    #[test]
    fn test_same_duty_cycle_writes_once() {
        let dir = fan_dir(2);
        let mut writer = FanWriter::for_hwmon(dir.path(), 2);

        writer.write(DutyCycle(130)).unwrap();
        // Any I/O on the second call would overwrite this marker
        fs::write(dir.path().join("pwm1"), "marker").unwrap();

        assert_eq!(writer.write(DutyCycle(130)).unwrap(), WriteOutcome::Unchanged);
        assert_eq!(read(dir.path(), "pwm1"), "marker");

        assert_eq!(
            writer.write(DutyCycle(225)).unwrap(),
            WriteOutcome::Written { fans: 2 }
        );
        assert_eq!(read(dir.path(), "pwm1"), "225");
    }

    #[test]
    fn test_failed_batch_stops_and_is_retried() {
        let dir = fan_dir(3);
        fs::remove_file(dir.path().join("pwm2")).unwrap();
        let mut writer = FanWriter::for_hwmon(dir.path(), 3);

        let err = writer.write(DutyCycle(255)).unwrap_err();
        assert!(matches!(err, FanControlError::FanWrite { ref path, .. } if path.ends_with("pwm2")));
        // pwm1 keeps the new value, pwm3 was never reached
        assert_eq!(read(dir.path(), "pwm1"), "255");
        assert_eq!(read(dir.path(), "pwm3"), "0");
        assert_eq!(writer.last_written(), None);

        // Once the fan is back the unchanged duty cycle is written again
        fs::write(dir.path().join("pwm2"), "0").unwrap();
        assert_eq!(
            writer.write(DutyCycle(255)).unwrap(),
            WriteOutcome::Written { fans: 3 }
        );
        assert_eq!(read(dir.path(), "pwm3"), "255");
    }

    #[test]
    fn test_enable_manual_mode() {
        let dir = fan_dir(3);
        fs::write(dir.path().join("pwm1_enable"), "2").unwrap();
        fs::write(dir.path().join("pwm3_enable"), "0").unwrap();
        let writer = FanWriter::for_hwmon(dir.path(), 3);

        assert_eq!(writer.enable_manual_mode(), 2);
        assert_eq!(read(dir.path(), "pwm1_enable"), "1");
        assert_eq!(read(dir.path(), "pwm3_enable"), "1");
        assert!(!dir.path().join("pwm2_enable").exists());
    }

    #[test]
    fn test_enable_path() {
        assert_eq!(
            enable_path(Path::new("/hwmon0/pwm4")),
            PathBuf::from("/hwmon0/pwm4_enable")
        );
    }
}
