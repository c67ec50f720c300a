//! Host power-OK GPIO
//!
//! Reads one line through the GPIO character device (`/dev/gpiochipN`) using
//! the v1 line-handle ioctls. Each read requests the line, samples it and
//! releases it again: there is no caching and no debouncing, the caller owns
//! the polling cadence.
//!
//! A failed read is an error, never "unpowered". The readiness detector
//! decides how to treat it.

use std::fs::File;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::path::{Path, PathBuf};

use crate::constants::{gpio, paths};
use crate::data::PowerState;
use crate::error::{FanControlError, Result};

/// GPIO line descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioLine {
    /// Chip device name, e.g. "gpiochip0"
    pub chip: String,
    /// Line offset on the chip
    pub offset: u32,
    /// Report the inverted electrical level
    pub active_low: bool,
}

/// Source of the host power state
#[cfg_attr(test, mockall::automock)]
pub trait PowerSource {
    fn read_power(&mut self) -> Result<PowerState>;
}

/// [`PowerSource`] backed by a GPIO character device line
#[derive(Debug, Clone)]
pub struct GpioPowerMonitor {
    line: GpioLine,
    chip_path: PathBuf,
}

impl GpioPowerMonitor {
    pub fn new(line: GpioLine) -> Self {
        Self::with_dev_dir(line, Path::new(paths::GPIO_DEV_DIR))
    }

    pub fn with_dev_dir(line: GpioLine, dev_dir: &Path) -> Self {
        let chip_path = dev_dir.join(&line.chip);
        Self { line, chip_path }
    }

    pub fn line(&self) -> &GpioLine {
        &self.line
    }

    fn read_line(&self) -> Result<bool> {
        let chip = File::open(&self.chip_path).map_err(|source| FanControlError::GpioUnavailable {
            path: self.chip_path.clone(),
            source,
        })?;

        let mut request = uapi::GpioHandleRequest::input(
            self.line.offset,
            self.line.active_low,
            gpio::CONSUMER,
        );
        // SAFETY: `chip` is an open gpiochip descriptor and `request` is a fully
        // initialized `struct gpiohandle_request` that outlives the call.
        let rc = unsafe {
            libc::ioctl(
                chip.as_raw_fd(),
                uapi::GPIO_GET_LINEHANDLE_IOCTL as _,
                &mut request as *mut uapi::GpioHandleRequest,
            )
        };
        if rc < 0 {
            return Err(self.read_error(std::io::Error::last_os_error()));
        }

        // SAFETY: on success the kernel returns a new descriptor we now own.
        let handle = unsafe { OwnedFd::from_raw_fd(request.fd) };

        let mut data = uapi::GpioHandleData::default();
        // SAFETY: `handle` is the line handle returned above and `data` is a
        // valid `struct gpiohandle_data`.
        let rc = unsafe {
            libc::ioctl(
                handle.as_raw_fd(),
                uapi::GPIOHANDLE_GET_LINE_VALUES_IOCTL as _,
                &mut data as *mut uapi::GpioHandleData,
            )
        };
        if rc < 0 {
            return Err(self.read_error(std::io::Error::last_os_error()));
        }

        Ok(data.values[0] != 0)
    }

    fn read_error(&self, source: std::io::Error) -> FanControlError {
        FanControlError::GpioRead {
            chip: self.line.chip.clone(),
            line: self.line.offset,
            source,
        }
    }
}

impl PowerSource for GpioPowerMonitor {
    fn read_power(&mut self) -> Result<PowerState> {
        self.read_line().map(PowerState::from)
    }
}

/// Linux GPIO v1 uAPI (`include/uapi/linux/gpio.h`)
mod uapi {
    use std::mem::size_of;

    pub const GPIOHANDLES_MAX: usize = 64;
    pub const GPIOHANDLE_REQUEST_INPUT: u32 = 1 << 0;
    pub const GPIOHANDLE_REQUEST_ACTIVE_LOW: u32 = 1 << 2;

    const GPIO_IOC_MAGIC: u64 = 0xB4;

    /// `_IOWR(0xB4, nr, size)`
    const fn iowr(nr: u64, size: usize) -> u64 {
        const IOC_READ_WRITE: u64 = 3;
        (IOC_READ_WRITE << 30) | ((size as u64) << 16) | (GPIO_IOC_MAGIC << 8) | nr
    }

    pub const GPIO_GET_LINEHANDLE_IOCTL: u64 = iowr(0x03, size_of::<GpioHandleRequest>());
    pub const GPIOHANDLE_GET_LINE_VALUES_IOCTL: u64 = iowr(0x08, size_of::<GpioHandleData>());

    #[repr(C)]
    pub struct GpioHandleRequest {
        pub lineoffsets: [u32; GPIOHANDLES_MAX],
        pub flags: u32,
        pub default_values: [u8; GPIOHANDLES_MAX],
        pub consumer_label: [u8; 32],
        pub lines: u32,
        pub fd: libc::c_int,
    }

    impl GpioHandleRequest {
        /// Request a single line as input
        pub fn input(offset: u32, active_low: bool, consumer: &str) -> Self {
            let mut request = Self {
                lineoffsets: [0; GPIOHANDLES_MAX],
                flags: GPIOHANDLE_REQUEST_INPUT,
                default_values: [0; GPIOHANDLES_MAX],
                consumer_label: [0; 32],
                lines: 1,
                fd: -1,
            };
            request.lineoffsets[0] = offset;
            if active_low {
                request.flags |= GPIOHANDLE_REQUEST_ACTIVE_LOW;
            }
            // Leave room for the NUL terminator
            let label = consumer.as_bytes();
            let len = label.len().min(request.consumer_label.len() - 1);
            request.consumer_label[..len].copy_from_slice(&label[..len]);
            request
        }
    }

    #[repr(C)]
    pub struct GpioHandleData {
        pub values: [u8; GPIOHANDLES_MAX],
    }

    impl Default for GpioHandleData {
        fn default() -> Self {
            Self {
                values: [0; GPIOHANDLES_MAX],
            }
        }
    }
}
