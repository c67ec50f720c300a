//! pecifan Daemon (pecifand)
//!
//! Drives the BMC's chassis fans from CPU core temperatures read over the
//! PECI thermal bus.
//!
//! # Startup
//! 1. Logging (journald when available, stdout otherwise)
//! 2. hwmon resolution and per-core sensor discovery; a shortfall is fatal
//! 3. Manual PWM mode on fans that expose `pwmN_enable`
//! 4. Two periodic tasks on a single-threaded runtime: readiness and sampling
//!
//! There are no flags, environment variables or config files; everything is
//! compiled in from `pf_core::constants`. SIGINT/SIGTERM stop the loop and
//! the process exits 0, leaving fans at the last written duty cycle.

mod scheduler;

use anyhow::Context;
use tracing::{error, info, warn};

use pf_core::constants::logging;
use pf_core::{ControlConfig, FanController, GpioPowerMonitor, SysfsHwmonResolver};

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Logging
// ============================================================================

/// Install the tracing subscriber; returns whether journald is in use
fn init_logging() -> bool {
    use tracing_subscriber::prelude::*;

    if std::path::Path::new(logging::JOURNALD_SOCKET).exists() {
        match tracing_journald::layer() {
            Ok(journald_layer) => {
                tracing_subscriber::registry()
                    .with(journald_layer)
                    .with(tracing_subscriber::EnvFilter::new(logging::DEFAULT_FILTER))
                    .init();
                return true;
            }
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stdout", e);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(logging::DEFAULT_FILTER)
        .init();
    false
}

// ============================================================================
// Startup checks
// ============================================================================

/// sysfs PWM writes and GPIO line requests normally need root
fn check_privileges() {
    // SAFETY: geteuid has no preconditions and only returns the effective UID.
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        warn!(euid, "Not running as root - fan and GPIO access may be denied");
    }
}

// ============================================================================
// Signals
// ============================================================================

/// Completes on SIGINT or SIGTERM
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("SIGNAL: Received SIGINT"),
                _ = sigterm.recv() => info!("SIGNAL: Received SIGTERM"),
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to install SIGTERM handler, only SIGINT will stop the daemon");
            if let Err(e) = tokio::signal::ctrl_c().await {
                // Without any signal handler, run until killed
                warn!(error = %e, "Failed to install SIGINT handler");
                std::future::pending::<()>().await;
            }
            info!("SIGNAL: Received SIGINT");
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        eprintln!("PANIC at {}: {}", location, panic_info);
    }));

    let use_journald = init_logging();
    info!("STARTUP: pecifand {} starting", VERSION);
    info!(
        "STARTUP: Logging to {}",
        if use_journald { "systemd journal" } else { "stdout" }
    );
    check_privileges();

    let config = ControlConfig::from_constants();
    info!(
        sockets = config.sockets.len(),
        cores_per_socket = config.cores_per_socket,
        fans = config.fan_count,
        gpio_chip = %config.power_gpio.chip,
        gpio_line = config.power_gpio.offset,
        "STARTUP: Configuration"
    );

    let power = GpioPowerMonitor::new(config.power_gpio.clone());
    let mut controller = match FanController::from_config(&config, &SysfsHwmonResolver, power) {
        Ok(controller) => controller,
        Err(e) => {
            error!(error = %e, "STARTUP: Fan controller initialization failed");
            return Err(e).context("fan controller initialization failed");
        }
    };

    info!("STARTUP: Starting fan control");
    let stats = scheduler::run_scheduler(
        &mut controller,
        config.readiness_interval,
        config.sampling_interval,
        shutdown_signal(),
    )
    .await;

    info!(
        readiness_ticks = stats.readiness_ticks,
        sampling_ticks = stats.sampling_ticks,
        "SHUTDOWN: Daemon terminated"
    );
    Ok(())
}
