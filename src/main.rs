//! CLI entry point for dualcam-daq.
//!
//! Provides a headless command-line interface for:
//! - Running a simulated dual-camera integration session against mock
//!   frame sources (no hardware required)
//! - Checking a session configuration file
//!
//! # Usage
//!
//! Run a simulated session:
//! ```bash
//! dualcam-daq run --config config/dualcam.toml
//! ```
//!
//! Validate configuration:
//! ```bash
//! dualcam-daq check-config --config config/dualcam.toml
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use dualcam_daq::acquisition::{
    AccumulatorRole, Correction, IntegrationLoop, QuadrantLut, SessionReport, SharedAccumulator,
    QUADRANTS,
};
use dualcam_daq::config::Settings;
use dualcam_daq::diagnostics;
use dualcam_daq::hardware::MockFrameSource;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "dualcam-daq")]
#[command(about = "Dual-camera frame integration engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated session against mock frame sources
    Run {
        /// Path to a session configuration file
        #[arg(long, default_value = "config/dualcam.toml")]
        config: PathBuf,

        /// Override the configured number of integration cycles
        #[arg(long)]
        cycles: Option<u32>,
    },

    /// Load and validate a configuration file
    CheckConfig {
        /// Path to a session configuration file
        #[arg(long, default_value = "config/dualcam.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, cycles } => run_simulated(config, cycles).await,
        Commands::CheckConfig { config } => check_config(config),
    }
}

fn load_settings(path: &PathBuf) -> Result<Settings> {
    let settings = Settings::load_from(path)?;
    if let Err(reason) = settings.validate() {
        bail!("invalid configuration: {reason}");
    }
    Ok(settings)
}

fn check_config(path: PathBuf) -> Result<()> {
    let settings = load_settings(&path)?;
    println!(
        "OK: {} cameras, {} integrations, {} samples per frame",
        settings.cameras.len(),
        settings.acquisition.num_integrations,
        settings.samples_per_frame()
    );
    Ok(())
}

async fn run_simulated(path: PathBuf, cycles: Option<u32>) -> Result<()> {
    let mut settings = load_settings(&path)?;
    if let Some(cycles) = cycles {
        settings.acquisition.num_integrations = cycles;
    }
    diagnostics::init_from_settings(&settings)?;

    let num_integrations = settings.acquisition.num_integrations;
    let samples_per_frame = settings.samples_per_frame();
    let frames_per_session = u64::from(num_integrations) * QUADRANTS as u64;

    info!(
        session = %settings.application.name,
        cameras = settings.cameras.len(),
        num_integrations,
        samples_per_frame,
        lut = settings.acquisition.lut_enabled,
        "starting simulated session"
    );

    let accumulator = Arc::new(SharedAccumulator::new(
        samples_per_frame,
        settings.cameras.len(),
    ));

    let mut tasks = Vec::new();
    for (index, camera) in settings.cameras.iter().enumerate() {
        let role = if camera.owner {
            AccumulatorRole::Owner
        } else {
            AccumulatorRole::Sibling
        };
        let correction = if settings.acquisition.lut_enabled {
            Correction::Lut(QuadrantLut::identity())
        } else {
            Correction::Passthrough
        };
        let source = Arc::new(MockFrameSource::with_noise_frames(
            camera.id.clone(),
            frames_per_session,
            samples_per_frame,
            index as u64,
        ));
        let int_loop = IntegrationLoop::new(
            camera.id.clone(),
            role,
            source,
            correction,
            Arc::clone(&accumulator),
            num_integrations,
        );
        let id = camera.id.clone();
        tasks.push(tokio::spawn(async move {
            (id, int_loop.run_session().await)
        }));
    }

    let mut reports: Vec<(String, SessionReport)> = Vec::new();
    for task in tasks {
        reports.push(task.await?);
    }

    let mut frames_total: u64 = 0;
    for (id, report) in &reports {
        info!(
            camera = %id,
            cycles_completed = report.cycles_completed,
            frames_accumulated = report.frames_accumulated,
            backlog_total = report.backlog_total,
            stop_reason = ?report.stop_reason,
            "session finished"
        );
        frames_total += u64::from(report.frames_accumulated);
    }

    let snapshot = accumulator.snapshot();
    if frames_total > 0 && !snapshot.is_empty() {
        let total: u64 = snapshot.iter().sum();
        let mean = total as f64 / (snapshot.len() as u64 * frames_total) as f64;
        info!(frames_total, mean_pixel_value = mean, "averaged image ready");
    }

    Ok(())
}
