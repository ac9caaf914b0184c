//! Tone generator (tonegen-ap) - Main entry point
//!
//! Plays a stereo sine test tone on the default output device at each
//! configured sample rate (44.1 kHz then 48 kHz by default), reopening the
//! stream between rates. Exit status is 0 on success, otherwise the failing
//! step's error code.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tonegen_ap::engine::CpalEngine;
use tonegen_ap::{Error, ErrorCode, SessionConfig, SessionController, SessionReport};
use tonegen_common::config::{load_config, TomlConfig};
use tonegen_common::logging::init_logging;
use tracing::{error, info};

/// Command-line arguments for tonegen-ap
#[derive(Parser, Debug)]
#[command(name = "tonegen-ap")]
#[command(about = "Stereo sine test tone with sample rate switching")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "TONEGEN_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(ErrorCode::Config.as_u8());
        }
    };

    init_logging(&config.logging);

    match run(&config) {
        Ok(report) => {
            info!("Played sample rates {:?}", report.sample_rates());
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = e
                .downcast_ref::<Error>()
                .map(Error::code)
                .unwrap_or(ErrorCode::Config);

            error!("An error occurred while using the audio stream");
            error!("Error number: {}", code.as_u8());
            error!("Error message: {:#}", e);
            ExitCode::from(code.as_u8())
        }
    }
}

fn run(config: &TomlConfig) -> Result<SessionReport> {
    let session = SessionConfig::from(&config.session);
    info!(
        "Sample rates {:?}, {} frames per buffer, {:?} each",
        session.sample_rates, session.frames_per_buffer, session.play_duration
    );

    let mut controller = SessionController::new(CpalEngine::new(), session);
    controller.run().context("Sine sweep session failed")
}
