// SPDX-License-Identifier: MIT OR Apache-2.0
//! `panoseq` - Panorama camera sequence runner
//!
//! Loads stored camera sequences for a panorama view and plays them
//! headlessly with a fixed-rate tick loop:
//! - Listing and migrating sequence stores (canonical and legacy JSON)
//! - Playback from the first keyframe or from a given live pose
//! - Action scripts that build, edit, play and export sequences
//!
//! ## Architecture
//!
//! All sequencing lives in `panoseq_sequencer`. This binary wires it to a
//! headless renderer, RON settings and the command line.

mod cli;
mod error;
mod script;
mod session;
mod settings;
mod viewer;

use cli::{Cli, Command};
use error::{AppError, Result};
use session::{PlaybackReport, Session};
use settings::{ViewerSettings, SETTINGS_FILE_NAME};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("panoseq_app=info,panoseq_sequencer=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting panoseq v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(std::env::args().skip(1)) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: impl Iterator<Item = String>) -> Result<()> {
    let cli = Cli::parse(args)?;

    if cli.command == Command::Help {
        println!("{}", cli::USAGE);
        return Ok(());
    }
    if let Command::InitConfig { path } = &cli.command {
        let path = path.clone().unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME));
        ViewerSettings::default().save(&path)?;
        tracing::info!("Wrote default settings to {path:?}");
        return Ok(());
    }

    let settings = match &cli.config {
        Some(path) => ViewerSettings::load(path)?,
        None => ViewerSettings::load_or_default(Path::new(SETTINGS_FILE_NAME))?,
    };
    let mut session = Session::new(settings);

    match cli.command {
        Command::List { file } => {
            session.import_file(&file)?;
            let store = session.store();
            if store.is_empty() {
                println!("No sequences");
            }
            for sequence in store.sequences() {
                println!(
                    "{}\t{} keyframes\t{:.2}s{}",
                    sequence.name,
                    sequence.len(),
                    sequence.duration(),
                    if sequence.start_from_current_position {
                        "\tfrom current"
                    } else {
                        ""
                    }
                );
            }
        }
        Command::Play {
            file,
            sequence,
            from,
            json,
        } => {
            session.import_file(&file)?;
            if let Some(pose) = from {
                session.look_at(pose)?;
            }
            let report = session.play(&sequence)?;
            print_reports(&[report], json)?;
        }
        Command::Run { script: path, json } => {
            let source = std::fs::read_to_string(&path).map_err(|e| AppError::io(&path, e))?;
            let actions = script::parse(&source)?;
            let reports = session.run_script(&actions)?;
            print_reports(&reports, json)?;
        }
        Command::Migrate { input, output } => {
            let format = session.import_file(&input)?;
            session.export_file(&output)?;
            tracing::info!(
                "Migrated {} sequences from {format:?} format",
                session.store().len()
            );
        }
        Command::InitConfig { .. } | Command::Help => {}
    }
    Ok(())
}

fn print_reports(reports: &[PlaybackReport], json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(reports)
            .map_err(|e| AppError::Sequencer(e.into()))?;
        println!("{text}");
        return Ok(());
    }
    for report in reports {
        let pose = report.final_pose;
        println!(
            "{}: {} segments, {} ticks, {:.2}s, ended at yaw {:.2} pitch {:.2} hfov {:.2}",
            report.sequence,
            report.segments,
            report.ticks,
            report.elapsed,
            pose.yaw,
            pose.pitch,
            pose.hfov
        );
    }
    Ok(())
}
