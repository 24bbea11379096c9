// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line parsing.

use crate::error::{AppError, Result};
use crate::script;
use panoseq_sequencer::CameraState;
use std::path::PathBuf;

/// Help text
pub const USAGE: &str = "\
Usage: panoseq [--config <settings.ron>] <command>

Commands:
  list <sequences.json>                      List sequences and their keyframe counts
  play <sequences.json> <name> [options]     Play a sequence headlessly
      --from <yaw,pitch,hfov>                Live pose before playback starts
      --json                                 Print the report as JSON
  run <script> [--json]                      Run an action script
  migrate <input.json> <output.json>         Rewrite a store in the canonical format
  init-config [path]                         Write default settings (panoseq.ron)
  help                                       Show this text

Logging is controlled by RUST_LOG.";

/// A parsed subcommand
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// List the sequences of a store file
    List {
        /// Store file
        file: PathBuf,
    },
    /// Play one sequence of a store file
    Play {
        /// Store file
        file: PathBuf,
        /// Sequence name
        sequence: String,
        /// Live pose before playback
        from: Option<CameraState>,
        /// Print the report as JSON
        json: bool,
    },
    /// Run an action script
    Run {
        /// Script file
        script: PathBuf,
        /// Print the reports as JSON
        json: bool,
    },
    /// Convert a store file to the canonical format
    Migrate {
        /// File to read
        input: PathBuf,
        /// File to write
        output: PathBuf,
    },
    /// Write a default settings file
    InitConfig {
        /// Destination, `panoseq.ron` when omitted
        path: Option<PathBuf>,
    },
    /// Print usage
    Help,
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Cli {
    /// Settings file given with `--config`
    pub config: Option<PathBuf>,
    /// Subcommand to run
    pub command: Command,
}

impl Cli {
    /// Parse arguments, excluding the program name
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = None;
        let mut from = None;
        let mut json = false;
        let mut positional = Vec::new();

        let mut args = args.into_iter().map(Into::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(value(&mut args, "--config")?)),
                "--from" => {
                    let text = value(&mut args, "--from")?;
                    from = Some(
                        script::parse_pose(&text)
                            .map_err(|e| AppError::Usage(format!("--from: {e}")))?,
                    );
                }
                "--json" => json = true,
                "-h" | "--help" => {
                    return Ok(Self {
                        config,
                        command: Command::Help,
                    })
                }
                flag if flag.starts_with("--") => {
                    return Err(AppError::Usage(format!("unknown option {flag}")));
                }
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let verb = positional.next().unwrap_or_else(|| "help".to_string());
        let mut next = |what: &str| {
            positional
                .next()
                .ok_or_else(|| AppError::Usage(format!("{verb} needs {what}")))
        };

        let command = match verb.as_str() {
            "list" => Command::List {
                file: next("a sequences file")?.into(),
            },
            "play" => Command::Play {
                file: next("a sequences file")?.into(),
                sequence: next("a sequence name")?,
                from,
                json,
            },
            "run" => Command::Run {
                script: next("a script file")?.into(),
                json,
            },
            "migrate" => Command::Migrate {
                input: next("an input file")?.into(),
                output: next("an output file")?.into(),
            },
            "init-config" => Command::InitConfig {
                path: positional.next().map(PathBuf::from),
            },
            "help" => Command::Help,
            other => return Err(AppError::Usage(format!("unknown command {other:?}"))),
        };

        if let Some(extra) = positional.next() {
            return Err(AppError::Usage(format!("unexpected argument {extra:?}")));
        }
        if from.is_some() && !matches!(command, Command::Play { .. }) {
            return Err(AppError::Usage("--from only applies to play".into()));
        }

        Ok(Self { config, command })
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| AppError::Usage(format!("{flag} needs a value")))
}
