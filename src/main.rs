mod config;
mod replay;
mod script;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Cli;
use replay::{ReplayError, Replayer};

fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: &Cli) -> Result<(), ReplayError> {
    let mut replayer = Replayer::new(cli.history_limits(), cli.viewport, cli.strict);

    if let Some(path) = &cli.snapshot {
        let file = File::open(path).map_err(|source| ReplayError::Read { what: path.display().to_string(), source })?;
        replayer.load_snapshot(BufReader::new(file))?;
        info!(path = %path.display(), "snapshot loaded");
    }

    let reader: Box<dyn BufRead> = if cli.script == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&cli.script).map_err(|source| ReplayError::Read { what: cli.script.clone(), source })?;
        Box::new(BufReader::new(file))
    };
    let events = script::parse_script(reader)?;
    replayer.run(&events)?;

    match &cli.out {
        Some(path) => {
            let file = File::create(path).map_err(ReplayError::Write)?;
            replayer.write_snapshot(file)?;
            info!(path = %path.display(), "snapshot written");
        }
        None => replayer.write_snapshot(io::stdout().lock())?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "replay failed");
            ExitCode::FAILURE
        }
    }
}
