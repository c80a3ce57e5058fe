//! # CustomFit - form engine driver
//!
//! Runs the headless form engine from the command line: the same warning
//! checks, measurement formatting, pricing and design wizard wiring the
//! pattern pages use, against a recording surface instead of a browser.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use customfit_forms::Units;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let units = cli.units.unwrap_or_else(|| Units::from_env_or(Units::Inches));
    commands::execute_command(cli.command, units, cli.json)
}

/// Initialize tracing subscriber with environment filter. Logs go to stderr
/// so command output stays clean.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
