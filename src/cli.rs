//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use customfit_forms::Units;

/// CustomFit - form engine driver
#[derive(Parser, Debug)]
#[command(name = "customfit")]
#[command(version)]
#[command(about = "Run CustomFit form checks and wizard wiring without a browser")]
#[command(
    long_about = "Checks swatch gauges and body measurements, formats schematic measurements, quotes gift certificates and simulates the design wizard's dependent fields and schematic overlay."
)]
pub struct Cli {
    /// Unit system of the numbers given (defaults to CUSTOMFIT_UNITS, then inches)
    #[arg(short, long, global = true)]
    pub units: Option<Units>,

    /// Print machine-readable JSON
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a swatch gauge
    Gauge {
        /// Stitches (or rows) counted
        #[arg(short, long)]
        number: String,

        /// Length they were counted over
        #[arg(short, long)]
        length: String,

        /// Check a row gauge instead of a stitch gauge
        #[arg(short, long, default_value_t = false)]
        rows: bool,
    },

    /// Check body measurements for implausible values
    Body {
        #[arg(long)]
        bust_circ: Option<String>,

        #[arg(long)]
        upper_torso_circ: Option<String>,

        #[arg(long)]
        cross_chest_distance: Option<String>,

        #[arg(long)]
        armpit_to_waist: Option<String>,

        #[arg(long)]
        armpit_to_high_hip: Option<String>,

        #[arg(long)]
        armpit_to_med_hip: Option<String>,
    },

    /// Format a measurement in inches as `in / cm`
    Measure {
        /// Length in inches
        inches: f64,
    },

    /// Simulate the design wizard
    Wizard {
        /// Field edits applied in order, as field=value
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<String>,

        /// JSON file mapping schematic image names to URLs
        #[arg(long)]
        sources: Option<PathBuf>,

        /// Reveal the neckline depth orientation option
        #[arg(long, default_value_t = false)]
        reveal_neckline_depth: bool,
    },

    /// Quote a gift certificate purchase
    Quote {
        /// Number of patterns
        quantity: String,
    },

    /// Validate a TOML or JSON form declaration and simulate edits on it
    Check {
        /// Declaration file
        declaration: PathBuf,

        /// Field edits applied in order, as field=value
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<String>,
    },
}
