//! CLI Module
//!
//! Command-line interface for the SEA engine.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SEA Engine - Statistical Energy Analysis from the command line
#[derive(Parser, Debug)]
#[command(name = "sea-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an empty project file
    #[command(name = "new")]
    New {
        /// Path of the project file
        path: PathBuf,

        /// Project name
        #[arg(short, long)]
        name: Option<String>,

        /// Engine configuration file supplying the frequency axis
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a project built from a template with default parameters
    #[command(name = "template")]
    Template {
        /// two_rooms, vehicle_cabin or box_enclosure
        kind: String,

        /// Path of the project file
        path: PathBuf,

        /// Engine configuration file supplying the frequency axis
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Solve a project and write the export document
    #[command(name = "solve")]
    Solve {
        /// Path of the project file
        project: PathBuf,

        /// Engine configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Solve bands one after another
        #[arg(long)]
        serial: bool,

        /// Output file (stdout when absent)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also write a per-band CSV table
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Print the geometry view of a project
    #[command(name = "geometry")]
    Geometry {
        /// Path of the project file
        project: PathBuf,
    },

    /// List the standard material library
    #[command(name = "materials")]
    Materials,
}
