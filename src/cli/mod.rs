//! CLI Module
//!
//! Command-line interface for audioflow.

pub mod commands;
pub mod sox_args;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use sox_args::{FlowPlan, SoxArgs};

/// audioflow - offline audio effect chains
#[derive(Parser, Debug)]
#[command(name = "audioflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a sox-style command line: [options] infile [options] outfile [effect [args]]...
    #[command(name = "sox")]
    Sox {
        /// sox arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },

    /// Show the signal and encoding of a file
    #[command(name = "info")]
    Info {
        /// Audio file
        path: PathBuf,
    },

    /// List available effects
    #[command(name = "effects")]
    Effects,

    /// Apply a JSON effect chain to a file
    #[command(name = "run")]
    Run {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,

        /// JSON array of {"name", "args"} effects
        #[arg(short, long)]
        chain: PathBuf,

        /// Output precision in bits
        #[arg(short = 'b', long)]
        precision: Option<u32>,
    },
}
