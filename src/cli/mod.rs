//! CLI module - Command-line interface for Diorama
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Diorama - AniDB archive to JSON converter
/// Downloads the AniDB anime dump and writes normalized `anidb.json` records
#[derive(Parser)]
#[command(name = "diorama")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a config file (skips the default search locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download, unpack and convert the archive (default)
    Run,

    /// Download the archive only
    Fetch,

    /// Unpack a previously downloaded archive
    Unpack,

    /// Convert an unpacked archive into the JSON outputs
    #[command(alias = "c")]
    Convert {
        /// Directory holding the AnimeDoc_<id>.xml files
        #[arg(long)]
        source_dir: Option<String>,

        /// Skip documents that fail to parse instead of aborting
        #[arg(long)]
        skip_malformed: bool,
    },

    /// Extract a single document and print its record
    #[command(alias = "i")]
    Inspect {
        /// Path to an AnimeDoc_<id>.xml file
        file: PathBuf,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
