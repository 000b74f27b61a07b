use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

/// Weft - DAG event and proposal tooling
#[derive(Parser)]
#[command(name = "weft")]
#[command(about = "Build, inspect and schedule DAG events")]
#[command(version)]
pub struct Cli {
    /// Log filter (e.g. info, debug, weft_event=trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a sample configuration with fresh validator keys
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "weft.json")]
        output: PathBuf,

        /// Number of validators to generate
        #[arg(long, default_value = "4")]
        validators: u32,
    },

    /// Generate a new keypair
    Keygen {
        /// Output file for secret key
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build and sign an event as the local validator
    Emit {
        /// Path to configuration file
        #[arg(short, long, default_value = "weft.json")]
        config: PathBuf,

        #[arg(long)]
        epoch: u32,

        #[arg(long, default_value = "1")]
        seq: u32,

        #[arg(long)]
        frame: u32,

        #[arg(long)]
        lamport: u32,

        /// Parent event ids (hex), self-parent first
        #[arg(long, value_delimiter = ',')]
        parents: Vec<String>,

        /// Turn of the last proposal seen through the parents
        #[arg(long, default_value = "0")]
        last_turn: u32,

        /// Frame of the last proposal seen through the parents
        #[arg(long, default_value = "0")]
        last_frame: u32,

        /// Block number to propose if this validator owns the open turn
        #[arg(long, default_value = "1")]
        block: u64,

        /// Write the encoded event to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Decode an encoded event and print its fields
    Decode {
        /// Encoded event as hex
        #[arg(long, conflicts_with = "file")]
        hex: Option<String>,

        /// File with the raw encoded event
        #[arg(long)]
        file: Option<PathBuf>,

        /// Configuration used to verify the creator's signature
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the proposer of a range of turns
    Schedule {
        /// Path to configuration file
        #[arg(short, long, default_value = "weft.json")]
        config: PathBuf,

        /// First turn
        #[arg(long, default_value = "0")]
        from: u32,

        /// Number of turns
        #[arg(long, default_value = "16")]
        count: u32,
    },

    /// Check whether a proposal may follow the last accepted one
    CheckTurn {
        last_turn: u32,
        last_frame: u32,
        next_turn: u32,
        next_frame: u32,
    },
}

impl Commands {
    /// Configuration file the command reads, if any
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Commands::Emit { config, .. } | Commands::Schedule { config, .. } => Some(config),
            Commands::Decode { config, .. } => config.as_deref(),
            _ => None,
        }
    }
}
