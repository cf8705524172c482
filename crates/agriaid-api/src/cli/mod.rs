//! Command-line interface definitions.

pub mod chat;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// AgriAid SMS assistant for farmers.
#[derive(Parser)]
#[command(name = "agriaid", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, env = "AGRIAID_CONFIG", default_value = "agriaid.toml")]
    pub config: PathBuf,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the SMS webhook server.
    Serve {
        /// Port to listen on (overrides the config file).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file).
        #[arg(long)]
        host: Option<String>,
    },

    /// Chat with the assistant from the terminal as if texting from a phone.
    Chat {
        /// Phone number to impersonate, e.g. +254712345678.
        #[arg(long)]
        phone: String,
    },
}

impl Cli {
    /// Default log filter for the chosen verbosity. `RUST_LOG` still wins.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn,agriaid=info",
            1 => "info,agriaid=debug",
            _ => "trace",
        }
    }
}
