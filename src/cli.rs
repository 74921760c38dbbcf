use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nexus_memory::document::DocumentKind;

#[derive(Parser)]
#[command(
    name = "nexus",
    about = "Retrieval-augmented assistant for smart building maintenance",
    version
)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(
        global = true,
        long,
        env = "NEXUS_CONFIG",
        default_value = "config/default.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API (default)
    Serve,

    /// Split, embed and store a text file
    Ingest {
        /// Text or markdown file to ingest
        path: PathBuf,

        /// Document id (defaults to the file stem)
        #[arg(long)]
        id: Option<String>,

        /// Display name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,

        /// Document type: manual, specification, report or policy
        #[arg(long = "type", default_value = "manual")]
        kind: DocumentKind,
    },

    /// Ask a single question and print the answer
    Ask {
        message: String,
    },
}
