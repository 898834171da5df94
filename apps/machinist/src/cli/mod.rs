//! # Machinist CLI Module
//!
//! This module implements the CLI interface for Machinist.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show catalog row counts and fingerprint
//! - `init` - Create an empty catalog
//! - `import` - Load a seed file or snapshot into the catalog
//! - `export` - Write the catalog to a snapshot or JSON file
//! - `materials` - Run material selection
//! - `machines` - Run machine selection

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand, ValueEnum};
use machinist_core::{CatalogBackend, MachinistError};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Machinist - material and machine selection
///
/// Shortlists materials for an operating temperature, then finds machines
/// able to cut the chosen material to tolerance.
#[derive(Parser, Debug)]
#[command(name = "machinist")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./machinist.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the catalog (overrides [catalog] path)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend (overrides [catalog] backend)
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<BackendArg>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Storage backend flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// ACID redb database
    Redb,
    /// Binary snapshot file loaded into memory
    File,
}

impl From<BackendArg> for CatalogBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Redb => Self::Redb,
            BackendArg::File => Self::File,
        }
    }
}

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Binary snapshot (MCAT header + postcard)
    Snapshot,
    /// Pretty-printed JSON seed
    Json,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides [server] host)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides [server] port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show catalog status
    Status,

    /// Initialize a new empty catalog
    Init {
        /// Replace an existing catalog
        #[arg(short, long)]
        force: bool,
    },

    /// Import rows from a seed file (.json, .toml) or snapshot (.mcat)
    Import {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Export the catalog
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format
        #[arg(short = 't', long, value_enum, default_value = "snapshot")]
        format: ExportFormat,
    },

    /// Shortlist materials for an operating temperature
    Materials {
        /// Minimum operating temperature in °C (e.g. "650" or "650C")
        #[arg(short = 't', long, allow_hyphen_values = true)]
        min_temp: String,

        /// Require aerospace-grade materials
        #[arg(short, long)]
        aerospace: bool,
    },

    /// Find machines for a material category
    Machines {
        /// Material category (e.g. "Superalloy"), not an alloy name
        #[arg(short, long)]
        category: String,

        /// Required tolerance in mm (e.g. "0.01" or "±0.01mm")
        #[arg(short, long, allow_hyphen_values = true)]
        tolerance: String,

        /// Geometry complexity (simple, moderate, complex)
        #[arg(short, long)]
        geometry: Option<String>,

        /// Surface finish (standard, high, very high, mirror)
        #[arg(short, long)]
        finish: Option<String>,

        /// Required special feature (repeatable)
        #[arg(long = "feature")]
        features: Vec<String>,
    },
}

impl Cli {
    /// Apply the global flags that override configuration.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(path) = &self.database {
            config.catalog.path = path.clone();
        }
        if let Some(backend) = self.backend {
            config.catalog.backend = backend.into();
        }
        if let Some(Commands::Server { host, port }) = &self.command {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments and resolved configuration.
pub async fn execute(cli: Cli, config: AppConfig) -> Result<(), MachinistError> {
    let json_mode = cli.json_mode;
    let catalog = &config.catalog;

    match cli.command {
        Some(Commands::Server { .. }) => cmd_server(&config).await,
        Some(Commands::Status) | None => cmd_status(catalog, json_mode),
        Some(Commands::Init { force }) => cmd_init(catalog, force),
        Some(Commands::Import { file }) => cmd_import(catalog, json_mode, &file),
        Some(Commands::Export { output, format }) => cmd_export(catalog, &output, format),
        Some(Commands::Materials {
            min_temp,
            aerospace,
        }) => cmd_materials(catalog, json_mode, &min_temp, aerospace),
        Some(Commands::Machines {
            category,
            tolerance,
            geometry,
            finish,
            features,
        }) => cmd_machines(
            catalog,
            json_mode,
            MachinesArgs {
                category,
                tolerance,
                geometry,
                finish,
                features,
            },
        ),
    }
}
