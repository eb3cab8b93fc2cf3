//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// EnviroGeo - Environmental monitoring for a selected area and period
#[derive(Parser)]
#[command(name = "envirogeo")]
#[command(about = "Environmental parameter analysis and NDVI monitoring", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file path
    ///
    /// Defaults to envirogeo/config.toml in the platform data directory.
    /// ENVIROGEO_* environment variables override file values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable API key authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// List supported environmental parameters
    Parameters,

    /// Analyze one parameter over an area and date range
    Analyze(AnalyzeArgs),

    /// Show or delete a user's saved analyses
    History {
        /// User whose history to show
        #[arg(short, long)]
        user: String,

        /// Delete the analysis with this id instead of listing
        #[arg(long)]
        delete: Option<String>,
    },
}

#[derive(clap::Args, Clone)]
pub struct AnalyzeArgs {
    /// Parameter id or name (e.g. NDVI, "Soil Moisture", soil_moisture)
    #[arg(short, long)]
    pub parameter: String,

    /// Latitude of the point to analyze
    #[arg(long, allow_negative_numbers = true, conflicts_with = "bbox")]
    pub lat: Option<f64>,

    /// Longitude of the point to analyze
    #[arg(long, allow_negative_numbers = true, conflicts_with = "bbox")]
    pub lon: Option<f64>,

    /// Bounding box as NORTH,SOUTH,EAST,WEST
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub to: NaiveDate,

    /// Write the result to a file: csv or geojson
    #[arg(long)]
    pub export: Option<String>,

    /// Directory for exported files
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Save the result to this user's history
    #[arg(long)]
    pub save_as: Option<String>,
}
