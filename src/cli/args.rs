use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::{CDO_QUERY_URL, CPC_DAILY_URL, DEFAULT_CATALOG_DIR, DEFAULT_DATABASE};

#[derive(Parser)]
#[command(name = "gdd-raster")]
#[command(about = "Daily growing-degree-day raster surfaces from station temperatures")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// First date to process, YYYY-MM-DD [default: today]
    pub begin: Option<NaiveDate>,

    /// Last date to process, inclusive, YYYY-MM-DD [default: BEGIN]
    pub end: Option<NaiveDate>,

    #[arg(
        long,
        global = true,
        default_value = DEFAULT_DATABASE,
        help = "Temperature store database path"
    )]
    pub database: PathBuf,

    #[arg(
        long,
        global = true,
        default_value = DEFAULT_CATALOG_DIR,
        help = "Raster catalog directory"
    )]
    pub catalog: PathBuf,

    #[arg(long, global = true, default_value = CPC_DAILY_URL, help = "CPC daily report URL")]
    pub cpc_url: String,

    #[arg(long, global = true, default_value = CDO_QUERY_URL, help = "CDO/GSOD query URL")]
    pub gsod_url: String,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load station metadata from a CSV file into the temperature store
    Bootstrap {
        #[arg(short, long, help = "Station metadata CSV file")]
        stations_file: PathBuf,
    },
}
