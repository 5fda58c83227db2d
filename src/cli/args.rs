use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "weather-station")]
#[command(about = "Synthetic hourly temperatures per city, with range statistics")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Configuration file [default: weather-station.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Temperature of a city at an hour, or statistics over a period ending there
    Temp {
        #[arg(short, long, help = "City name or code [default: from configuration]")]
        city: Option<String>,

        #[arg(
            short,
            long,
            help = "Local time (2015-04-02T17:00:00) or RFC 3339 [default: now]"
        )]
        date: Option<String>,

        #[arg(long, help = "Period ending at the date, e.g. 1Y2M3D, 3M or 10D")]
        duration: Option<String>,

        #[arg(long, help = "Keep generated readings in memory instead of the data directory")]
        in_memory: bool,

        #[arg(short, long, help = "Hide the progress bar")]
        quiet: bool,
    },

    /// List the known cities
    Cities,
}
