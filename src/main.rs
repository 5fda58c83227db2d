use clap::Parser;
use weather_station::cli::{run, Cli};
use weather_station::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
