use clap::Parser;
use gdd_raster::cli::{run, Cli};
use gdd_raster::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
