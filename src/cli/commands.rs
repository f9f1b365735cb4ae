use std::path::Path;

use chrono::{Local, NaiveDate};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, Commands};
use crate::error::{PipelineError, Result, Stage};
use crate::models::GridSpec;
use crate::processors::{
    accumulate, daily_gdd, ensure_temperatures, FieldSynthesizer, IngestOutcome,
};
use crate::readers::{CpcReader, GsodReader, StationReader};
use crate::store::TemperatureStore;
use crate::utils::progress::ProgressReporter;
use crate::utils::{GRID_CELL_SIZE, GRID_XMAX, GRID_XMIN, GRID_YMAX, GRID_YMIN};
use crate::writers::{previous_entry, RasterCatalog};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Bootstrap { ref stations_file }) => bootstrap(&cli, stations_file).await,
        None => run_range(&cli).await,
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "gdd_raster=debug"
    } else {
        "gdd_raster=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn bootstrap(cli: &Cli, stations_file: &Path) -> Result<()> {
    let progress = ProgressReporter::new_spinner("Loading station metadata...", cli.quiet);
    let stations = StationReader::new().read_stations(stations_file)?;
    let store = TemperatureStore::open(&cli.database).await?;
    let count = store.insert_stations(&stations).await?;
    progress.finish_with_message(&format!(
        "Loaded {} stations into {}",
        count,
        cli.database.display()
    ));
    Ok(())
}

/// Apply the date-range defaults and reject an inverted range. Runs before
/// any store or feed is touched.
fn resolve_range(begin: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(NaiveDate, NaiveDate)> {
    let begin = begin.unwrap_or_else(|| Local::now().date_naive());
    let end = end.unwrap_or(begin);
    if end < begin {
        return Err(PipelineError::InvalidDateRange { begin, end });
    }
    Ok((begin, end))
}

async fn run_range(cli: &Cli) -> Result<()> {
    let (begin, end) = resolve_range(cli.begin, cli.end)?;

    let store = TemperatureStore::open(&cli.database).await?;
    let catalog = RasterCatalog::open(&cli.catalog)?;
    let client = Client::new();
    let cpc = CpcReader::new(client.clone(), &cli.cpc_url);
    let gsod = GsodReader::new(client, &cli.gsod_url);
    let spec = GridSpec::new(GRID_XMIN, GRID_YMIN, GRID_XMAX, GRID_YMAX, GRID_CELL_SIZE);
    let synthesizer = FieldSynthesizer::new(spec);

    let total = (end - begin).num_days() as u64 + 1;
    let progress = ProgressReporter::new(total, "Processing dates...", cli.quiet);

    // Strictly sequential and in date order: each date's accumulation needs
    // the previous date's catalog entry. A failure stops the loop instead of
    // skipping, so the chain never silently gains a gap.
    let mut date = begin;
    while date <= end {
        progress.set_message(&format!("Processing {}", date));
        process_date(&store, &catalog, &cpc, &gsod, &synthesizer, date).await?;
        progress.increment(1);
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    progress.finish_with_message(&format!("Processed {} dates", total));
    Ok(())
}

/// The full pipeline for one date. Every error is labeled with the date and
/// the failing stage so a manual re-run is unambiguous.
async fn process_date(
    store: &TemperatureStore,
    catalog: &RasterCatalog,
    cpc: &CpcReader,
    gsod: &GsodReader,
    synthesizer: &FieldSynthesizer,
    date: NaiveDate,
) -> Result<()> {
    let outcome = ensure_temperatures(store, cpc, gsod, date)
        .await
        .map_err(|e| e.at_stage(date, Stage::Ingestion))?;
    if let IngestOutcome::Loaded { count, .. } = &outcome {
        info!("stored {} observations for {}", count, date);
    }

    let (tmin_field, tmax_field) = synthesizer
        .interpolate_day(store, date)
        .await
        .map_err(|e| e.at_stage(date, Stage::Interpolation))?;

    let daily = daily_gdd(&tmin_field, &tmax_field)
        .map_err(|e| e.at_stage(date, Stage::Accumulation))?;
    let previous =
        previous_entry(catalog, date).map_err(|e| e.at_stage(date, Stage::Accumulation))?;
    let accumulated = accumulate(&daily, previous.as_ref().map(|entry| &entry.field))
        .map_err(|e| e.at_stage(date, Stage::Accumulation))?;

    let name = catalog
        .publish(&accumulated, date)
        .map_err(|e| e.at_stage(date, Stage::Publish))?;
    info!("published {}", name);
    Ok(())
}
