use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::Observation;
use crate::readers::{CpcReader, GsodReader};
use crate::store::TemperatureStore;

/// Which feeds supply a date's observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPlan {
    /// The CPC report covers the requested date: keep its rows and add GSOD
    /// rows for the stations flagged `gsod_daily`.
    MergeWithGsodSubset,
    /// The CPC report covers some other date (not yet published for the
    /// requested one): discard it and query GSOD for every GSOD station.
    GsodOnly,
}

/// What `ensure_temperatures` did for a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Observations were already stored; nothing was fetched.
    AlreadyLoaded { count: u64 },
    /// A fetch round ran and `count` rows were committed in one batch.
    Loaded { plan: FeedPlan, count: usize },
}

/// The two-feed reconciliation decision, separated from the fetch mechanics
/// so it can be tested as a plain function.
pub fn select_feeds(report_date: NaiveDate, requested: NaiveDate) -> FeedPlan {
    if report_date == requested {
        FeedPlan::MergeWithGsodSubset
    } else {
        FeedPlan::GsodOnly
    }
}

/// Combine feed results according to the plan. Under `GsodOnly` no primary
/// row may survive.
pub fn merged_observations(
    plan: FeedPlan,
    primary: Vec<Observation>,
    secondary: Vec<Observation>,
) -> Vec<Observation> {
    match plan {
        FeedPlan::MergeWithGsodSubset => {
            let mut merged = primary;
            merged.extend(secondary);
            merged
        }
        FeedPlan::GsodOnly => secondary,
    }
}

/// Make sure the store holds the date's observations, fetching at most once.
///
/// The at-most-once guarantee is the count check: a date with any stored
/// rows is never re-fetched. A date whose fetch round yields zero usable
/// rows stays at count zero and will be re-fetched on the next attempt —
/// indistinguishable, by design, from a date never attempted.
pub async fn ensure_temperatures(
    store: &TemperatureStore,
    cpc: &CpcReader,
    gsod: &GsodReader,
    date: NaiveDate,
) -> Result<IngestOutcome> {
    let existing = store.count_observations(date).await?;
    if existing > 0 {
        debug!("{} already has {} observations, skipping fetch", date, existing);
        return Ok(IngestOutcome::AlreadyLoaded { count: existing });
    }

    info!("downloading data for {}", date);
    let report = cpc.fetch().await?;
    let plan = select_feeds(report.date, date);

    let secondary = match plan {
        FeedPlan::MergeWithGsodSubset => {
            let subset = store.gsod_daily_stations().await?;
            gsod.fetch(date, date, &subset).await?
        }
        FeedPlan::GsodOnly => {
            debug!(
                "CPC report is for {}, falling back to GSOD for {}",
                report.date, date
            );
            let all_gsod = store.gsod_source_stations().await?;
            gsod.fetch(date, date, &all_gsod).await?
        }
    };

    let observations = merged_observations(plan, report.observations, secondary);
    if observations.is_empty() {
        warn!(
            "no usable observations for {}; the date will be re-fetched on the next attempt",
            date
        );
    }
    let count = store.insert_observations(&observations).await?;
    Ok(IngestOutcome::Loaded { plan, count })
}
