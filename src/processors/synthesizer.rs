use chrono::NaiveDate;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::interpolate::{IdwInterpolator, SamplePoint};
use crate::models::{FieldKind, GridSpec, RasterField};
use crate::store::TemperatureStore;

/// Turns one day's point observations into continuous min and max
/// temperature surfaces.
pub struct FieldSynthesizer {
    engine: IdwInterpolator,
    spec: GridSpec,
}

impl FieldSynthesizer {
    pub fn new(spec: GridSpec) -> Self {
        Self {
            engine: IdwInterpolator::default(),
            spec,
        }
    }

    pub fn with_engine(spec: GridSpec, engine: IdwInterpolator) -> Self {
        Self { engine, spec }
    }

    /// Interpolate the date's station samples, once per temperature channel.
    /// An empty point set is an error: an all-NaN surface would silently
    /// poison the accumulation chain.
    pub async fn interpolate_day(
        &self,
        store: &TemperatureStore,
        date: NaiveDate,
    ) -> Result<(RasterField, RasterField)> {
        let samples = store.samples_for_date(date).await?;
        if samples.is_empty() {
            return Err(PipelineError::EmptyPointSet { date });
        }
        debug!("interpolating {} points for {}", samples.len(), date);

        let tmin_points: Vec<SamplePoint> = samples
            .iter()
            .map(|s| SamplePoint {
                x: s.easting,
                y: s.northing,
                value: s.tmin as f64,
            })
            .collect();
        let tmax_points: Vec<SamplePoint> = samples
            .iter()
            .map(|s| SamplePoint {
                x: s.easting,
                y: s.northing,
                value: s.tmax as f64,
            })
            .collect();

        let tmin_field =
            self.engine
                .surface(&tmin_points, self.spec, date, FieldKind::InterpolatedMin)?;
        let tmax_field =
            self.engine
                .surface(&tmax_points, self.spec, date, FieldKind::InterpolatedMax)?;
        Ok((tmin_field, tmax_field))
    }
}
