use crate::error::Result;
use crate::models::{FieldKind, RasterField};
use crate::utils::{GDD_BASE_TEMP, GDD_DAILY_CAP};

/// Cell-wise daily growing degree days from the interpolated temperature
/// surfaces: `clamp((tmax + tmin) / 2 - base, 0, cap)`.
///
/// The floor models the minimum growth threshold, the cap the saturation
/// ceiling of the biological response curve. NaN (no-data) cells stay NaN.
pub fn daily_gdd(tmin_field: &RasterField, tmax_field: &RasterField) -> Result<RasterField> {
    tmax_field.zip_with(tmin_field, FieldKind::DailyGdd, |tmax, tmin| {
        ((tmax + tmin) / 2.0 - GDD_BASE_TEMP).clamp(0.0, GDD_DAILY_CAP)
    })
}

/// Chain a daily field onto the previous date's accumulated field.
///
/// With no previous entry (start of series or a gap) the daily field starts
/// a new chain. The catalog, not process memory, carries the running total,
/// so a restart resumes from the last catalogued entry.
pub fn accumulate(daily: &RasterField, previous: Option<&RasterField>) -> Result<RasterField> {
    match previous {
        Some(prev) => daily.zip_with(prev, FieldKind::AccumulatedGdd, |d, p| d + p),
        None => Ok(daily.map(FieldKind::AccumulatedGdd, |v| v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GridSpec;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn spec() -> GridSpec {
        GridSpec::new(0.0, 0.0, 20.0, 10.0, 10.0)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
    }

    fn field(kind: FieldKind, values: Vec<f32>) -> RasterField {
        RasterField::new(date(), kind, spec(), values).unwrap()
    }

    #[test]
    fn test_daily_gdd_formula() {
        let tmin = field(FieldKind::InterpolatedMin, vec![62.0, 50.0]);
        let tmax = field(FieldKind::InterpolatedMax, vec![81.0, 70.0]);
        let gdd = daily_gdd(&tmin, &tmax).unwrap();
        assert_eq!(gdd.kind, FieldKind::DailyGdd);
        assert_eq!(gdd.values, vec![21.5, 10.0]);
    }

    #[test]
    fn test_daily_gdd_clamps_both_ends() {
        // Cold cell: (30+20)/2 - 50 = -25 -> 0. Hot cell: (120+100)/2 - 50 = 60 -> 36.
        let tmin = field(FieldKind::InterpolatedMin, vec![20.0, 100.0]);
        let tmax = field(FieldKind::InterpolatedMax, vec![30.0, 120.0]);
        let gdd = daily_gdd(&tmin, &tmax).unwrap();
        assert_eq!(gdd.values, vec![0.0, 36.0]);
    }

    #[test]
    fn test_daily_gdd_propagates_nan() {
        let tmin = field(FieldKind::InterpolatedMin, vec![f32::NAN, 60.0]);
        let tmax = field(FieldKind::InterpolatedMax, vec![80.0, 80.0]);
        let gdd = daily_gdd(&tmin, &tmax).unwrap();
        assert!(gdd.values[0].is_nan());
        assert_eq!(gdd.values[1], 20.0);
    }

    #[test]
    fn test_accumulate_without_previous() {
        let daily = field(FieldKind::DailyGdd, vec![5.0, 12.0]);
        let accumulated = accumulate(&daily, None).unwrap();
        assert_eq!(accumulated.kind, FieldKind::AccumulatedGdd);
        assert_eq!(accumulated.values, daily.values);
    }

    #[test]
    fn test_accumulate_chains_cell_wise() {
        let daily = field(FieldKind::DailyGdd, vec![5.0, 12.0]);
        let previous = field(FieldKind::AccumulatedGdd, vec![100.0, 7.5]);
        let accumulated = accumulate(&daily, Some(&previous)).unwrap();
        assert_eq!(accumulated.values, vec![105.0, 19.5]);
    }

    #[test]
    fn test_accumulate_rejects_mismatched_grids() {
        let daily = field(FieldKind::DailyGdd, vec![5.0, 12.0]);
        let other_spec = GridSpec::new(0.0, 0.0, 10.0, 10.0, 10.0);
        let previous =
            RasterField::new(date(), FieldKind::AccumulatedGdd, other_spec, vec![1.0]).unwrap();
        assert!(accumulate(&daily, Some(&previous)).is_err());
    }
}
