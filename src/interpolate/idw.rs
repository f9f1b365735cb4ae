use chrono::NaiveDate;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::error::Result;
use crate::models::{FieldKind, GridSpec, RasterField};
use crate::utils::{IDW_MAX_RADIUS, IDW_NEIGHBOR_COUNT, IDW_POWER};

/// One scalar sample at a projected location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

type TreePoint = GeomWithData<[f64; 2], f64>;

/// Inverse-distance-weighted estimator over a scattered point set.
///
/// For each cell center the nearest `neighbor_count` samples within
/// `max_radius` map units are weighted by `1 / d^power`. Cells with no
/// sample inside the radius get `f32::NAN` (no data). A sample at the cell
/// center itself short-circuits to its own value, since its weight would be
/// unbounded.
pub struct IdwInterpolator {
    power: f64,
    neighbor_count: usize,
    max_radius: f64,
}

impl Default for IdwInterpolator {
    fn default() -> Self {
        Self {
            power: IDW_POWER,
            neighbor_count: IDW_NEIGHBOR_COUNT,
            max_radius: IDW_MAX_RADIUS,
        }
    }
}

impl IdwInterpolator {
    pub fn new(power: f64, neighbor_count: usize, max_radius: f64) -> Self {
        Self {
            power,
            neighbor_count,
            max_radius,
        }
    }

    /// Interpolate a continuous surface over `spec` from the sample set.
    pub fn surface(
        &self,
        points: &[SamplePoint],
        spec: GridSpec,
        date: NaiveDate,
        kind: FieldKind,
    ) -> Result<RasterField> {
        let tree = RTree::bulk_load(
            points
                .iter()
                .map(|p| TreePoint::new([p.x, p.y], p.value))
                .collect(),
        );

        let (nrows, ncols) = (spec.nrows(), spec.ncols());
        let mut values = Vec::with_capacity(spec.cell_count());
        for row in 0..nrows {
            for col in 0..ncols {
                let (x, y) = spec.cell_center(row, col);
                values.push(self.estimate(&tree, x, y));
            }
        }
        RasterField::new(date, kind, spec, values)
    }

    fn estimate(&self, tree: &RTree<TreePoint>, x: f64, y: f64) -> f32 {
        let radius_sq = self.max_radius * self.max_radius;
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        let mut found = 0usize;

        for (point, dist_sq) in tree.nearest_neighbor_iter_with_distance_2(&[x, y]) {
            if dist_sq > radius_sq || found >= self.neighbor_count {
                break;
            }
            if dist_sq <= f64::EPSILON {
                return point.data as f32;
            }
            let weight = 1.0 / dist_sq.sqrt().powf(self.power);
            numerator += weight * point.data;
            denominator += weight;
            found += 1;
        }

        if found == 0 {
            f32::NAN
        } else {
            (numerator / denominator) as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
    }

    fn small_grid() -> GridSpec {
        // 4x4 cells of 10 map units
        GridSpec::new(0.0, 0.0, 40.0, 40.0, 10.0)
    }

    #[test]
    fn test_exact_hit_returns_sample_value() {
        let engine = IdwInterpolator::new(2.0, 10, 100.0);
        let points = vec![
            SamplePoint {
                x: 5.0,
                y: 5.0,
                value: 42.0,
            },
            SamplePoint {
                x: 35.0,
                y: 35.0,
                value: 10.0,
            },
        ];
        let field = engine
            .surface(&points, small_grid(), date(), FieldKind::InterpolatedMax)
            .unwrap();
        assert_eq!(field.value_at(0, 0), 42.0);
        assert_eq!(field.value_at(3, 3), 10.0);
    }

    #[test]
    fn test_nearer_sample_dominates() {
        let engine = IdwInterpolator::default();
        let points = vec![
            SamplePoint {
                x: 5.0,
                y: 5.0,
                value: 100.0,
            },
            SamplePoint {
                x: 35.0,
                y: 35.0,
                value: 0.0,
            },
        ];
        let field = engine
            .surface(&points, small_grid(), date(), FieldKind::InterpolatedMax)
            .unwrap();
        // Cell (0,1) is far closer to the 100-valued sample.
        let near = field.value_at(0, 1);
        assert!(near > 50.0, "expected nearer sample to dominate, got {}", near);
    }

    #[test]
    fn test_equidistant_samples_average() {
        let engine = IdwInterpolator::default();
        let points = vec![
            SamplePoint {
                x: 5.0,
                y: 15.0,
                value: 20.0,
            },
            SamplePoint {
                x: 25.0,
                y: 15.0,
                value: 40.0,
            },
        ];
        let field = engine
            .surface(&points, small_grid(), date(), FieldKind::InterpolatedMin)
            .unwrap();
        // Cell center (15, 15) is 10 units from both samples.
        assert_eq!(field.value_at(1, 1), 30.0);
    }

    #[test]
    fn test_out_of_radius_is_nan() {
        let engine = IdwInterpolator::new(2.0, 10, 15.0);
        let points = vec![SamplePoint {
            x: 5.0,
            y: 5.0,
            value: 50.0,
        }];
        let field = engine
            .surface(&points, small_grid(), date(), FieldKind::InterpolatedMax)
            .unwrap();
        assert!(!field.value_at(0, 0).is_nan());
        // The far corner is ~42 units away, past the 15-unit radius.
        assert!(field.value_at(3, 3).is_nan());
    }

    #[test]
    fn test_neighbor_count_caps_contributions() {
        // Two near samples and a distant outlier: with the count capped at
        // 2, the outlier never contributes even though it is inside the
        // search radius.
        let engine = IdwInterpolator::new(2.0, 2, 1000.0);
        let points = vec![
            SamplePoint {
                x: 14.0,
                y: 15.0,
                value: 10.0,
            },
            SamplePoint {
                x: 16.0,
                y: 15.0,
                value: 30.0,
            },
            SamplePoint {
                x: 15.0,
                y: 39.0,
                value: 1000.0,
            },
        ];
        let field = engine
            .surface(&points, small_grid(), date(), FieldKind::InterpolatedMax)
            .unwrap();
        // Cell center (15, 15): two nearest are equidistant, third is capped out.
        assert_eq!(field.value_at(1, 1), 20.0);
    }
}
