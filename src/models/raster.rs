use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Fixed output grid geometry: a projected extent divided into square cells.
///
/// Cells are indexed row-major from the lower-left corner; values are sampled
/// at cell centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub cell_size: f64,
}

impl GridSpec {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64, cell_size: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            cell_size,
        }
    }

    pub fn ncols(&self) -> usize {
        ((self.xmax - self.xmin) / self.cell_size).ceil() as usize
    }

    pub fn nrows(&self) -> usize {
        ((self.ymax - self.ymin) / self.cell_size).ceil() as usize
    }

    pub fn cell_count(&self) -> usize {
        self.ncols() * self.nrows()
    }

    /// Projected coordinates of a cell center.
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let x = self.xmin + (col as f64 + 0.5) * self.cell_size;
        let y = self.ymin + (row as f64 + 0.5) * self.cell_size;
        (x, y)
    }
}

/// What a raster field holds. Only accumulated fields are catalogued; the
/// other kinds are intermediate products of a single date's run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    InterpolatedMin,
    InterpolatedMax,
    DailyGdd,
    AccumulatedGdd,
}

/// A dense 2-D surface over the output extent for one date.
///
/// Cells with no data (no station within the interpolation search radius)
/// are `f32::NAN`; NaN propagates through all cell-wise operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterField {
    pub date: NaiveDate,
    pub kind: FieldKind,
    pub spec: GridSpec,
    pub values: Vec<f32>,
}

impl RasterField {
    pub fn new(date: NaiveDate, kind: FieldKind, spec: GridSpec, values: Vec<f32>) -> Result<Self> {
        if values.len() != spec.cell_count() {
            return Err(PipelineError::ShapeMismatch(format!(
                "{} values for a {}x{} grid",
                values.len(),
                spec.nrows(),
                spec.ncols()
            )));
        }
        Ok(Self {
            date,
            kind,
            spec,
            values,
        })
    }

    /// Cell-wise transform, keeping the grid geometry.
    pub fn map<F>(&self, kind: FieldKind, f: F) -> Self
    where
        F: Fn(f32) -> f32,
    {
        Self {
            date: self.date,
            kind,
            spec: self.spec,
            values: self.values.iter().map(|v| f(*v)).collect(),
        }
    }

    /// Cell-wise combination of two fields on the same grid. A geometry
    /// mismatch is a hard error: silently combining misaligned grids would
    /// corrupt every later day of the accumulation chain.
    pub fn zip_with<F>(&self, other: &RasterField, kind: FieldKind, f: F) -> Result<Self>
    where
        F: Fn(f32, f32) -> f32,
    {
        if self.spec != other.spec {
            return Err(PipelineError::ShapeMismatch(format!(
                "cannot combine {:?} grid with {:?} grid",
                self.spec, other.spec
            )));
        }
        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| f(*a, *b))
            .collect();
        Ok(Self {
            date: self.date,
            kind,
            spec: self.spec,
            values,
        })
    }

    /// Value at (row, col), row 0 at the bottom edge.
    pub fn value_at(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.spec.ncols() + col]
    }

    /// Value of the cell containing the projected point, if inside the extent.
    pub fn value_near(&self, x: f64, y: f64) -> Option<f32> {
        if x < self.spec.xmin || x >= self.spec.xmax || y < self.spec.ymin || y >= self.spec.ymax {
            return None;
        }
        let col = ((x - self.spec.xmin) / self.spec.cell_size) as usize;
        let row = ((y - self.spec.ymin) / self.spec.cell_size) as usize;
        Some(self.value_at(row, col))
    }
}

/// One catalogued accumulated-GDD surface, addressable by entry name and by
/// date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub date: NaiveDate,
    pub field: RasterField,
}
