pub mod observation;
pub mod raster;
pub mod station;

pub use observation::Observation;
pub use raster::{CatalogEntry, FieldKind, GridSpec, RasterField};
pub use station::Station;
