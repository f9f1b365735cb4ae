pub mod catalog;

pub use catalog::{previous_entry, RasterCatalog};
