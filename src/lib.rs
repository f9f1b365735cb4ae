pub mod cli;
pub mod error;
pub mod interpolate;
pub mod models;
pub mod processors;
pub mod readers;
pub mod store;
pub mod utils;
pub mod writers;

pub use error::{PipelineError, Result};
