pub mod temperature;

pub use temperature::{StationSample, TemperatureStore};
