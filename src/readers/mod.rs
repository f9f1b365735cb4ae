pub mod cpc_reader;
pub mod gsod_reader;
pub mod station_reader;

pub use cpc_reader::{CpcReader, CpcReport};
pub use gsod_reader::GsodReader;
pub use station_reader::StationReader;
