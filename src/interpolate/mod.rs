pub mod idw;

pub use idw::{IdwInterpolator, SamplePoint};
