pub mod accumulator;
pub mod ingestion;
pub mod synthesizer;

pub use accumulator::{accumulate, daily_gdd};
pub use ingestion::{ensure_temperatures, select_feeds, FeedPlan, IngestOutcome};
pub use synthesizer::FieldSynthesizer;
