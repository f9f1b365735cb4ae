use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Stage of the per-date pipeline, used to label failures so an operator
/// knows where a manual re-run has to pick up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingestion,
    Interpolation,
    Accumulation,
    Publish,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Ingestion => "ingestion",
            Stage::Interpolation => "interpolation",
            Stage::Accumulation => "accumulation",
            Stage::Publish => "publish",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Feed unavailable: {0}")]
    FeedUnavailable(#[from] reqwest::Error),

    #[error("Feed returned malformed data: {0}")]
    FeedMalformed(String),

    #[error("No stations with observations for {date}, cannot interpolate")]
    EmptyPointSet { date: NaiveDate },

    #[error("Temperature store failure: {0}")]
    StoreWriteFailure(#[from] sqlx::Error),

    #[error("Catalog encode error: {0}")]
    CatalogEncode(#[from] bincode::error::EncodeError),

    #[error("Catalog decode error: {0}")]
    CatalogDecode(#[from] bincode::error::DecodeError),

    #[error("Catalog index error: {0}")]
    CatalogIndex(#[from] serde_json::Error),

    #[error("Catalog entry {name} conflicts with an existing entry")]
    CatalogConflict { name: String },

    #[error("Raster shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid station data: {0}")]
    InvalidStation(#[from] validator::ValidationErrors),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("end date {end} is before begin date {begin}")]
    InvalidDateRange { begin: NaiveDate, end: NaiveDate },

    #[error("{stage} failed for {date}: {source}")]
    DateFailed {
        date: NaiveDate,
        stage: Stage,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Wrap an error with the date and pipeline stage it occurred in.
    pub fn at_stage(self, date: NaiveDate, stage: Stage) -> Self {
        PipelineError::DateFailed {
            date,
            stage,
            source: Box::new(self),
        }
    }
}
