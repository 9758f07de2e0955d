// Error type shared by ingestion, cleaning, reports and output.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The input file does not exist or is unreadable.
    #[error("cannot open {path}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The CSV parser hit a malformed record.
    #[error("CSV error in {path}")]
    Csv { path: PathBuf, source: csv::Error },

    /// The file has no header row at all.
    #[error("no header row in {path}")]
    EmptyHeader { path: PathBuf },

    /// A column the pipeline needs is absent after renaming and dropping.
    #[error("required column \"{column}\" is missing")]
    MissingColumn { column: String },

    #[error("top market count {n} is outside 2..=30")]
    MarketCountOutOfRange { n: usize },

    #[error("unknown funding round \"{name}\" (expected round_A..round_H)")]
    UnknownRound { name: String },

    #[error("unknown column \"{column}\"")]
    UnknownColumn { column: String },

    #[error("unknown country policy \"{name}\" (expected drop or unknown)")]
    UnknownCountryPolicy { name: String },

    #[error("cannot write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write CSV {path}")]
    CsvWrite { path: PathBuf, source: csv::Error },

    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
}
