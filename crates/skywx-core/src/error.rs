use crate::model::ReportType;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SkywxError {
    #[error("report is empty after sanitizing")]
    EmptyReport,

    #[error("unrecognized {report_type} header: expected station and time groups, found '{found}'")]
    UnrecognizedHeader {
        report_type: ReportType,
        found: String,
    },

    #[error("station '{0}' not found in the station registry")]
    StationNotFound(String),

    #[error("invalid coordinate ({lat}, {lon}): latitude must be within ±90 and longitude within ±180")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("failed to load station dataset from {path}: {reason}")]
    DatasetLoad { path: PathBuf, reason: String },

    #[error("invalid station dataset: {0}")]
    DatasetInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
