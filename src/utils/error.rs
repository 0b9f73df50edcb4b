use std::path::PathBuf;
use thiserror::Error;

/// Main error type for report generation
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No data to generate a PDF report.")]
    NoData,

    #[error("Please provide either a CSV file path, an Excel file path, or a database connection string and a query.")]
    MissingSource,
}

/// Errors raised while reading a data source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid file format for {path:?}. Please provide {expected} file.")]
    InvalidFormat { path: PathBuf, expected: String },

    #[error("{0}")]
    ReadFailure(String),
}

/// Errors raised while laying out or writing the PDF
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF library error: {0}")]
    PdfLibError(String),

    #[error("Failed to write report: {0}")]
    WriteFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for report operations
pub type ReportResult<T> = Result<T, ReportError>;

impl ReportError {
    /// Shorthand for a `SourceError::ReadFailure` wrapped in a `ReportError`
    pub fn read_failure(message: impl Into<String>) -> Self {
        ReportError::Source(SourceError::ReadFailure(message.into()))
    }

    /// Shorthand for a `SourceError::InvalidFormat` wrapped in a `ReportError`
    pub fn invalid_format(path: impl Into<PathBuf>, expected: &str) -> Self {
        ReportError::Source(SourceError::InvalidFormat {
            path: path.into(),
            expected: expected.to_string(),
        })
    }
}

impl From<lopdf::Error> for RenderError {
    fn from(e: lopdf::Error) -> Self {
        RenderError::PdfLibError(e.to_string())
    }
}
