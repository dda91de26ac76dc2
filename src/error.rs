use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid pattern rule '{name}': {source}")]
    InvalidRule {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("project contains no files to analyze")]
    EmptyProject,

    #[error("settings error: {0}")]
    Settings(String),

    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failure of an optional enrichment provider. Always recovered locally.
#[derive(Debug, Clone, Error)]
pub enum EnrichmentError {
    #[error("enrichment provider unavailable")]
    Unavailable,

    #[error("enrichment timed out after {0} ms")]
    Timeout(u64),

    #[error("enrichment failed: {0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
