//! Error types for the fetch and transform stages.

use thiserror::Error;

/// Retrieving the source CSV failed. Always fatal for the run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid source URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The fetched table could not be turned into the published shape.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("source table is missing required column '{0}'")]
    MissingColumn(String),

    #[error("source table has no rows")]
    EmptyTable,

    #[error("no rows found for aggregate parent '{0}'")]
    EmptyAggregateGroup(String),

    #[error("duplicate region id {0} after aggregation")]
    DuplicateId(i64),

    #[error("integer column overflowed while summing '{0}'")]
    Overflow(&'static str),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Anything that can abort building the table.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Laden der RKI-NDR-Daten fehlgeschlagen: {0}")]
    Fetch(#[from] FetchError),

    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_is_human_readable() {
        let err: PipelineError = FetchError::Status {
            url: "https://example.org/a.csv".to_string(),
            status: 503,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Laden der RKI-NDR-Daten fehlgeschlagen: https://example.org/a.csv returned status 503"
        );
    }

    #[test]
    fn test_transform_error_names_group() {
        let err = TransformError::EmptyAggregateGroup("Berlin".to_string());
        assert!(err.to_string().contains("Berlin"));
    }
}
