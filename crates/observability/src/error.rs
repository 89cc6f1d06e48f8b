//! Adapter construction errors.

use std::path::PathBuf;

use thiserror::Error;

/// Result type returned by logger construction.
pub type InitResult<T> = Result<T, InitializationError>;

/// The logging engine could not be built.
#[derive(Debug, Error)]
pub enum InitializationError {
    /// The output sink could not be opened.
    #[error("error during log initialization: cannot open {}: {source}", .path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The level filter directives did not parse.
    #[error("error during log initialization: invalid filter `{directives}`: {source}")]
    Filter {
        directives: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// The level environment variable does not name a severity.
    #[error("error during log initialization: invalid {var} `{value}`: {source}")]
    Level {
        var: &'static str,
        value: String,
        #[source]
        source: kvlog_core::ParseSeverityError,
    },
}
