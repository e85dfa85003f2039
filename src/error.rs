use std::io;
use std::num::ParseFloatError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Pre-flight validation
    #[error("no input files specified")]
    NoFiles,

    #[error("invalid column: {column}")]
    InvalidColumn { column: i64 },

    #[error("invalid operation: {name}")]
    InvalidOperation { name: String },

    // Per-file failures
    #[error("invalid column: file has only {fields} columns")]
    ShortRow { fields: usize },

    #[error("not a number: {value:?}: {source}")]
    NotANumber {
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("cannot open file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read data from file: {source}")]
    Read {
        #[source]
        source: csv::Error,
    },

    #[error("{}: {source}", .path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    // Aggregation
    #[error("no samples to reduce")]
    EmptyDataset,

    #[error("worker pool stopped after {received} of {expected} files")]
    Incomplete { received: usize, expected: usize },

    #[error("worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("cannot write result: {0}")]
    Output(#[from] io::Error),

    // Configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Attach the path of the file being parsed to a row-level error.
    pub fn in_file(path: impl Into<PathBuf>, source: Error) -> Self {
        Error::InFile {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// The underlying error with any per-file wrapping removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::InFile { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for a rejected column index as well as a row that is too short
    /// for the requested column.
    pub fn is_invalid_column(&self) -> bool {
        matches!(
            self.root(),
            Error::InvalidColumn { .. } | Error::ShortRow { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_unwraps_nested_file_context() {
        let err = Error::in_file("a.csv", Error::ShortRow { fields: 4 });
        assert!(matches!(err.root(), Error::ShortRow { fields: 4 }));
        assert!(err.is_invalid_column());
    }

    #[test]
    fn test_messages_name_offending_values() {
        assert_eq!(
            Error::InvalidColumn { column: -2 }.to_string(),
            "invalid column: -2"
        );
        assert_eq!(
            Error::InvalidOperation {
                name: "median".to_string()
            }
            .to_string(),
            "invalid operation: median"
        );
        assert_eq!(
            Error::in_file("data/a.csv", Error::ShortRow { fields: 4 }).to_string(),
            "data/a.csv: invalid column: file has only 4 columns"
        );
    }

    #[test]
    fn test_not_a_number_is_not_a_column_error() {
        let source = "abc".parse::<f64>().unwrap_err();
        let err = Error::NotANumber {
            value: "abc".to_string(),
            source,
        };
        assert!(!err.is_invalid_column());
        assert!(err.to_string().starts_with("not a number: \"abc\""));
    }
}
