use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Parse error in {} line {line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Numeric overflow summing {0}")]
    Overflow(String),

    #[error("No cached aggregate at {}", .0.display())]
    CacheMiss(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Worker for year {year} failed: {message}")]
    Worker { year: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl StatsError {
    /// Attach file and line context to a record-level error
    pub fn at(self, path: &std::path::Path, line: usize) -> Self {
        match self {
            StatsError::InvalidRecord(message) => StatsError::Parse {
                path: path.to_path_buf(),
                line,
                message,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
