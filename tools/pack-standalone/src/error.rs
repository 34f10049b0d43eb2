use std::path::PathBuf;

/// Errors raised while packing a standalone image
///
/// None of these are recoverable: any failure aborts the run and the
/// partially written artifact is discarded.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("input {0} does not exist")]
    MissingRoot(PathBuf),

    #[error("input {0} is not a directory")]
    NotADirectory(PathBuf),

    /// Enumeration failed, including entries removed while walking
    #[error("failed to walk directory tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8 text")]
    InvalidUtf8 { path: PathBuf },

    /// Contents the runtime cannot hold, such as NUL bytes that would end
    /// the embedded C string early
    #[error("{path} contains a NUL byte and cannot be embedded")]
    UnsupportedText { path: PathBuf },

    #[error("file name {path:?} is not valid UTF-8")]
    InvalidName { path: PathBuf },

    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to finalize {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("malformed artifact at line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, PackError>;
