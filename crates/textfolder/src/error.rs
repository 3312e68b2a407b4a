use std::path::PathBuf;

/// All errors that can occur while building or iterating a text dataset.
///
/// Configuration and discovery failures are reported eagerly when the loader
/// is constructed. Only [`Error::Io`] can surface while iterating, when a file
/// that was indexed can no longer be read.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid argument or argument combination.
    #[error("{0}")]
    Configuration(String),

    /// The dataset root does not exist or is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Discovery (and splitting) left no samples.
    #[error("No text files found in directory {}. Allowed format: .txt", .0.display())]
    NoTextFiles(PathBuf),

    /// Directory traversal failed (permissions, symlink loops, ...).
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Reading a sample failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a configuration error from any string message.
    pub fn config(s: impl Into<String>) -> Self {
        Error::Configuration(s.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience Result type used throughout textfolder.
pub type Result<T> = std::result::Result<T, Error>;

/// Early return with a formatted configuration error.
/// Usage: `bail!("`batch_size` must be positive, received: {}", bs)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::Configuration(format!($($arg)*)))
    };
}
