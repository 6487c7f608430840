use std::path::PathBuf;

/// Errors raised while validating a matcher configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid anchor {0:?}: expected identifiers joined by '.' (e.g. \"context.t\")")]
    InvalidAnchor(String),

    #[error("empty {0} entry in matcher config")]
    EmptyMarker(&'static str),

    #[error("matcher config has no import suffixes and no literal markers")]
    NoMarkers,
}

/// Errors raised while scanning files on disk.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("workspace root {0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
