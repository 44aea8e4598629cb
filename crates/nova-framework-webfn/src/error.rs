use std::path::PathBuf;

use nova_core::BadLocation;
use thiserror::Error;

/// Failure while extracting routes from one router chain.
///
/// Always recovered inside [`crate::RouteExtractor::extract_all_routes`]; it never escapes a
/// single entry point.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    BadLocation(#[from] BadLocation),
}

/// Errors surfaced by the source and directory level entry points.
#[derive(Debug, Error)]
pub enum WebFnError {
    #[error("failed to parse Java source {uri}: {message}")]
    Parse { uri: String, message: String },
    #[error("failed to walk {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
