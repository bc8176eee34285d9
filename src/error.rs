//! Internal error taxonomy.
//!
//! None of these variants cross the public API as a user-content-driven
//! failure (see spec §7): load paths return a count and log, matching
//! failures degrade to "unchanged". `CoreError` exists for structured
//! logging context and for the handful of construction-time paths that
//! do return `Result` (e.g. loading the embedded zh-variant dictionary).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to load {what} from {path}: {source}")]
    Load {
        what: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {detail}")]
    Parse { what: &'static str, detail: String },

    #[error("invalid regex pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("dependency unavailable: {0}")]
    DependencyMissing(&'static str),
}
