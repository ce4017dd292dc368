//! Failure taxonomy for the setup step.
//!
//! Every variant is fatal for the current run. The runner is the only place
//! that catches them; everything below it propagates with `?`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    /// The release listing endpoint answered with something other than 200.
    #[error("Could not fetch versions: status={}", .status.as_u16())]
    Fetch { status: StatusCode },

    /// Conversion was attempted on a release that lacks the required assets.
    #[error("Invalid release: {tag}")]
    InvalidRelease { tag: String },

    #[error("Malformed checksum line: {line}")]
    MalformedChecksumLine { line: String },

    #[error("Checksum not found for {asset}")]
    ChecksumNotFound { asset: String },

    #[error("Checksum mismatch: expected={expected}, actual={actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("{url} is not a secure url")]
    InsecureUrl { url: String },

    #[error("Could not find any valid release for {requested}")]
    NoValidCandidate { requested: String },

    #[error("{name} is required")]
    MissingRequiredConfig { name: String },

    /// An artifact download answered with a non-success status.
    #[error("Failed to download {url}: status={}", .status.as_u16())]
    Download { url: String, status: StatusCode },
}
