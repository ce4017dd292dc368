//! Checksum manifest parsing and SHA-256 verification.
//!
//! Manifests list one `<hex-digest><2+ spaces><file name>` entry per line.
//! Digests are computed by streaming the file in fixed-size chunks so large
//! archives never have to fit in memory.

use crate::error::SetupError;
use crate::types::ChecksumTable;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Parse manifest text into a table. A single malformed line fails the parse.
pub fn parse_checksum_manifest(text: &str) -> Result<ChecksumTable> {
    let mut table = ChecksumTable::default();

    for line in text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
        let (hash, file_name) = split_entry(line).ok_or_else(|| SetupError::MalformedChecksumLine {
            line: line.to_string(),
        })?;
        table.insert(file_name.to_string(), hash.to_ascii_lowercase());
    }

    if table.is_empty() {
        tracing::warn!("Checksum manifest has no entries");
    } else {
        tracing::debug!("Parsed {} checksum entries", table.len());
    }
    Ok(table)
}

/// Split on the first run of two or more spaces.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let start = line.find("  ")?;
    let hash = &line[..start];
    let file_name = line[start..].trim_start_matches(' ');
    Some((hash, file_name))
}

pub fn read_checksum_manifest(path: &Path) -> Result<ChecksumTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read checksum manifest {}", path.display()))?;
    parse_checksum_manifest(&text)
}

/// Incremental SHA-256 over a sequence of byte chunks.
#[derive(Default)]
pub struct Sha256Stream {
    hasher: Sha256,
}

impl Sha256Stream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
    }

    /// Lowercase hex digest of everything fed so far.
    pub fn finalize(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// Digest an entire reader, chunk by chunk.
pub fn compute_sha256<R: Read>(mut reader: R) -> Result<String> {
    let mut stream = Sha256Stream::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        stream.update(&buf[..n]);
    }
    Ok(stream.finalize())
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let file =
        File::open(path).with_context(|| format!("Could not open {} for hashing", path.display()))?;
    compute_sha256(file).with_context(|| format!("Could not hash {}", path.display()))
}

/// Expected digest for an asset, or `ChecksumNotFound`.
pub fn expected_digest<'t>(table: &'t ChecksumTable, asset_name: &str) -> Result<&'t str> {
    table.get(asset_name).ok_or_else(|| {
        SetupError::ChecksumNotFound {
            asset: asset_name.to_string(),
        }
        .into()
    })
}

pub fn verify(table: &ChecksumTable, asset_name: &str, actual_digest: &str) -> Result<()> {
    let expected = expected_digest(table, asset_name)?;
    if expected != actual_digest.to_ascii_lowercase() {
        return Err(SetupError::ChecksumMismatch {
            expected: expected.to_string(),
            actual: actual_digest.to_string(),
        }
        .into());
    }
    Ok(())
}
