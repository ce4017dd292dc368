use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
    /// Registry-side flag; selection goes by the tag's SemVer form instead.
    #[serde(default)]
    pub prerelease: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// A release resolved into everything the installer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CageInfo {
    pub version: String,
    pub checksums_url: String,
    pub asset_url: String,
    pub asset_name: String,
    pub is_latest: bool,
    /// Tag of the highest valid release seen during selection.
    pub latest_version: String,
}

/// Asset file name to lowercase hex SHA-256 digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumTable(HashMap<String, String>);

impl ChecksumTable {
    pub fn insert(&mut self, file_name: String, digest: String) {
        self.0.insert(file_name, digest);
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.0.get(file_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
