//! Version-keyed directory cache for installed tools.
//!
//! Layout is `<root>/<tool>/<version>/<arch>` with a sibling
//! `<arch>.complete` marker written only after the copy finished, so a
//! half-written directory is never reported as cached.

use crate::version::clean_version;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct ToolCache {
    root: PathBuf,
}

impl ToolCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ToolCache { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn version_dir(&self, tool: &str, version: &str) -> PathBuf {
        self.root.join(tool).join(clean_version(version))
    }

    fn marker_path(&self, tool: &str, version: &str, arch: &str) -> PathBuf {
        self.version_dir(tool, version)
            .join(format!("{}.complete", arch))
    }

    /// Cached directory for the tool version, if a complete copy exists.
    pub fn find(&self, tool: &str, version: &str, arch: &str) -> Option<PathBuf> {
        let dir = self.version_dir(tool, version).join(arch);
        if self.marker_path(tool, version, arch).is_file() && dir.is_dir() {
            tracing::debug!("Found {} {} in tool cache at {}", tool, version, dir.display());
            Some(dir)
        } else {
            tracing::debug!("{} {} ({}) not in tool cache", tool, version, arch);
            None
        }
    }

    /// Copy `source_dir` into the cache and return the cached directory.
    pub fn cache_dir(&self, source_dir: &Path, tool: &str, version: &str, arch: &str) -> Result<PathBuf> {
        let dest = self.version_dir(tool, version).join(arch);
        let marker = self.marker_path(tool, version, arch);

        tracing::info!("Caching {} {} to {}", tool, version, dest.display());

        // Any earlier partial copy is discarded
        if marker.exists() {
            fs::remove_file(&marker)?;
        }
        if dest.exists() {
            fs::remove_dir_all(&dest)
                .with_context(|| format!("Could not clear {}", dest.display()))?;
        }
        fs::create_dir_all(&dest)?;

        copy_tree(source_dir, &dest)?;
        fs::write(&marker, "")
            .with_context(|| format!("Could not write {}", marker.display()))?;

        Ok(dest)
    }
}

fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(source)?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            // fs::copy carries permission bits over
            fs::copy(entry.path(), &target).with_context(|| {
                format!("Could not copy {} to {}", entry.path().display(), target.display())
            })?;
        }
    }
    Ok(())
}
