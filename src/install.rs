use crate::checksum::{expected_digest, read_checksum_manifest, sha256_file, verify};
use crate::config::TOOL_NAME;
use crate::download::{extract_zip, Transport};
use crate::error::SetupError;
use crate::host::ActionHost;
use crate::tool_cache::ToolCache;
use crate::types::CageInfo;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fail unless the URL uses https.
pub fn ensure_secure_url(url: &str) -> Result<()> {
    if url.starts_with("https://") {
        Ok(())
    } else {
        Err(SetupError::InsecureUrl {
            url: url.to_string(),
        }
        .into())
    }
}

pub struct Installer<'a, T: Transport> {
    transport: &'a T,
    cache: &'a ToolCache,
    arch: String,
    temp_root: PathBuf,
}

impl<'a, T: Transport> Installer<'a, T> {
    pub fn new(transport: &'a T, cache: &'a ToolCache, arch: &str, temp_root: &Path) -> Self {
        Installer {
            transport,
            cache,
            arch: arch.to_string(),
            temp_root: temp_root.to_path_buf(),
        }
    }

    /// Download, verify, cache and activate the candidate.
    ///
    /// The search path is only touched after the archive has been verified
    /// and copied into the tool cache; any earlier failure leaves no trace
    /// outside the scratch directory.
    pub async fn install<H: ActionHost>(&self, cage: &CageInfo, host: &H) -> Result<PathBuf> {
        host.info("🥚 Installing cage...");

        ensure_secure_url(&cage.checksums_url)?;
        ensure_secure_url(&cage.asset_url)?;

        if let Some(cached) = self.cache.find(TOOL_NAME, &cage.version, &self.arch) {
            tracing::info!("cage {} already present in tool cache", cage.version);
            return self.activate(&cached, host);
        }

        fs::create_dir_all(&self.temp_root)
            .with_context(|| format!("Could not create {}", self.temp_root.display()))?;
        let scratch = TempDir::new_in(&self.temp_root)?;
        let downloads = scratch.path().join("downloads");
        fs::create_dir_all(&downloads)?;

        let manifest_path = self.transport.fetch(&cage.checksums_url, &downloads).await?;
        let table = read_checksum_manifest(&manifest_path)?;
        // Look the entry up before spending a download on the archive
        expected_digest(&table, &cage.asset_name)?;

        let archive_path = self.transport.fetch(&cage.asset_url, &downloads).await?;
        let actual = sha256_file(&archive_path)?;
        verify(&table, &cage.asset_name, &actual)?;
        tracing::info!("Verified {} (sha256 {})", cage.asset_name, actual);

        let extracted = scratch.path().join("extracted");
        extract_zip(&archive_path, &extracted)?;
        let installed = self
            .cache
            .cache_dir(&extracted, TOOL_NAME, &cage.version, &self.arch)?;

        self.activate(&installed, host)
    }

    fn activate<H: ActionHost>(&self, installed: &Path, host: &H) -> Result<PathBuf> {
        host.add_path(installed)?;
        host.info(&format!(
            "🐣 cage has been installed at '{}'",
            installed.join(TOOL_NAME).display()
        ));
        Ok(installed.to_path_buf())
    }
}
