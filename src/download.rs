use crate::error::SetupError;
use anyhow::{anyhow, Context, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Moves a remote file into local storage.
pub trait Transport {
    /// Download `url` into `dest_dir`, named after the URL's last path segment.
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        HttpTransport {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let local_path = dest_dir.join(file_name_from_url(url)?);
        download_file(&self.client, url, &local_path).await?;
        Ok(local_path)
    }
}

/// Last path segment of a URL, without query or fragment.
pub fn file_name_from_url(url: &str) -> Result<String> {
    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Could not derive a file name from {}", url))
}

pub async fn download_file(client: &reqwest::Client, url: &str, local_path: &Path) -> Result<()> {
    let filename = local_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    tracing::info!("Downloading {}...", filename);

    let response = client
        .get(url)
        .header("User-Agent", concat!("setup-cage/", env!("CARGO_PKG_VERSION")))
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(SetupError::Download {
            url: url.to_string(),
            status: response.status(),
        }
        .into());
    }
    let total_size = response.content_length().unwrap_or(0);

    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Downloading {}", filename));

    let mut file = fs::File::create(local_path)
        .with_context(|| format!("Could not create {}", local_path.display()))?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }
    file.flush()?;

    pb.finish_with_message("Download complete");
    tracing::debug!("Downloaded {} bytes to {}", downloaded, local_path.display());
    Ok(())
}

/// Extract every entry of a zip archive below `extract_dir`.
pub fn extract_zip(archive_path: &Path, extract_dir: &Path) -> Result<()> {
    tracing::info!(
        "Extracting {}...",
        archive_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    );

    let file = fs::File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {}", archive_path.display()))?;

    fs::create_dir_all(extract_dir)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        // Reject absolute paths and parent directory references
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(anyhow!(
                "Refusing to extract unsafe path from archive: {}",
                entry.name()
            ));
        };
        let outpath = extract_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = fs::File::create(&outpath)?;
        io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        {
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode & 0o7777))?;
            }
        }
    }

    mark_executable(&extract_dir.join("cage"))?;
    Ok(())
}

/// Set 0755 on unix when the file exists. No-op elsewhere.
fn mark_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        if path.is_file() {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o755);
            fs::set_permissions(path, perms)?;
        }
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
