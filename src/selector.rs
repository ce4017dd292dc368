//! Picks the single release to install out of the registry listing.
//!
//! Everything here is pure: releases come in, at most one [`CageInfo`] goes
//! out.

use crate::error::SetupError;
use crate::platform::Platform;
use crate::types::{CageInfo, GitHubAsset, GitHubRelease};
use crate::version::{compare_descending, is_pre_release, is_valid_semver};
use anyhow::Result;

const ASSET_PREFIX: &str = "canarycage_";
const CHECKSUMS_SUFFIX: &str = "_checksums.txt";

#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub platform: &'a Platform,
    /// Exact tag to install; `None` selects the highest valid release.
    pub required_version: Option<&'a str>,
    pub use_pre_release: bool,
}

/// Matches `canarycage_<anything>_checksums.txt` with a non-empty middle.
pub fn is_checksums_asset(name: &str) -> bool {
    name.len() > ASSET_PREFIX.len() + CHECKSUMS_SUFFIX.len()
        && name.starts_with(ASSET_PREFIX)
        && name.ends_with(CHECKSUMS_SUFFIX)
}

/// First checksum manifest attached to the release, if any.
pub fn find_checksums_asset(release: &GitHubRelease) -> Option<&GitHubAsset> {
    release
        .assets
        .iter()
        .find(|asset| is_checksums_asset(&asset.name))
}

pub fn find_archive_asset<'r>(
    release: &'r GitHubRelease,
    platform: &Platform,
) -> Option<&'r GitHubAsset> {
    let archive_name = platform.archive_name();
    release
        .assets
        .iter()
        .find(|asset| asset.name == archive_name)
}

pub fn is_valid_release(release: &GitHubRelease, platform: &Platform, use_pre_release: bool) -> bool {
    let tag = release.tag_name.as_str();
    if !is_valid_semver(tag) {
        tracing::trace!("Skipping '{}': not a semantic version", tag);
        return false;
    }
    if !use_pre_release && is_pre_release(tag) {
        tracing::trace!("Skipping '{}': pre-release", tag);
        return false;
    }

    let has_assets =
        find_checksums_asset(release).is_some() && find_archive_asset(release, platform).is_some();
    if !has_assets {
        tracing::trace!("Skipping '{}': missing assets for {}", tag, platform);
    }
    has_assets
}

/// Select the install candidate, or `None` when nothing satisfies the request.
pub fn get_valid_candidate(
    releases: &[GitHubRelease],
    selection: &Selection<'_>,
) -> Result<Option<CageInfo>> {
    let valid = list_valid_releases(releases, selection.platform, selection.use_pre_release);

    tracing::debug!(
        "{} of {} releases are installable on {}",
        valid.len(),
        releases.len(),
        selection.platform
    );

    let Some(latest) = valid.first() else {
        return Ok(None);
    };

    let chosen = match selection.required_version {
        Some(required) => match valid.iter().find(|r| r.tag_name == required) {
            Some(exact) => exact,
            None => return Ok(None),
        },
        None => latest,
    };

    let is_latest = chosen.tag_name == latest.tag_name;
    release_to_cage_info(chosen, selection.platform, is_latest, &latest.tag_name).map(Some)
}

pub fn release_to_cage_info(
    release: &GitHubRelease,
    platform: &Platform,
    is_latest: bool,
    latest_version: &str,
) -> Result<CageInfo> {
    let (Some(checksums), Some(archive)) = (
        find_checksums_asset(release),
        find_archive_asset(release, platform),
    ) else {
        return Err(SetupError::InvalidRelease {
            tag: release.tag_name.clone(),
        }
        .into());
    };

    Ok(CageInfo {
        version: release.tag_name.clone(),
        checksums_url: checksums.browser_download_url.clone(),
        asset_url: archive.browser_download_url.clone(),
        asset_name: archive.name.clone(),
        is_latest,
        latest_version: latest_version.to_string(),
    })
}

/// Every installable release for the platform, highest first.
pub fn list_valid_releases<'r>(
    releases: &'r [GitHubRelease],
    platform: &Platform,
    use_pre_release: bool,
) -> Vec<&'r GitHubRelease> {
    let mut valid: Vec<&GitHubRelease> = releases
        .iter()
        .filter(|r| is_valid_release(r, platform, use_pre_release))
        .collect();
    valid.sort_by(|a, b| compare_descending(&a.tag_name, &b.tag_name));
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str, url: &str) -> GitHubAsset {
        GitHubAsset {
            name: name.to_string(),
            browser_download_url: url.to_string(),
        }
    }

    fn release(tag: &str, assets: Vec<GitHubAsset>) -> GitHubRelease {
        GitHubRelease {
            tag_name: tag.to_string(),
            assets,
            prerelease: false,
        }
    }

    fn full_release(tag: &str) -> GitHubRelease {
        let base = format!("https://github.com/loilo-inc/canarycage/releases/download/{}", tag);
        release(
            tag,
            vec![
                asset(
                    &format!("canarycage_{}_checksums.txt", tag),
                    &format!("{}/canarycage_{}_checksums.txt", base, tag),
                ),
                asset(
                    "canarycage_linux_amd64.zip",
                    &format!("{}/canarycage_linux_amd64.zip", base),
                ),
                asset(
                    "canarycage_darwin_arm64.zip",
                    &format!("{}/canarycage_darwin_arm64.zip", base),
                ),
            ],
        )
    }

    fn linux() -> Platform {
        Platform::new("linux", "x64")
    }

    fn select(
        releases: &[GitHubRelease],
        required_version: Option<&str>,
        use_pre_release: bool,
    ) -> Option<CageInfo> {
        let platform = linux();
        get_valid_candidate(
            releases,
            &Selection {
                platform: &platform,
                required_version,
                use_pre_release,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_checksums_pattern() {
        assert!(is_checksums_asset("canarycage_1.0.0_checksums.txt"));
        assert!(is_checksums_asset("canarycage_x_checksums.txt"));
        assert!(!is_checksums_asset("canarycage__checksums.txt"));
        assert!(!is_checksums_asset("canarycage_1.0.0_checksums.txt.sig"));
        assert!(!is_checksums_asset("other_1.0.0_checksums.txt"));
    }

    #[test]
    fn test_valid_release() {
        assert!(is_valid_release(&full_release("1.0.0"), &linux(), false));
    }

    #[test]
    fn test_non_semver_tag_is_never_valid() {
        for tag in ["invalid-version", "0-0", "latest", "1.0", ""] {
            let mut r = full_release("1.0.0");
            r.tag_name = tag.to_string();
            assert!(!is_valid_release(&r, &linux(), true), "{tag}");
        }
    }

    #[test]
    fn test_pre_release_gate() {
        let r = full_release("1.0.0-beta.1");
        assert!(!is_valid_release(&r, &linux(), false));
        assert!(is_valid_release(&r, &linux(), true));
    }

    #[test]
    fn test_missing_assets_then_added() {
        let checksums = asset("canarycage_1.0.0_checksums.txt", "https://x/c.txt");
        let archive = asset("canarycage_linux_amd64.zip", "https://x/a.zip");

        let mut r = release("1.0.0", vec![archive.clone()]);
        assert!(!is_valid_release(&r, &linux(), false));
        r.assets.push(checksums.clone());
        assert!(is_valid_release(&r, &linux(), false));

        let mut r = release("1.0.0", vec![checksums]);
        assert!(!is_valid_release(&r, &linux(), false));
        r.assets.push(asset("canarycage_darwin_arm64.zip", "https://x/d.zip"));
        assert!(!is_valid_release(&r, &linux(), false));
        r.assets.push(archive);
        assert!(is_valid_release(&r, &linux(), false));
    }

    #[test]
    fn test_latest_when_no_version_required() {
        let releases = vec![full_release("1.0.0"), full_release("2.0.0")];
        let cage = select(&releases, None, false).unwrap();
        assert_eq!(cage.version, "2.0.0");
        assert!(cage.is_latest);
        assert_eq!(cage.latest_version, "2.0.0");
    }

    #[test]
    fn test_numeric_not_lexicographic_order() {
        let releases = vec![
            full_release("1.0.0"),
            full_release("1.10.0"),
            full_release("1.2.0"),
        ];
        let cage = select(&releases, None, false).unwrap();
        assert_eq!(cage.version, "1.10.0");
    }

    #[test]
    fn test_required_version() {
        let releases = vec![full_release("1.0.0"), full_release("2.0.0")];

        let cage = select(&releases, Some("1.0.0"), false).unwrap();
        assert_eq!(cage.version, "1.0.0");
        assert!(!cage.is_latest);
        assert_eq!(cage.latest_version, "2.0.0");

        let cage = select(&releases, Some("2.0.0"), false).unwrap();
        assert!(cage.is_latest);
    }

    #[test]
    fn test_required_version_not_found() {
        let releases = vec![full_release("1.0.0"), full_release("2.0.0")];
        assert!(select(&releases, Some("3.0.0"), false).is_none());
    }

    #[test]
    fn test_required_version_must_be_valid_release() {
        let releases = vec![
            full_release("0.1.0"),
            full_release("0.2.0"),
            full_release("0.2.1-rc1"),
        ];
        assert!(select(&releases, Some("0.4.0"), false).is_none());
        assert!(select(&releases, Some("0.2.1-rc1"), false).is_none());
        assert_eq!(
            select(&releases, Some("0.2.1-rc1"), true).unwrap().version,
            "0.2.1-rc1"
        );
    }

    #[test]
    fn test_no_valid_releases() {
        assert!(select(&[], None, false).is_none());
        let releases = vec![release("1.0.0", vec![])];
        assert!(select(&releases, None, false).is_none());
    }

    #[test]
    fn test_pre_releases_follow_precedence() {
        let releases = vec![
            full_release("2.0.0-rc1"),
            full_release("2.1.0-rc1"),
            full_release("2.0.0"),
            full_release("1.0.0"),
            full_release("0-0"),
        ];
        assert_eq!(select(&releases, None, false).unwrap().version, "2.0.0");
        assert_eq!(select(&releases, None, true).unwrap().version, "2.1.0-rc1");
    }

    #[test]
    fn test_release_to_cage_info() {
        let r = release(
            "1.0.0",
            vec![
                asset("canarycage_1.0.0_checksums.txt", "http://example.com/checksums.txt"),
                asset("canarycage_linux_amd64.zip", "http://example.com/linux.zip"),
                asset("canarycage_darwin_arm64.zip", "http://example.com/darwin.zip"),
            ],
        );

        let cage = release_to_cage_info(&r, &linux(), true, "1.0.0").unwrap();
        assert_eq!(cage.version, "1.0.0");
        assert_eq!(cage.checksums_url, "http://example.com/checksums.txt");
        assert_eq!(cage.asset_url, "http://example.com/linux.zip");
        assert_eq!(cage.asset_name, "canarycage_linux_amd64.zip");
        assert!(cage.is_latest);

        let darwin = Platform::new("darwin", "arm64");
        let cage = release_to_cage_info(&r, &darwin, false, "2.0.0").unwrap();
        assert_eq!(cage.asset_name, "canarycage_darwin_arm64.zip");
        assert_eq!(cage.asset_url, "http://example.com/darwin.zip");
        assert!(!cage.is_latest);
    }

    #[test]
    fn test_release_to_cage_info_missing_assets() {
        let only_zip = release("1.0.0", vec![asset("canarycage_linux_amd64.zip", "")]);
        let err = release_to_cage_info(&only_zip, &linux(), true, "1.0.0").unwrap_err();
        assert_eq!(err.to_string(), "Invalid release: 1.0.0");
        assert!(matches!(
            err.downcast_ref::<SetupError>(),
            Some(SetupError::InvalidRelease { .. })
        ));

        let only_checksums = release("1.0.0", vec![asset("canarycage_1.0.0_checksums.txt", "")]);
        assert!(release_to_cage_info(&only_checksums, &linux(), true, "1.0.0").is_err());
    }

    #[test]
    fn test_first_checksums_asset_wins() {
        let r = release(
            "1.0.0",
            vec![
                asset("canarycage_1.0.0_checksums.txt", "https://x/first.txt"),
                asset("canarycage_other_checksums.txt", "https://x/second.txt"),
                asset("canarycage_linux_amd64.zip", "https://x/a.zip"),
            ],
        );
        let cage = release_to_cage_info(&r, &linux(), true, "1.0.0").unwrap();
        assert_eq!(cage.checksums_url, "https://x/first.txt");
    }

    #[test]
    fn test_list_valid_releases() {
        let releases = vec![
            full_release("1.0.0"),
            full_release("nightly"),
            full_release("1.1.0-rc1"),
            full_release("1.1.0"),
        ];
        let tags: Vec<&str> = list_valid_releases(&releases, &linux(), true)
            .iter()
            .map(|r| r.tag_name.as_str())
            .collect();
        assert_eq!(tags, vec!["1.1.0", "1.1.0-rc1", "1.0.0"]);
    }
}
