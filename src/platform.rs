use std::fmt;

/// The `os_arch` pair release assets are named after, e.g. `linux_amd64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// Build a platform from registry-style names, normalizing `x64` to `amd64`.
    pub fn new(os: &str, arch: &str) -> Self {
        let arch = match arch {
            "x64" => "amd64",
            other => other,
        };
        Platform {
            os: os.to_string(),
            arch: arch.to_string(),
        }
    }

    /// Detect the platform of the running host.
    pub fn current() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            "windows" => "win32",
            other => other,
        };

        let arch = match std::env::consts::ARCH {
            "x86_64" => "x64",
            "aarch64" => "arm64",
            "x86" => "ia32",
            other => other,
        };

        tracing::debug!("Detected platform os={} arch={}", os, arch);
        Platform::new(os, arch)
    }

    /// Name of the archive asset built for this platform.
    pub fn archive_name(&self) -> String {
        format!("canarycage_{}.zip", self)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}
