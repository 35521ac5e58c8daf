//! Host probes backed by the real system

use hostfit_core::catalog::{FALLBACK_PLATFORM, ManagerId, PlatformId};
use hostfit_core::host::{ManagerProbe, MetadataExtractor, PlatformDetector};
use hostfit_core::program::ProgramMetadata;
use std::path::{Path, PathBuf};
use tracing::debug;

const OS_RELEASE: &str = "/etc/os-release";

/// Reads the distribution from os-release, preferring a platform the catalog knows
#[derive(Debug, Clone)]
pub struct OsReleasePlatform {
    path: PathBuf,
    known: Vec<PlatformId>,
}

impl OsReleasePlatform {
    pub fn new(known: Vec<PlatformId>) -> Self {
        Self::with_path(OS_RELEASE, known)
    }

    pub fn with_path(path: impl Into<PathBuf>, known: Vec<PlatformId>) -> Self {
        Self {
            path: path.into(),
            known,
        }
    }
}

impl PlatformDetector for OsReleasePlatform {
    fn detect(&self) -> PlatformId {
        let Ok(contents) = std::fs::read_to_string(&self.path) else {
            debug!("Could not read {}", self.path.display());
            return FALLBACK_PLATFORM.to_string();
        };
        let platform = platform_from_os_release(&contents, &self.known);
        debug!("Detected platform {}", platform);
        platform
    }
}

/// `ID` when the catalog knows it, else the first known `ID_LIKE` entry, else `ID`
pub fn platform_from_os_release(contents: &str, known: &[PlatformId]) -> PlatformId {
    let field = |name: &str| {
        contents.lines().find_map(|line| {
            let (key, value) = line.split_once('=')?;
            (key.trim() == name).then(|| value.trim().trim_matches('"').to_lowercase())
        })
    };

    let Some(id) = field("ID").filter(|id| !id.is_empty()) else {
        return FALLBACK_PLATFORM.to_string();
    };
    if known.contains(&id) {
        return id;
    }
    field("ID_LIKE")
        .and_then(|like| {
            like.split_whitespace()
                .find(|candidate| known.iter().any(|k| k == candidate))
                .map(str::to_string)
        })
        .unwrap_or(id)
}

/// Package managers whose executable is on PATH
#[derive(Debug, Clone)]
pub struct PathManagerProbe {
    candidates: Vec<ManagerId>,
}

impl PathManagerProbe {
    pub fn new(candidates: Vec<ManagerId>) -> Self {
        Self { candidates }
    }
}

impl ManagerProbe for PathManagerProbe {
    fn available_managers(&self) -> Vec<ManagerId> {
        self.candidates
            .iter()
            .filter(|m| find_on_path(m).is_some())
            .cloned()
            .collect()
    }
}

/// No embedded version resources are read; classification falls back to the file stem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNameExtractor;

impl MetadataExtractor for FileNameExtractor {
    fn extract(&self, _exe_path: &Path) -> ProgramMetadata {
        ProgramMetadata::default()
    }
}

pub fn find_on_path(binary: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    find_in(binary, std::env::split_paths(&path))
}

fn find_in(binary: &str, dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    dirs.into_iter()
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn known() -> Vec<PlatformId> {
        ["ubuntu", "arch", "fedora"].map(String::from).to_vec()
    }

    #[test]
    fn test_known_id_wins() {
        let contents = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\n";
        assert_eq!(platform_from_os_release(contents, &known()), "ubuntu");
    }

    #[test]
    fn test_id_like_used_for_derivatives() {
        let contents = "NAME=\"EndeavourOS\"\nID=\"endeavouros\"\nID_LIKE=\"arch\"\n";
        assert_eq!(platform_from_os_release(contents, &known()), "arch");
    }

    #[test]
    fn test_unknown_id_is_kept() {
        assert_eq!(platform_from_os_release("ID=gentoo\n", &known()), "gentoo");
        assert_eq!(platform_from_os_release("NAME=x\n", &known()), FALLBACK_PLATFORM);
    }

    #[test]
    fn test_detect_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("os-release");
        std::fs::write(&path, "ID=fedora\n").unwrap();
        assert_eq!(OsReleasePlatform::with_path(&path, known()).detect(), "fedora");

        let missing = OsReleasePlatform::with_path(dir.path().join("none"), known());
        assert_eq!(missing.detect(), FALLBACK_PLATFORM);
    }

    #[test]
    fn test_find_in() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("apt"), "").unwrap();
        let dirs = vec![PathBuf::from("/nonexistent"), dir.path().to_path_buf()];
        assert_eq!(find_in("apt", dirs.clone()), Some(dir.path().join("apt")));
        assert_eq!(find_in("pacman", dirs), None);
    }
}
