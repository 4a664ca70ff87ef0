use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Manages the Chrome user-data directory for a fetch
///
/// Runs use a throwaway profile by default. A named profile keeps cookies
/// between runs, so a challenge clearance cookie earned once is reused.
pub struct ProfileManager {
    path: PathBuf,
    is_temporary: bool,
}

impl ProfileManager {
    /// Create a temporary profile that will be deleted on drop
    pub fn temporary() -> Result<Self> {
        let temp_dir = tempfile::Builder::new().prefix("docfetch-profile-").tempdir()?;
        let path = temp_dir.keep();

        tracing::debug!("Using temporary profile at {}", path.display());

        Ok(Self {
            path,
            is_temporary: true,
        })
    }

    /// Create or use a persistent profile at the given path
    pub fn persistent(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }

        tracing::debug!("Using persistent profile at {}", path.display());

        Ok(Self {
            path,
            is_temporary: false,
        })
    }

    /// Create or use the persistent profile `~/.docfetch/profiles/<name>`
    pub fn named(name: &str) -> Result<Self> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::Browser(format!("Invalid profile name: '{}'", name)));
        }
        Self::persistent(Self::profiles_dir()?.join(name))
    }

    /// Directory holding named profiles
    pub fn profiles_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".docfetch").join("profiles"))
            .ok_or_else(|| Error::Browser("Could not determine home directory".to_string()))
    }

    /// Get the profile directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if this is a temporary profile
    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }
}

impl Drop for ProfileManager {
    fn drop(&mut self) {
        if self.is_temporary && self.path.exists() {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_profile_creates_and_cleans_up() {
        let profile = ProfileManager::temporary().unwrap();
        let path = profile.path().to_path_buf();

        assert!(path.is_dir());
        assert!(profile.is_temporary());

        drop(profile);

        assert!(!path.exists());
    }

    #[test]
    fn test_persistent_profile_is_not_deleted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profile_path = temp_dir.path().join("test-profile");

        let profile = ProfileManager::persistent(profile_path.clone()).unwrap();
        assert!(profile_path.is_dir());
        assert!(!profile.is_temporary());

        drop(profile);

        assert!(profile_path.exists());
    }

    #[test]
    fn test_named_profile_rejects_paths() {
        for name in ["", ".", "..", "a/b", "a\\b"] {
            assert!(ProfileManager::named(name).is_err(), "accepted {:?}", name);
        }
    }
}
