//! Translation API key persistence.
//!
//! The key lives in a user-scoped credentials file, written once by
//! `set-api-key` and loaded read-only at startup. The loaded value is passed
//! into the translator explicitly rather than read from ambient state.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SubbatchError};

#[derive(Debug, Serialize, Deserialize)]
struct Credentials {
    api_key: String,
}

pub struct KeyStore {
    credentials_path: PathBuf,
}

impl KeyStore {
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "subbatch").ok_or_else(|| {
            SubbatchError::Credential("Cannot determine user configuration directory".to_string())
        })?;

        Ok(Self {
            credentials_path: dirs.config_dir().join("credentials.toml"),
        })
    }

    /// Build a key store rooted at an explicit directory. Used by tests.
    pub fn with_config_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            credentials_path: dir.into().join("credentials.toml"),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.load_api_key().is_ok()
    }

    /// Load the stored API key, failing with a configuration hint when no
    /// key has been set yet.
    pub fn load_api_key(&self) -> Result<String> {
        let content = std::fs::read_to_string(&self.credentials_path).map_err(|_| {
            SubbatchError::Credential(format!(
                "No API key configured. Run `subbatch set-api-key <KEY>` first \
                 (expected at {})",
                self.credentials_path.display()
            ))
        })?;

        let credentials: Credentials = toml::from_str(&content)
            .map_err(|e| SubbatchError::Credential(format!("Malformed credentials file: {}", e)))?;

        if credentials.api_key.trim().is_empty() {
            return Err(SubbatchError::Credential(
                "Stored API key is empty".to_string(),
            ));
        }

        Ok(credentials.api_key)
    }

    /// Persist the API key, restricting file permissions to the owner.
    pub fn save_api_key(&self, api_key: &str) -> Result<()> {
        if api_key.trim().is_empty() {
            return Err(SubbatchError::Credential(
                "API key cannot be empty".to_string(),
            ));
        }

        if let Some(parent) = self.credentials_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&Credentials {
            api_key: api_key.to_string(),
        })
        .map_err(|e| SubbatchError::Credential(format!("Failed to serialize credentials: {}", e)))?;

        std::fs::write(&self.credentials_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(
                &self.credentials_path,
                std::fs::Permissions::from_mode(0o600),
            )?;
        }

        info!("API key saved to {}", self.credentials_path.display());
        Ok(())
    }

    /// Mask all but the last four characters of an API key for display.
    pub fn mask_api_key(api_key: &str) -> String {
        if api_key.len() <= 4 {
            return api_key.to_string();
        }
        let visible = &api_key[api_key.len() - 4..];
        format!("{}{}", "*".repeat(api_key.len() - 4), visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = KeyStore::with_config_dir(dir.path());

        assert!(!store.has_api_key());
        store.save_api_key("abc123xyz").unwrap();
        assert!(store.has_api_key());
        assert_eq!(store.load_api_key().unwrap(), "abc123xyz");
    }

    #[test]
    fn test_rejects_empty_key() {
        let dir = tempdir().unwrap();
        let store = KeyStore::with_config_dir(dir.path());
        assert!(store.save_api_key("   ").is_err());
    }

    #[test]
    fn test_load_without_key_hints_setup() {
        let dir = tempdir().unwrap();
        let store = KeyStore::with_config_dir(dir.path());
        let err = store.load_api_key().unwrap_err();
        assert!(err.to_string().contains("set-api-key"));
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(KeyStore::mask_api_key("abcdefgh"), "****efgh");
        assert_eq!(KeyStore::mask_api_key("abc"), "abc");
    }
}
