/*
[INPUT]:  Auth tokens and a storage location
[OUTPUT]: Saved / restored credentials across process restarts
[POS]:    Auth layer - key-value persistence delegate for the credential store
[UPDATE]: When storage format or file permissions change
*/

use std::fs;
use std::io;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::http::{Result, StablepayError};

use super::AuthToken;

/// External key-value store the credential store delegates persistence to
pub trait AuthPersistence: Send + Sync {
    fn load(&self) -> Result<Option<AuthToken>>;
    fn save(&self, token: &AuthToken) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Stores the token as a JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuthPersistence for JsonFilePersistence {
    fn load(&self) -> Result<Option<AuthToken>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(persistence_error(&self.path, err)),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, token: &AuthToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| persistence_error(parent, e))?;
            }
        }

        let json = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, json).map_err(|e| persistence_error(&self.path, e))?;

        #[cfg(unix)]
        {
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, permissions)
                .map_err(|e| persistence_error(&self.path, e))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(persistence_error(&self.path, err)),
        }
    }
}

/// In-process store, for embedding hosts that keep state elsewhere and tests
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    token: Mutex<Option<AuthToken>>,
}

impl AuthPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<AuthToken>> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &AuthToken) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

fn persistence_error(path: &Path, err: io::Error) -> StablepayError {
    StablepayError::Persistence(format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_token() -> AuthToken {
        AuthToken {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expiry: 1_700_000_000,
            api_key: "api-key".to_string(),
            user_id: "user-1".to_string(),
        }
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = JsonFilePersistence::new(dir.path().join("auth.json"));
        assert!(persistence.load().unwrap().is_none());
        assert!(persistence.clear().is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = JsonFilePersistence::new(dir.path().join("nested").join("auth.json"));
        persistence.save(&sample_token()).unwrap();

        let loaded = persistence.load().unwrap();
        assert_eq!(loaded, Some(sample_token()));

        let raw = fs::read_to_string(persistence.path()).unwrap();
        assert!(raw.contains("\"accessToken\""));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = JsonFilePersistence::new(dir.path().join("auth.json"));
        persistence.save(&sample_token()).unwrap();

        let mode = fs::metadata(persistence.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFilePersistence::new(&path).load().unwrap_err();
        assert!(matches!(err, StablepayError::Serialization(_)));
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = JsonFilePersistence::new(dir.path().join("auth.json"));
        persistence.save(&sample_token()).unwrap();
        persistence.clear().unwrap();
        assert!(!persistence.path().exists());
    }
}
