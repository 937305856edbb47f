//! Durable session token storage
//!
//! Only the access token survives a restart. It is stored under a single key
//! (one file), overwritten on login and removed on logout.

use crate::config::{secret_string, session_token, SecretString};
use crate::domain::context::ResultExt;
use crate::domain::{CardimaError, Result};
use secrecy::ExposeSecret;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persistence backend for the session token
pub trait TokenStorage: Send + Sync {
    /// Returns the persisted token, if any
    fn load(&self) -> Result<Option<SecretString>>;

    /// Persists `token`, replacing any previous one
    fn save(&self, token: &SecretString) -> Result<()>;

    /// Removes the persisted token; succeeds when nothing is stored
    fn clear(&self) -> Result<()>;
}

/// Stores the token in a single file with owner-only permissions
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Create a storage backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the token file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<SecretString>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session token {}", self.path.display()))?;

        Ok(session_token(&contents))
    }

    fn save(&self, token: &SecretString) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let value: &str = token.expose_secret().as_ref();
        fs::write(&self.path, value)
            .with_context(|| format!("Failed to write session token {}", self.path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process token storage, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    /// Empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    /// Raw stored value, for assertions
    pub fn stored(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<SecretString>> {
        let guard = self
            .token
            .lock()
            .map_err(|_| CardimaError::State("token storage lock poisoned".to_string()))?;
        Ok(guard.clone().map(secret_string))
    }

    fn save(&self, token: &SecretString) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| CardimaError::State("token storage lock poisoned".to_string()))?;
        let value: &str = token.expose_secret().as_ref();
        *guard = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| CardimaError::State("token storage lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}
