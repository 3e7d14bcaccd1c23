use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

use crate::ports::{SessionError, SessionResult, SessionStore};

/// Durable token storage surviving restarts: OS keyring when available,
/// otherwise a 0600 file under the user's config directory.
pub struct FileSessionStore {
    token_path: PathBuf,
    keyring_service: String,
}

impl FileSessionStore {
    pub fn new() -> SessionResult<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SessionError::Read("Cannot determine config directory".to_string()))?;

        Ok(Self {
            token_path: config_dir.join("promanage-cli").join(".token"),
            keyring_service: "promanage-cli".to_string(),
        })
    }

    async fn ensure_dir(&self) -> SessionResult<()> {
        if let Some(parent) = self.token_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionError::Write(e.to_string()))?;
        }
        Ok(())
    }

    async fn token_from_file(&self) -> Option<String> {
        match fs::read_to_string(&self.token_path).await {
            Ok(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
            _ => None,
        }
    }

    async fn set_token_in_file(&self, token: &str) -> SessionResult<()> {
        self.ensure_dir().await?;
        fs::write(&self.token_path, token)
            .await
            .map_err(|e| SessionError::Write(e.to_string()))?;

        // Restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.token_path)
                .await
                .map_err(|e| SessionError::Write(e.to_string()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.token_path, perms)
                .await
                .map_err(|e| SessionError::Write(e.to_string()))?;
        }

        Ok(())
    }

    fn keyring_entry(&self) -> Option<keyring::Entry> {
        keyring::Entry::new(&self.keyring_service, "access_token").ok()
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn token(&self) -> SessionResult<Option<String>> {
        if let Some(entry) = self.keyring_entry() {
            match entry.get_password() {
                Ok(token) => return Ok(Some(token)),
                Err(keyring::Error::NoEntry) => {}
                Err(_) => {
                    tracing::warn!("Keyring not available, falling back to file storage");
                }
            }
        }

        Ok(self.token_from_file().await)
    }

    async fn set_token(&self, token: &str) -> SessionResult<()> {
        if let Some(entry) = self.keyring_entry() {
            if entry.set_password(token).is_ok() {
                return Ok(());
            }
            tracing::warn!("Failed to store token in keyring, falling back to file storage");
        }

        self.set_token_in_file(token).await
    }

    async fn clear_token(&self) -> SessionResult<()> {
        if let Some(entry) = self.keyring_entry() {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => tracing::warn!("Failed to clear token from keyring: {e}"),
            }
        }

        match fs::remove_file(&self.token_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Write(e.to_string())),
        }
    }
}
