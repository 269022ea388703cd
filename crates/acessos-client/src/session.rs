//! Client session persistence
//!
//! The session obtained at login is written to a JSON file so later runs can
//! reuse it. Logging out removes the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use acessos_core::Role;

/// The logged-in user as seen by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSession {
    pub token: String,
    pub nome: String,
    pub email: String,
    pub role: Role,
}

impl ClientSession {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Session file manager
pub struct SessionStore {
    session_file: PathBuf,
}

impl SessionStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            session_file: dir.join("session.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.session_file
    }

    pub async fn save(&self, session: &ClientSession) -> Result<()> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| ClientError::Session(e.to_string()))?;

        if let Some(dir) = self.session_file.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ClientError::Session(e.to_string()))?;
        }
        tokio::fs::write(&self.session_file, &json)
            .await
            .map_err(|e| ClientError::Session(e.to_string()))?;

        debug!("Saved session to {:?}", self.session_file);
        Ok(())
    }

    /// The saved session, if any
    ///
    /// An unreadable or malformed file counts as logged out.
    pub async fn load(&self) -> Option<ClientSession> {
        let json = tokio::fs::read_to_string(&self.session_file).await.ok()?;
        match serde_json::from_str(&json) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Ignoring malformed session file {:?}: {}", self.session_file, e);
                None
            }
        }
    }

    /// Remove the saved session (logout)
    pub async fn clear(&self) -> Result<()> {
        if self.session_file.exists() {
            tokio::fs::remove_file(&self.session_file)
                .await
                .map_err(|e| ClientError::Session(e.to_string()))?;
            debug!("Cleared session file");
        }
        Ok(())
    }
}
