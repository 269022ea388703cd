//! JSON file storage backend
//!
//! Keeps users and credentials in memory and writes the whole snapshot to
//! `acessos.json` after every change. Credential secrets are already sealed
//! when they reach the store. Without a directory the store is memory-only.

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use super::{KeyStore, Store};
use crate::acesso::StoredAcesso;
use crate::error::{Result, VaultError};
use crate::user::User;

const DATA_FILE: &str = "acessos.json";
const SALT_FILE: &str = "salt";
const VERIFY_FILE: &str = "verify";
const FORMAT_VERSION: u32 = 1;

/// Persistent snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    version: u32,
    next_user_id: u64,
    next_acesso_id: u64,
    users: BTreeMap<u64, User>,
    acessos: BTreeMap<u64, StoredAcesso>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            next_user_id: 1,
            next_acesso_id: 1,
            users: BTreeMap::new(),
            acessos: BTreeMap::new(),
        }
    }
}

/// JSON file storage backend
pub struct JsonFileStore {
    /// `None` for a memory-only store
    dir: Option<PathBuf>,
    data: RwLock<Snapshot>,
}

impl JsonFileStore {
    /// Memory-only store
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            data: RwLock::new(Snapshot::default()),
        }
    }

    /// Open (or create) a store in `dir`, loading any existing snapshot
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(DATA_FILE);
        let snapshot = if path.exists() {
            let contents = tokio::fs::read_to_string(&path).await?;
            let snapshot: Snapshot = serde_json::from_str(&contents)?;
            if snapshot.version != FORMAT_VERSION {
                return Err(VaultError::StorageError(format!(
                    "Unsupported data file version {}",
                    snapshot.version
                )));
            }
            debug!(
                "Loaded {} users and {} credentials from {:?}",
                snapshot.users.len(),
                snapshot.acessos.len(),
                path
            );
            snapshot
        } else {
            debug!("No existing data file at {:?}", path);
            Snapshot::default()
        };

        Ok(Self {
            dir: Some(dir),
            data: RwLock::new(snapshot),
        })
    }

    /// Platform data directory for the service
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("com", "gerenciador", "acessos")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                VaultError::StorageError("Could not determine data directory".to_string())
            })
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn is_persistent(&self) -> bool {
        self.dir.is_some()
    }

    /// Persist `next` and make it the live snapshot
    ///
    /// `current` keeps its old contents if the write fails.
    async fn commit(&self, current: &mut Snapshot, next: Snapshot) -> Result<()> {
        self.persist(&next).await?;
        *current = next;
        Ok(())
    }

    /// Write the snapshot atomically. Called with the write lock held.
    async fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };

        let contents = serde_json::to_string_pretty(snapshot)?;
        let path = dir.join(DATA_FILE);
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        debug!("Saved data file ({} credentials)", snapshot.acessos.len());
        Ok(())
    }

    async fn read_side_file(&self, name: &str) -> Result<Option<String>> {
        let Some(dir) = &self.dir else {
            return Ok(None);
        };
        let path = dir.join(name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = tokio::fs::read_to_string(&path).await?;
        Ok(Some(contents.trim().to_string()))
    }

    async fn write_side_file(&self, name: &str, contents: &str) -> Result<()> {
        if let Some(dir) = &self.dir {
            tokio::fs::write(dir.join(name), contents).await?;
            debug!("Saved {}", name);
        }
        Ok(())
    }
}

#[async_trait]
impl KeyStore for JsonFileStore {
    async fn load_salt(&self) -> Result<Option<String>> {
        self.read_side_file(SALT_FILE).await
    }

    async fn save_salt(&self, salt: &str) -> Result<()> {
        self.write_side_file(SALT_FILE, salt).await
    }

    async fn load_verification(&self) -> Result<Option<String>> {
        self.read_side_file(VERIFY_FILE).await
    }

    async fn save_verification(&self, sealed: &str) -> Result<()> {
        self.write_side_file(VERIFY_FILE, sealed).await
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn insert_user(&self, mut user: User) -> Result<User> {
        let mut data = self.data.write().await;

        if data
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(VaultError::Conflict(format!(
                "Email already registered: {}",
                user.email
            )));
        }

        let mut next = data.clone();
        user.id = next.next_user_id;
        next.next_user_id += 1;
        next.users.insert(user.id, user.clone());
        self.commit(&mut data, next).await?;

        debug!("Inserted user {}", user.id);
        Ok(user)
    }

    async fn get_user(&self, id: u64) -> Result<Option<User>> {
        Ok(self.data.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.data.read().await.users.values().cloned().collect())
    }

    async fn insert_acesso(&self, mut record: StoredAcesso) -> Result<StoredAcesso> {
        let mut data = self.data.write().await;

        let mut next = data.clone();
        record.acesso.id = next.next_acesso_id;
        next.next_acesso_id += 1;
        next.acessos.insert(record.acesso.id, record.clone());
        self.commit(&mut data, next).await?;

        debug!("Inserted credential {}", record.acesso.id);
        Ok(record)
    }

    async fn get_acesso(&self, id: u64) -> Result<Option<StoredAcesso>> {
        Ok(self.data.read().await.acessos.get(&id).cloned())
    }

    async fn list_acessos(&self) -> Result<Vec<StoredAcesso>> {
        Ok(self.data.read().await.acessos.values().cloned().collect())
    }

    async fn update_acesso(&self, record: StoredAcesso) -> Result<()> {
        let mut data = self.data.write().await;

        let id = record.acesso.id;
        if !data.acessos.contains_key(&id) {
            return Err(VaultError::not_found(format!(
                "Credential not found with id: {}",
                id
            )));
        }
        let mut next = data.clone();
        next.acessos.insert(id, record);
        self.commit(&mut data, next).await?;

        debug!("Updated credential {}", id);
        Ok(())
    }

    async fn delete_acesso(&self, id: u64) -> Result<bool> {
        let mut data = self.data.write().await;

        if !data.acessos.contains_key(&id) {
            return Ok(false);
        }
        let mut next = data.clone();
        next.acessos.remove(&id);
        self.commit(&mut data, next).await?;

        debug!("Deleted credential {}", id);
        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        if self.is_persistent() {
            "JSON File Storage"
        } else {
            "In-Memory Storage"
        }
    }
}
