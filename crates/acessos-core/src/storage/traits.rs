//! Storage trait definitions

use async_trait::async_trait;

use crate::acesso::StoredAcesso;
use crate::error::Result;
use crate::user::User;

/// Persistence for users and credentials
///
/// Implementations assign ids on insert and must make every write visible to
/// reads that start after the write returns.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a user, assigning its id. Fails with `Conflict` on a duplicate email.
    async fn insert_user(&self, user: User) -> Result<User>;

    async fn get_user(&self, id: u64) -> Result<Option<User>>;

    /// Case-insensitive email lookup
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Insert a credential, assigning its id
    async fn insert_acesso(&self, record: StoredAcesso) -> Result<StoredAcesso>;

    async fn get_acesso(&self, id: u64) -> Result<Option<StoredAcesso>>;

    /// All credentials, ordered by id
    async fn list_acessos(&self) -> Result<Vec<StoredAcesso>>;

    /// Replace an existing credential. Fails with `NotFound` if it is gone.
    async fn update_acesso(&self, record: StoredAcesso) -> Result<()>;

    /// Permanently remove a credential. Returns whether it existed.
    async fn delete_acesso(&self, id: u64) -> Result<bool>;

    /// Human-readable backend name
    fn backend_name(&self) -> &'static str;
}

/// Key material kept next to the data
///
/// Holds the salt for the secret-sealing key and a sealed known plaintext used
/// to detect a changed token secret. Stores without a directory keep nothing.
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn load_salt(&self) -> Result<Option<String>>;

    async fn save_salt(&self, salt: &str) -> Result<()>;

    async fn load_verification(&self) -> Result<Option<String>>;

    async fn save_verification(&self, sealed: &str) -> Result<()>;
}
