//! # acessos-core
//!
//! Core functionality for the credential-sharing service:
//! - AES-256-GCM sealing of credential secrets with an Argon2id-derived key
//! - User accounts with Argon2id password hashes and HS256 bearer sessions
//! - Credential visibility (private vs. shared among administrators)
//! - Expiration classification and a per-user notification feed
//! - JSON file storage with atomic writes

pub mod acesso;
pub mod clock;
pub mod crypto;
pub mod error;
pub mod notification;
pub mod session;
pub mod settings;
pub mod storage;
pub mod user;
mod vault;

pub use acesso::{
    AcessoService, AcessoView, ExpirationClassifier, ExpirationEvent, ExpirationStatus,
    NewAcesso, RevealedSecret, UpdateAcesso, Visibility, VisibilityPolicy,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto::{MasterKey, SecretCipher, SecretString};
pub use error::{Result, VaultError};
pub use notification::{Notification, NotificationFeed, NotificationKind};
pub use session::{Claims, Session, TokenService};
pub use settings::{BootstrapAdmin, Settings, SettingsManager};
pub use storage::{JsonFileStore, KeyStore, Store};
pub use user::{NewUser, Principal, Role, User, UserService, UserView};
pub use vault::Vault;
