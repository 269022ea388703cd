//! Cryptographic primitives
//!
//! - AES-256-GCM sealing of credential secrets
//! - Argon2id key derivation and password hashing
//! - Zeroize-on-drop key and secret holders

mod cipher;
mod key_derivation;
mod secure_memory;

pub use cipher::{SealedSecret, SecretCipher};
pub use key_derivation::{derive_key, generate_salt, hash_password, verify_password, KeyDerivationParams};
pub use secure_memory::{MasterKey, SecretString};
