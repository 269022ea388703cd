//! Argon2id derivation of the secret-sealing key and user password hashing

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use super::MasterKey;
use crate::error::{Result, VaultError};

/// Parameters for Argon2id
#[derive(Debug, Clone)]
pub struct KeyDerivationParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        // m=19 MiB, t=2, p=1
        Self {
            memory_cost: 19456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl KeyDerivationParams {
    fn argon2(&self, output_len: Option<usize>) -> Result<Argon2<'static>> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, output_len)
            .map_err(|e| VaultError::KeyDerivationError(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Generate a random salt in PHC base64 form
pub fn generate_salt() -> String {
    SaltString::generate(&mut OsRng).to_string()
}

/// Derive the 256-bit key that seals credential secrets
///
/// The same `secret` and `salt` always yield the same key, so the salt must be
/// persisted next to the data it protects.
pub fn derive_key(secret: &[u8], salt: &str, params: Option<KeyDerivationParams>) -> Result<MasterKey> {
    let argon2 = params.unwrap_or_default().argon2(Some(32))?;

    let salt = SaltString::from_b64(salt)
        .map_err(|e| VaultError::KeyDerivationError(format!("Invalid salt: {}", e)))?;

    let hash = argon2
        .hash_password(secret, &salt)
        .map_err(|e| VaultError::KeyDerivationError(e.to_string()))?
        .hash
        .ok_or_else(|| VaultError::KeyDerivationError("No hash output".to_string()))?;

    MasterKey::from_slice(hash.as_bytes())
        .ok_or_else(|| VaultError::KeyDerivationError("Hash output too short".to_string()))
}

/// Hash a login password into a PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = KeyDerivationParams::default()
        .argon2(None)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| VaultError::KeyDerivationError(format!("Password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a login password against a stored PHC string
pub fn verify_password(password: &str, phc: &str) -> Result<bool> {
    let parsed = PasswordHash::new(phc)
        .map_err(|e| VaultError::KeyDerivationError(format!("Invalid password hash: {}", e)))?;

    // Parameters are read back from the PHC string
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Option<KeyDerivationParams> {
        Some(KeyDerivationParams {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        let salt = generate_salt();
        let a = derive_key(b"token-secret", &salt, fast()).unwrap();
        let b = derive_key(b"token-secret", &salt, fast()).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_derive_key_depends_on_salt() {
        let a = derive_key(b"token-secret", &generate_salt(), fast()).unwrap();
        let b = derive_key(b"token-secret", &generate_salt(), fast()).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_derive_key_rejects_bad_salt() {
        assert!(matches!(
            derive_key(b"token-secret", "not a salt!", fast()),
            Err(VaultError::KeyDerivationError(_))
        ));
    }

    #[test]
    fn test_password_hash_verifies() {
        let phc = hash_password("correct horse").unwrap();

        assert!(phc.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &phc).unwrap());
        assert!(!verify_password("wrong horse", &phc).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }
}
