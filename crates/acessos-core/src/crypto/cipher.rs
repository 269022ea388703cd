//! AES-256-GCM sealing of credential secrets
//!
//! Sealed format: `{iv_hex}:{auth_tag_hex}:{ciphertext_hex}`
//! - IV: 12 bytes, fresh per seal
//! - Auth tag: 16 bytes
//! - Ciphertext: same length as the plaintext

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

use super::{MasterKey, SecretString};
use crate::error::{Result, VaultError};

const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// A sealed secret split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecret {
    pub iv: [u8; IV_LEN],
    pub auth_tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl std::fmt::Display for SealedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            hex::encode(self.iv),
            hex::encode(self.auth_tag),
            hex::encode(&self.ciphertext)
        )
    }
}

impl std::str::FromStr for SealedSecret {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let (Some(iv), Some(tag), Some(body), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(VaultError::DecryptionError(
                "expected iv:tag:ciphertext".to_string(),
            ));
        };

        let iv = decode_fixed::<IV_LEN>(iv, "IV")?;
        let auth_tag = decode_fixed::<TAG_LEN>(tag, "auth tag")?;
        let ciphertext = hex::decode(body)
            .map_err(|e| VaultError::DecryptionError(format!("Invalid ciphertext hex: {}", e)))?;

        Ok(Self {
            iv,
            auth_tag,
            ciphertext,
        })
    }
}

fn decode_fixed<const N: usize>(part: &str, what: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(part)
        .map_err(|e| VaultError::DecryptionError(format!("Invalid {} hex: {}", what, e)))?;
    bytes.as_slice().try_into().map_err(|_| {
        VaultError::DecryptionError(format!(
            "Invalid {} length: expected {}, got {}",
            what,
            N,
            bytes.len()
        ))
    })
}

/// Seals and opens credential secrets with a single master key
#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    pub fn new(key: &MasterKey) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| VaultError::EncryptionError(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Encrypt a plaintext secret into its sealed string form
    pub fn seal(&self, plaintext: &str) -> Result<String> {
        let mut iv = [0u8; IV_LEN];
        rand::thread_rng().fill_bytes(&mut iv);

        // aes-gcm returns ciphertext with the tag appended
        let mut sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
            .map_err(|e| VaultError::EncryptionError(e.to_string()))?;

        if sealed.len() < TAG_LEN {
            return Err(VaultError::EncryptionError("Ciphertext too short".to_string()));
        }
        let tag = sealed.split_off(sealed.len() - TAG_LEN);
        let mut auth_tag = [0u8; TAG_LEN];
        auth_tag.copy_from_slice(&tag);

        Ok(SealedSecret {
            iv,
            auth_tag,
            ciphertext: sealed,
        }
        .to_string())
    }

    /// Decrypt a sealed string back into the plaintext secret
    pub fn open(&self, sealed: &str) -> Result<SecretString> {
        let parsed: SealedSecret = sealed.parse()?;

        let mut payload = parsed.ciphertext;
        payload.extend_from_slice(&parsed.auth_tag);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&parsed.iv), payload.as_slice())
            .map_err(|e| VaultError::DecryptionError(e.to_string()))?;

        String::from_utf8(plaintext)
            .map(SecretString::new)
            .map_err(|e| VaultError::DecryptionError(format!("Invalid UTF-8: {}", e)))
    }
}

impl std::fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretCipher { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher(byte: u8) -> SecretCipher {
        SecretCipher::new(&MasterKey::new([byte; 32])).unwrap()
    }

    #[test]
    fn test_seal_and_open() {
        let cipher = cipher(7);
        let sealed = cipher.seal("postgres://admin:hunter2").unwrap();

        assert!(!sealed.contains("hunter2"));
        assert_eq!(cipher.open(&sealed).unwrap().expose(), "postgres://admin:hunter2");
    }

    #[test]
    fn test_same_secret_seals_differently() {
        let cipher = cipher(7);
        let a = cipher.seal("same").unwrap();
        let b = cipher.seal("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = cipher(1).seal("secret").unwrap();
        assert!(matches!(
            cipher(2).open(&sealed),
            Err(VaultError::DecryptionError(_))
        ));
    }

    #[test]
    fn test_tampered_tag_fails() {
        let cipher = cipher(3);
        let mut parsed: SealedSecret = cipher.seal("secret").unwrap().parse().unwrap();
        parsed.auth_tag[0] ^= 0xFF;

        assert!(cipher.open(&parsed.to_string()).is_err());
    }

    #[test]
    fn test_malformed_sealed_strings() {
        let cipher = cipher(3);
        assert!(cipher.open("plain-text").is_err());
        assert!(cipher.open("a:b").is_err());
        assert!(cipher.open("00:00:00:00").is_err());
        assert!(cipher.open("zz:zz:zz").is_err());
        // IV of the wrong length
        assert!(cipher.open(&format!("0011:{}:00", "00".repeat(16))).is_err());
    }
}
