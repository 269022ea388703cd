//! Key and secret holders that wipe themselves on drop

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key used to seal credential secrets
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; 32],
}

impl MasterKey {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    /// Build from the first 32 bytes of `slice`, or `None` if it is shorter
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let key: [u8; 32] = slice.get(..32)?.try_into().ok()?;
        Some(Self { key })
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// A revealed plaintext secret
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Borrow the plaintext. Keep the borrow short.
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.value)
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_key_from_long_slice_takes_prefix() {
        let bytes: Vec<u8> = (0..40).collect();
        let key = MasterKey::from_slice(&bytes).unwrap();
        assert_eq!(&key.as_bytes()[..], &bytes[..32]);
    }

    #[test]
    fn test_master_key_from_short_slice() {
        assert!(MasterKey::from_slice(&[1u8; 16]).is_none());
    }

    #[test]
    fn test_debug_output_is_redacted() {
        let secret = SecretString::new("s3cr3t-value".to_string());
        let printed = format!("{:?} {:?}", secret, MasterKey::new([9u8; 32]));
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("s3cr3t"));
    }

    #[test]
    fn test_into_inner() {
        let secret = SecretString::new("abc".to_string());
        assert_eq!(secret.into_inner(), "abc");
    }
}
