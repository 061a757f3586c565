//! Fixed-width envelope framing.
//!
//! ```text
//! base64( salt[64] | iv[16] | tag[16] | ciphertext[n] )
//! ```
//!
//! Standard base64 alphabet with padding. Any separate decryption tool must
//! reproduce this layout byte for byte.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::error::DecryptionFailure;

/// Byte length of the per-envelope PBKDF2 salt.
pub const SALT_LEN: usize = 64;

/// Byte length of the per-envelope AES-GCM IV.
pub const IV_LEN: usize = 16;

/// Byte length of the AES-GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Minimum decoded envelope length: everything except the ciphertext.
pub const HEADER_LEN: usize = SALT_LEN + IV_LEN + TAG_LEN;

/// A decoded envelope, split at the fixed offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; IV_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Concatenate the parts and base64-encode them.
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        raw.extend_from_slice(&self.salt);
        raw.extend_from_slice(&self.iv);
        raw.extend_from_slice(&self.tag);
        raw.extend_from_slice(&self.ciphertext);
        STANDARD.encode(raw)
    }

    /// Decode a base64 envelope and slice it into its parts.
    ///
    /// # Errors
    ///
    /// [`DecryptionFailure::Base64`] if the input is not base64, or
    /// [`DecryptionFailure::Truncated`] if fewer than [`HEADER_LEN`] bytes decode.
    pub fn parse(encoded: &str) -> Result<Self, DecryptionFailure> {
        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|_| DecryptionFailure::Base64)?;
        Self::from_bytes(&raw)
    }

    /// Slice an already-decoded envelope.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, DecryptionFailure> {
        if raw.len() < HEADER_LEN {
            return Err(DecryptionFailure::Truncated);
        }
        let (salt, rest) = raw.split_at(SALT_LEN);
        let (iv, rest) = rest.split_at(IV_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        let mut env = Envelope {
            salt: [0u8; SALT_LEN],
            iv: [0u8; IV_LEN],
            tag: [0u8; TAG_LEN],
            ciphertext: ciphertext.to_vec(),
        };
        env.salt.copy_from_slice(salt);
        env.iv.copy_from_slice(iv);
        env.tag.copy_from_slice(tag);
        Ok(env)
    }
}

/// Cheap structural check: does `s` decode to something envelope-shaped?
///
/// Does not need the secret and proves nothing about authenticity.
pub fn looks_encrypted(s: &str) -> bool {
    Envelope::parse(s).is_ok()
}
