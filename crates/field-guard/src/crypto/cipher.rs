//! PBKDF2-SHA-512 key derivation and AES-256-GCM sealing of individual strings.
//!
//! Every call to [`CryptoCore::encrypt`] draws a fresh 64-byte salt and a fresh
//! 16-byte IV from the OS CSPRNG, so one derived key never sees two nonces.
//! The IV is 16 bytes rather than the usual 12; GCM derives its counter block
//! through GHASH in that case, which is what interoperating consumers expect.

use aes_gcm::{
    aead::{
        consts::U16, generic_array::GenericArray, rand_core::RngCore, AeadInPlace, KeyInit, OsRng,
    },
    aes::Aes256,
    AesGcm,
};
use serde::{de::DeserializeOwned, Serialize};
use sha2::Sha512;

use super::envelope::{Envelope, IV_LEN, SALT_LEN, TAG_LEN};
use super::error::{CryptoError, DecryptionFailure};
use super::secret::Secret;

/// Byte length of a derived AES-256 key.
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count used by the wire format, and the floor for tuning.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// AES-256-GCM with a 128-bit IV and the default 128-bit tag.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Key derivation plus authenticated encryption of strings.
///
/// Holds only the PBKDF2 cost, so it is `Copy` and freely shared across
/// request tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoCore {
    iterations: u32,
}

impl CryptoCore {
    /// A core using the wire-format iteration count.
    pub const fn new() -> Self {
        Self {
            iterations: PBKDF2_ITERATIONS,
        }
    }

    /// A core with a raised PBKDF2 cost.
    ///
    /// Envelopes do not record their iteration count; both sides must agree.
    /// Returns `None` if `iterations` is below [`PBKDF2_ITERATIONS`].
    pub fn with_iterations(iterations: u32) -> Option<Self> {
        (iterations >= PBKDF2_ITERATIONS).then_some(Self { iterations })
    }

    /// The PBKDF2 iteration count in effect.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Stretch `secret` into a 256-bit key. Deterministic in `(secret, salt)`.
    pub fn derive_key(&self, secret: &Secret, salt: &[u8; SALT_LEN]) -> [u8; KEY_LEN] {
        pbkdf2::pbkdf2_hmac_array::<Sha512, KEY_LEN>(secret.as_bytes(), salt, self.iterations)
    }

    /// Seal `plaintext` into a base64 envelope.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Encryption`] if the cipher cannot be built or fails.
    /// No partial envelope is ever returned.
    pub fn encrypt(&self, plaintext: &str, secret: &Secret) -> Result<String, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut iv);

        let mut key = self.derive_key(secret, &salt);
        let cipher = Aes256Gcm16::new_from_slice(&key);
        zeroize::Zeroize::zeroize(&mut key);
        let cipher = cipher.map_err(|_| CryptoError::Encryption("invalid key length"))?;

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = cipher
            .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", &mut buffer)
            .map_err(|_| CryptoError::Encryption("aead operation failed"))?;

        let mut envelope = Envelope {
            salt,
            iv,
            tag: [0u8; TAG_LEN],
            ciphertext: buffer,
        };
        envelope.tag.copy_from_slice(tag.as_slice());
        Ok(envelope.encode())
    }

    /// Open a base64 envelope produced by [`encrypt`](Self::encrypt).
    ///
    /// Tag comparison is delegated to the AEAD implementation.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Decryption`] for malformed base64, truncated
    /// envelopes, authentication failure (tampering or wrong secret), or a
    /// non-UTF-8 plaintext.
    pub fn decrypt(&self, envelope_b64: &str, secret: &Secret) -> Result<String, CryptoError> {
        let envelope = Envelope::parse(envelope_b64)?;

        let mut key = self.derive_key(secret, &envelope.salt);
        let cipher = Aes256Gcm16::new_from_slice(&key);
        zeroize::Zeroize::zeroize(&mut key);
        let cipher = cipher.map_err(|_| DecryptionFailure::Authentication)?;

        let mut buffer = envelope.ciphertext;
        cipher
            .decrypt_in_place_detached(
                GenericArray::from_slice(&envelope.iv),
                b"",
                &mut buffer,
                GenericArray::from_slice(&envelope.tag),
            )
            .map_err(|_| DecryptionFailure::Authentication)?;

        String::from_utf8(buffer).map_err(|_| DecryptionFailure::Utf8.into())
    }

    /// Serialise `value` to JSON and seal it.
    ///
    /// # Errors
    ///
    /// Any [`encrypt`](Self::encrypt) failure; a serialisation failure is also
    /// reported as [`CryptoError::Encryption`].
    pub fn encrypt_object<T: Serialize + ?Sized>(
        &self,
        value: &T,
        secret: &Secret,
    ) -> Result<String, CryptoError> {
        let json = serde_json::to_string(value)
            .map_err(|_| CryptoError::Encryption("value is not serialisable"))?;
        self.encrypt(&json, secret)
    }

    /// Open an envelope and parse its plaintext as JSON.
    ///
    /// # Errors
    ///
    /// Any [`decrypt`](Self::decrypt) failure, or [`CryptoError::Parse`] if the
    /// plaintext is not valid JSON for `T`.
    pub fn decrypt_object<T: DeserializeOwned>(
        &self,
        envelope_b64: &str,
        secret: &Secret,
    ) -> Result<T, CryptoError> {
        let json = self.decrypt(envelope_b64, secret)?;
        serde_json::from_str(&json).map_err(CryptoError::Parse)
    }
}

impl Default for CryptoCore {
    fn default() -> Self {
        Self::new()
    }
}
