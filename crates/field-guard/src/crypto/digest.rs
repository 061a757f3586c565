//! One-way hashing, HMAC signing, and random tokens.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

use super::secret::Secret;

type HmacSha512 = Hmac<Sha512>;

/// Default byte length of [`generate_token`] output before hex encoding.
pub const DEFAULT_TOKEN_LEN: usize = 32;

/// Unsalted SHA-512 of `data`, lowercase hex.
///
/// For non-reversible identifiers only. Not a password hash.
pub fn hash(data: &str) -> String {
    hex::encode(Sha512::digest(data.as_bytes()))
}

/// `length` bytes from the OS CSPRNG, hex-encoded (so `2 * length` chars).
pub fn generate_token(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// HMAC-SHA-512 of `data` keyed by `secret`, lowercase hex.
pub fn sign(data: &str, secret: &Secret) -> String {
    let mut mac = <HmacSha512 as Mac>::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("hmac accepts any key length"));
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Check `signature` against a fresh [`sign`] of `data`.
///
/// The comparison is constant-time over equal-length inputs; a length mismatch
/// or any garbage input simply yields `false`.
pub fn verify(data: &str, signature: &str, secret: &Secret) -> bool {
    let expected = sign(data, secret);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_sha512_hex() {
        assert_eq!(
            hash("abc"),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
        assert_eq!(hash("abc"), hash("abc"));
        assert_ne!(hash("abc"), hash("abd"));
    }

    #[test]
    fn token_length_and_uniqueness() {
        let a = generate_token(DEFAULT_TOKEN_LEN);
        let b = generate_token(DEFAULT_TOKEN_LEN);
        assert_eq!(a.len(), DEFAULT_TOKEN_LEN * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
        assert_eq!(generate_token(4).len(), 8);
    }

    #[test]
    fn sign_then_verify() {
        let s = Secret::new("k1");
        let sig = sign("appointment:42", &s);
        assert_eq!(sig.len(), 128);
        assert!(verify("appointment:42", &sig, &s));
    }

    #[test]
    fn verify_rejects_other_secret_and_data() {
        let sig = sign("appointment:42", &Secret::new("k1"));
        assert!(!verify("appointment:42", &sig, &Secret::new("k2")));
        assert!(!verify("appointment:43", &sig, &Secret::new("k1")));
    }

    #[test]
    fn verify_rejects_garbage_without_panicking() {
        let s = Secret::new("k1");
        assert!(!verify("data", "garbage", &s));
        assert!(!verify("data", "", &s));
        let sig = sign("data", &s);
        assert!(!verify("data", &sig[..sig.len() - 1], &s));
    }
}
