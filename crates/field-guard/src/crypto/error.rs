//! Error taxonomy for the crypto layer.

use thiserror::Error;

/// Why an envelope could not be opened.
///
/// Every variant renders the same way to end users ("data unreadable"); the
/// distinction exists for logs and metrics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptionFailure {
    /// The input was not valid standard base64.
    Base64,
    /// The decoded envelope is shorter than the fixed salt/iv/tag header.
    Truncated,
    /// The authentication tag did not verify (tampering or wrong secret).
    Authentication,
    /// The tag verified but the plaintext is not UTF-8.
    Utf8,
}

impl DecryptionFailure {
    fn as_str(self) -> &'static str {
        match self {
            DecryptionFailure::Base64 => "invalid base64",
            DecryptionFailure::Truncated => "envelope too short",
            DecryptionFailure::Authentication => "authentication failed",
            DecryptionFailure::Utf8 => "plaintext is not utf-8",
        }
    }
}

impl std::fmt::Display for DecryptionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by [`CryptoCore`](super::CryptoCore).
///
/// `Encryption` and `Decryption` are deliberately separate so callers can tell
/// "could not protect outgoing data" apart from "stored data is unreadable".
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The cipher (or object serialisation) failed while sealing a value.
    #[error("encryption failed: {0}")]
    Encryption(&'static str),

    /// An envelope could not be validated or opened.
    #[error("decryption failed: {0}")]
    Decryption(DecryptionFailure),

    /// Decrypted plaintext was not valid JSON for the requested type.
    #[error("decrypted payload is not valid json: {0}")]
    Parse(#[source] serde_json::Error),
}

impl CryptoError {
    /// Short, stable label suitable for a log field. Never contains data.
    pub fn kind(&self) -> &'static str {
        match self {
            CryptoError::Encryption(_) => "encryption",
            CryptoError::Decryption(_) => "decryption",
            CryptoError::Parse(_) => "parse",
        }
    }
}

impl From<DecryptionFailure> for CryptoError {
    fn from(reason: DecryptionFailure) -> Self {
        CryptoError::Decryption(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let enc = CryptoError::Encryption("aead failure");
        let dec = CryptoError::Decryption(DecryptionFailure::Authentication);
        assert_eq!(enc.kind(), "encryption");
        assert_eq!(dec.kind(), "decryption");
        assert_ne!(enc.kind(), dec.kind());
    }

    #[test]
    fn display_names_the_reason() {
        let e: CryptoError = DecryptionFailure::Truncated.into();
        assert_eq!(e.to_string(), "decryption failed: envelope too short");
    }
}
