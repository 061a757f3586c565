//! Selective field-level encryption of outbound JSON responses.
//!
//! # Policy
//!
//! - Every object key listed in [`SensitiveFields`] whose value is a string is
//!   replaced by a [`CryptoCore`] envelope, at any nesting depth, and a
//!   `"<key>_encrypted": true` flag is written beside it.
//! - Non-string values under a sensitive key are left alone (but still walked).
//! - A payload whose root carries a truthy `_encrypted` marker is returned as
//!   is. A field is skipped only when its flag is `true` *and* its value is
//!   already an envelope; a flagged plaintext string is encrypted anyway.
//! - When a single field fails to encrypt it is reported and shipped as
//!   plaintext; the rest of the payload is still processed. Availability is
//!   preferred over confidentiality for that field.
//! - With `enabled = false` payloads pass through untouched, which means
//!   plaintext on the wire.

pub mod fields;
pub mod report;

pub use fields::{flag_name, SensitiveFields, DEFAULT_SENSITIVE_FIELDS};
pub use report::{FailureReporter, TracingReporter};

use serde_json::{Map, Value};

use crate::crypto::{looks_encrypted, CryptoCore, CryptoError, Secret};
use fields::{ENCRYPTED_SUFFIX, PROCESSED_MARKER};

/// Runtime guard settings. Read-only once built.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub enabled: bool,
    pub key: Secret,
    pub fields: SensitiveFields,
}

/// The encryption seam the guard calls per field.
#[cfg_attr(test, mockall::automock)]
pub trait FieldEncryptor: Send + Sync {
    fn seal(&self, plaintext: &str, secret: &Secret) -> Result<String, CryptoError>;
    fn open(&self, envelope: &str, secret: &Secret) -> Result<String, CryptoError>;
}

impl FieldEncryptor for CryptoCore {
    fn seal(&self, plaintext: &str, secret: &Secret) -> Result<String, CryptoError> {
        self.encrypt(plaintext, secret)
    }

    fn open(&self, envelope: &str, secret: &Secret) -> Result<String, CryptoError> {
        self.decrypt(envelope, secret)
    }
}

/// Guard `value` with a default [`CryptoCore`] and `tracing` failure reports.
pub fn guard(value: Value, config: &GuardConfig) -> Value {
    Walker {
        config,
        encryptor: &CryptoCore::new(),
        reporter: &TracingReporter,
    }
    .guard(value)
}

/// Long-lived guard owning its configuration and collaborators.
///
/// `Send + Sync` whenever its parts are; share it behind an `Arc`.
#[derive(Debug)]
pub struct FieldGuard<E = CryptoCore, R = TracingReporter> {
    config: GuardConfig,
    encryptor: E,
    reporter: R,
}

impl FieldGuard {
    /// A guard using `core` for encryption and `tracing` for failure reports.
    pub fn new(config: GuardConfig, core: CryptoCore) -> Self {
        Self::with_parts(config, core, TracingReporter)
    }
}

impl<E: FieldEncryptor, R: FailureReporter> FieldGuard<E, R> {
    /// A guard with explicit collaborators.
    pub fn with_parts(config: GuardConfig, encryptor: E, reporter: R) -> Self {
        Self {
            config,
            encryptor,
            reporter,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Encrypt every sensitive string field in `value`. Never fails.
    pub fn guard(&self, value: Value) -> Value {
        self.walker().guard(value)
    }

    /// Decrypt every flagged field in `value` and drop the flags.
    ///
    /// Fields that fail to decrypt stay sealed with their flag intact.
    pub fn reveal(&self, value: Value) -> Value {
        self.walker().reveal(value)
    }

    fn walker(&self) -> Walker<'_, E, R> {
        Walker {
            config: &self.config,
            encryptor: &self.encryptor,
            reporter: &self.reporter,
        }
    }
}

struct Walker<'a, E, R> {
    config: &'a GuardConfig,
    encryptor: &'a E,
    reporter: &'a R,
}

impl<E: FieldEncryptor, R: FailureReporter> Walker<'_, E, R> {
    fn guard(&self, mut value: Value) -> Value {
        if !self.config.enabled || already_processed(&value) {
            return value;
        }
        self.seal_tree(&mut value);
        value
    }

    fn reveal(&self, mut value: Value) -> Value {
        if !self.config.enabled {
            return value;
        }
        self.reveal_tree(&mut value);
        value
    }

    fn seal_tree(&self, value: &mut Value) {
        match value {
            Value::Object(map) => self.seal_object(map),
            Value::Array(items) => items.iter_mut().for_each(|item| self.seal_tree(item)),
            _ => {}
        }
    }

    fn seal_object(&self, map: &mut Map<String, Value>) {
        for field in self.config.fields.iter() {
            let flag = flag_name(field);
            let Some(Value::String(plaintext)) = map.get(field) else {
                continue;
            };
            // A flag only counts when the value really is an envelope.
            if map.get(&flag) == Some(&Value::Bool(true)) && looks_encrypted(plaintext) {
                continue;
            }
            match self.encryptor.seal(plaintext, &self.config.key) {
                Ok(sealed) => {
                    map.insert(field.to_owned(), Value::String(sealed));
                    map.insert(flag, Value::Bool(true));
                }
                Err(e) => {
                    map.remove(&flag);
                    self.reporter.seal_failed(field, &e);
                }
            }
        }

        for child in map.values_mut() {
            if child.is_object() || child.is_array() {
                self.seal_tree(child);
            }
        }
    }

    fn reveal_tree(&self, value: &mut Value) {
        match value {
            Value::Object(map) => self.reveal_object(map),
            Value::Array(items) => items.iter_mut().for_each(|item| self.reveal_tree(item)),
            _ => {}
        }
    }

    fn reveal_object(&self, map: &mut Map<String, Value>) {
        let flagged: Vec<String> = map
            .iter()
            .filter(|(_, v)| **v == Value::Bool(true))
            .filter_map(|(k, _)| k.strip_suffix(ENCRYPTED_SUFFIX))
            .filter(|field| !field.is_empty())
            .map(str::to_owned)
            .collect();

        for field in flagged {
            let Some(Value::String(sealed)) = map.get(&field) else {
                continue;
            };
            match self.encryptor.open(sealed, &self.config.key) {
                Ok(plaintext) => {
                    map.insert(field.clone(), Value::String(plaintext));
                    map.remove(&flag_name(&field));
                }
                Err(e) => self.reporter.reveal_failed(&field, &e),
            }
        }

        for child in map.values_mut() {
            if child.is_object() || child.is_array() {
                self.reveal_tree(child);
            }
        }
    }
}

/// Does the root carry a truthy [`PROCESSED_MARKER`]?
fn already_processed(value: &Value) -> bool {
    value.get(PROCESSED_MARKER).is_some_and(is_truthy)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
