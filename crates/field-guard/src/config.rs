//! Configuration loading and validation.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::crypto::{CryptoCore, Secret, PBKDF2_ITERATIONS};
use crate::guard::{GuardConfig, SensitiveFields};

/// Secret used when `ENCRYPTION_KEY` is unset. Never acceptable in production.
pub const INSECURE_DEFAULT_KEY: &str = "insecure-development-key-do-not-use-in-production";

/// Validated service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Master secret for every key derivation. Falls back to
    /// [`INSECURE_DEFAULT_KEY`] with a warning.
    #[serde(default)]
    pub encryption_key: Option<String>,

    /// Whether outbound responses are encrypted at all.
    #[serde(default)]
    pub enable_encryption: bool,

    /// Comma-separated sensitive field names; the clinic defaults when unset.
    #[serde(default)]
    pub sensitive_fields: Option<String>,

    /// PBKDF2 cost. Must be at least [`PBKDF2_ITERATIONS`].
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_kdf_iterations() -> u32 {
    PBKDF2_ITERATIONS
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "[REDACTED]"))
            .field("enable_encryption", &self.enable_encryption)
            .field("sensitive_fields", &self.sensitive_fields)
            .field("kdf_iterations", &self.kdf_iterations)
            .field("listen_port", &self.listen_port)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_source(config::Environment::default())
    }

    /// Load and validate configuration from an explicit environment source.
    fn from_source(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.kdf_iterations < PBKDF2_ITERATIONS {
            anyhow::bail!("KDF_ITERATIONS must be >= {PBKDF2_ITERATIONS}");
        }
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        if self.enable_encryption && self.fields().is_empty() {
            anyhow::bail!("SENSITIVE_FIELDS must name at least one field when encryption is enabled");
        }
        Ok(())
    }

    /// The master secret, falling back loudly to [`INSECURE_DEFAULT_KEY`].
    ///
    /// Call after telemetry is up so the fallback warning is recorded.
    pub fn secret(&self) -> Secret {
        match self.encryption_key.as_deref().map(Secret::new) {
            Some(key) if !key.is_blank() => key,
            _ => {
                warn!("ENCRYPTION_KEY not set; using the insecure development default");
                Secret::new(INSECURE_DEFAULT_KEY)
            }
        }
    }

    pub fn fields(&self) -> SensitiveFields {
        match self.sensitive_fields.as_deref() {
            Some(list) => SensitiveFields::parse(list),
            None => SensitiveFields::clinic_defaults(),
        }
    }

    /// A [`CryptoCore`] with the configured PBKDF2 cost.
    ///
    /// # Errors
    ///
    /// Returns an error if `kdf_iterations` is below the floor.
    pub fn crypto_core(&self) -> Result<CryptoCore> {
        CryptoCore::with_iterations(self.kdf_iterations)
            .with_context(|| format!("KDF_ITERATIONS must be >= {PBKDF2_ITERATIONS}"))
    }

    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            enabled: self.enable_encryption,
            key: self.secret(),
            fields: self.fields(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        config::Environment::default().source(Some(map))
    }

    #[test]
    fn env_strings_are_typed() {
        let cfg = Config::from_source(env(&[
            ("ENCRYPTION_KEY", "from-env"),
            ("ENABLE_ENCRYPTION", "true"),
            ("SENSITIVE_FIELDS", "diagnosis, idNumber"),
            ("KDF_ITERATIONS", "150000"),
            ("LISTEN_PORT", "9090"),
        ]))
        .unwrap();
        assert!(cfg.enable_encryption);
        assert_eq!(cfg.kdf_iterations, 150_000);
        assert_eq!(cfg.listen_port, 9090);
        assert_eq!(cfg.fields().len(), 2);
        assert_eq!(cfg.secret().as_bytes(), b"from-env");
    }

    #[test]
    fn empty_env_is_pass_through() {
        let cfg = Config::from_source(env(&[])).unwrap();
        assert!(!cfg.enable_encryption);
        assert!(!cfg.guard_config().enabled);
        assert_eq!(cfg.kdf_iterations, default_kdf_iterations());
        assert_eq!(cfg.secret().as_bytes(), INSECURE_DEFAULT_KEY.as_bytes());

        let off = Config::from_source(env(&[("ENABLE_ENCRYPTION", "false")])).unwrap();
        assert!(!off.enable_encryption);
    }

    #[test]
    fn env_values_are_validated() {
        assert!(Config::from_source(env(&[("KDF_ITERATIONS", "1000")])).is_err());
        assert!(Config::from_source(env(&[("LISTEN_PORT", "not-a-port")])).is_err());
    }

    fn base() -> Config {
        Config {
            encryption_key: Some("s3cret".into()),
            enable_encryption: true,
            sensitive_fields: None,
            kdf_iterations: default_kdf_iterations(),
            listen_port: default_listen_port(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_kdf_iterations(), 100_000);
        assert_eq!(default_listen_port(), 8080);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn base_config_is_valid() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn validate_rejects_weak_kdf() {
        let cfg = Config {
            kdf_iterations: 10_000,
            ..base()
        };
        assert!(cfg.validate().is_err());
        assert!(cfg.crypto_core().is_err());
    }

    #[test]
    fn validate_rejects_empty_field_list_when_enabled() {
        let cfg = Config {
            sensitive_fields: Some(" , ".into()),
            ..base()
        };
        assert!(cfg.validate().is_err());

        let disabled = Config {
            enable_encryption: false,
            ..cfg
        };
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn missing_key_falls_back_to_labelled_default() {
        for key in [None, Some("".to_owned()), Some("  ".to_owned())] {
            let cfg = Config {
                encryption_key: key,
                ..base()
            };
            assert_eq!(cfg.secret().as_bytes(), INSECURE_DEFAULT_KEY.as_bytes());
        }
        assert_eq!(base().secret().as_bytes(), b"s3cret");
    }

    #[test]
    fn guard_config_reflects_env() {
        let cfg = Config {
            sensitive_fields: Some("diagnosis,idNumber".into()),
            ..base()
        };
        let g = cfg.guard_config();
        assert!(g.enabled);
        assert_eq!(g.fields.len(), 2);
        assert_eq!(g.key.as_bytes(), b"s3cret");
    }

    #[test]
    fn debug_redacts_key() {
        let printed = format!("{:?}", base());
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("REDACTED"));
    }
}
