//! CLI configuration

use anyhow::{Context, Result, bail};
use sealsms_crypto::SharedSecret;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// sealsms configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Shared secret source
    #[serde(default)]
    pub secret: SecretConfig,

    /// Receiving side
    #[serde(default)]
    pub receiver: ReceiverConfig,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: CliConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Where the shared secret comes from
#[derive(Clone, Deserialize)]
pub struct SecretConfig {
    /// Environment variable holding the secret
    #[serde(default = "default_secret_env")]
    pub env: String,

    /// Inline secret, takes precedence over `env`
    #[serde(default)]
    pub value: Option<String>,

    /// Secret version, bumped whenever the secret changes
    #[serde(default = "default_secret_version")]
    pub version: u32,
}

fn default_secret_env() -> String {
    "SHARED_SECRET".to_string()
}

fn default_secret_version() -> u32 {
    1
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            env: default_secret_env(),
            value: None,
            version: default_secret_version(),
        }
    }
}

impl fmt::Debug for SecretConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretConfig")
            .field("env", &self.env)
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .field("version", &self.version)
            .finish()
    }
}

impl SecretConfig {
    /// Resolve the secret from the inline value or the environment
    pub fn resolve(&self) -> Result<SharedSecret> {
        let secret = match &self.value {
            Some(value) => value.clone(),
            None => std::env::var(&self.env)
                .with_context(|| format!("shared secret not set (${})", self.env))?,
        };

        if secret.is_empty() {
            bail!("shared secret is empty");
        }

        Ok(SharedSecret::with_version(secret.into_bytes(), self.version))
    }
}

/// Receiver configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceiverConfig {
    /// Cache derived keys per (secret version, group)
    #[serde(default)]
    pub key_cache: bool,
}
