use std::{path::Path, sync::Arc};

use arc_swap::ArcSwap;
use config::{Config, Environment, File};
use otpgate_application::GateError;
use otpgate_core::{GateConfig, SessionStoreError};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

use super::constants::{DEFAULT_CONFIG_FILE, SESSION_COOKIE_NAME, env};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration source not found: {0}")]
    ConfigMissing(String),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),
    #[error("Cannot connect to the session store: {0}")]
    Redis(String),
}

impl From<SettingsError> for GateError {
    fn from(error: SettingsError) -> Self {
        match error {
            SettingsError::ConfigMissing(source) => GateError::ConfigMissing(source),
            SettingsError::Invalid(e) => GateError::InvalidConfig(e.to_string()),
            SettingsError::Redis(e) => {
                GateError::SessionStoreError(SessionStoreError::UnexpectedError(e))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Cookie carrying the session id the gate state hangs off.
    pub cookie_name: String,
    /// Redis connection URL. In-memory sessions when unset.
    pub redis_url: Option<Secret<String>>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: SESSION_COOKIE_NAME.to_string(),
            redis_url: None,
        }
    }
}

/// Everything the gate reads at boot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    pub gate: GateConfig,
    pub session: SessionSettings,
}

impl GateSettings {
    /// Load from defaults, an optional `otpgate.*` file and `OTPGATE_*`
    /// environment variables, in increasing precedence.
    ///
    /// When `OTPGATE_CONFIG_FILE` is set, that file is required.
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();

        match std::env::var(env::CONFIG_FILE_ENV_VAR) {
            Ok(path) => Self::load_from(path),
            Err(_) => Self::build(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        }
    }

    /// Load with `path` as a required configuration file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SettingsError::ConfigMissing(path.display().to_string()));
        }
        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, SettingsError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(env::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(env::ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        tracing::debug!(?settings, "Gate settings loaded");
        Ok(settings)
    }
}

/// Shared, swappable gate configuration.
///
/// Each request takes one snapshot with [`ConfigHandle::load`] and uses it
/// throughout; a concurrent [`ConfigHandle::store`] only affects later
/// requests.
#[derive(Debug, Clone)]
pub struct ConfigHandle(Arc<ArcSwap<GateConfig>>);

impl ConfigHandle {
    pub fn new(config: GateConfig) -> Self {
        Self(Arc::new(ArcSwap::from_pointee(config)))
    }

    pub fn load(&self) -> Arc<GateConfig> {
        self.0.load_full()
    }

    pub fn store(&self, config: GateConfig) {
        tracing::info!("Gate configuration replaced");
        self.0.store(Arc::new(config));
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}
