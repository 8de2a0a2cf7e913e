use crate::config::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by merging defaults, TOML, environment variables, and JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or fail validation.
    pub fn load() -> Result<AppConfig> {
        Self::extract(
            Self::base()
                .merge(Toml::file("config/Config.toml"))
                .merge(Self::env())
                .join(Json::file("config/Config.json")),
        )
    }

    /// Loads application configuration from an explicit TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or fails validation.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("Config file {} not found, using defaults", path.display());
        }
        Self::extract(Self::base().merge(Toml::file(path)).merge(Self::env()))
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    /// Loads configuration from an in-memory TOML document layered over defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or fails validation.
    pub fn load_from_str(toml: &str) -> Result<AppConfig> {
        Self::extract(Self::base().merge(Toml::string(toml)))
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    fn env() -> Env {
        Env::prefixed("FLOWVALUE_").split("__")
    }

    fn extract(figment: Figment) -> Result<AppConfig> {
        let config: AppConfig = figment.extract()?;
        config.snapshot.validate()?;
        crate::universe::validate_universe(&config.universe)?;
        Ok(config)
    }
}
