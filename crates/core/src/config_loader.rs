use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by layering the TOML file and
    /// `COPYTRACE_`-prefixed environment variables over built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from("config/copytrace.toml")
    }

    /// Same as [`ConfigLoader::load`] but with an explicit file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("COPYTRACE_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// Loads configuration with a profile overlay
    /// (`config/copytrace.<profile>.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("config/copytrace.toml"))
            .merge(Toml::file(format!("config/copytrace.{profile}.toml")))
            .merge(Env::prefixed("COPYTRACE_").split("__"))
            .extract()?;

        Ok(config)
    }
}
