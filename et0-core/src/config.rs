use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::{geocode::ProviderId, http::DEFAULT_USER_AGENT, units::UnitSystem};

/// Overrides the Google Maps key from the config file when set.
pub const GOOGLE_API_KEY_ENV: &str = "ET0_GOOGLE_MAPS_API_KEY";

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Base URL overrides, mostly useful for testing against a local server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Endpoints {
    pub nws: Option<String>,
    pub nominatim: Option<String>,
    pub google: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Sent as User-Agent to the weather and geocoding services.
    pub user_agent: Option<String>,

    /// Preferred display units.
    #[serde(default)]
    pub units: UnitSystem,

    /// Geocoding providers in priority order, e.g. ["google", "nominatim"].
    pub provider_order: Option<Vec<String>>,

    /// Example TOML:
    /// [providers.google]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Config {
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Geocoding providers in the order they should be tried.
    pub fn provider_order(&self) -> Result<Vec<ProviderId>> {
        match &self.provider_order {
            None => Ok(ProviderId::all().to_vec()),
            Some(names) if names.is_empty() => Err(anyhow!(
                "`provider_order` is empty.\n\
                 Hint: remove it from the config file to use the default order."
            )),
            Some(names) => names.iter().map(|n| ProviderId::try_from(n.as_str())).collect(),
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Google Maps key: environment first, then the config file.
    pub fn google_api_key(&self) -> Option<String> {
        self.google_api_key_from(std::env::var(GOOGLE_API_KEY_ENV).ok())
    }

    /// A blank environment value falls through to the file.
    fn google_api_key_from(&self, env: Option<String>) -> Option<String> {
        env.filter(|k| !k.trim().is_empty())
            .or_else(|| self.provider_api_key(ProviderId::Google).map(str::to_owned))
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "et0-calculator", "et0")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });
    }

    pub fn remove_provider(&mut self, provider_id: ProviderId) {
        self.providers.remove(provider_id.as_str());
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers
            .get(provider_id.as_str())
            .map(|cfg| cfg.api_key.as_str())
            .filter(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_is_google_then_nominatim() {
        let cfg = Config::default();
        assert_eq!(cfg.provider_order().unwrap(), vec![ProviderId::Google, ProviderId::Nominatim]);
    }

    #[test]
    fn custom_order_and_unknown_names() {
        let mut cfg = Config {
            provider_order: Some(vec!["nominatim".into()]),
            ..Default::default()
        };
        assert_eq!(cfg.provider_order().unwrap(), vec![ProviderId::Nominatim]);

        cfg.provider_order = Some(vec!["bing".into()]);
        let err = cfg.provider_order().unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));

        cfg.provider_order = Some(vec![]);
        assert!(cfg.provider_order().is_err());
    }

    #[test]
    fn upsert_and_remove_api_key() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Google, "KEY".into());
        assert_eq!(cfg.provider_api_key(ProviderId::Google), Some("KEY"));

        cfg.upsert_provider_api_key(ProviderId::Google, "  ".into());
        assert_eq!(cfg.provider_api_key(ProviderId::Google), None);

        cfg.remove_provider(ProviderId::Google);
        assert!(cfg.provider_config(ProviderId::Google).is_none());
    }

    #[test]
    fn env_key_takes_precedence_over_file() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Google, "FILE".into());

        assert_eq!(cfg.google_api_key_from(Some("ENV".into())).as_deref(), Some("ENV"));
        assert_eq!(cfg.google_api_key_from(Some("   ".into())).as_deref(), Some("FILE"));
        assert_eq!(cfg.google_api_key_from(None).as_deref(), Some("FILE"));
    }

    #[test]
    fn no_key_anywhere() {
        let cfg = Config::default();
        assert_eq!(cfg.google_api_key_from(None), None);
        assert_eq!(cfg.google_api_key_from(Some(String::new())), None);
        assert_eq!(cfg.google_api_key_from(Some("ENV".into())).as_deref(), Some("ENV"));
    }

    #[test]
    fn parses_full_toml() {
        let cfg = Config::from_toml(
            r#"
            user_agent = "my-farm (me@example.com)"
            units = "imperial"
            provider_order = ["nominatim", "google"]

            [providers.google]
            api_key = "abc"

            [endpoints]
            nws = "http://localhost:9000"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.user_agent(), "my-farm (me@example.com)");
        assert_eq!(cfg.units, UnitSystem::Imperial);
        assert_eq!(cfg.provider_api_key(ProviderId::Google), Some("abc"));
        assert_eq!(cfg.endpoints.nws.as_deref(), Some("http://localhost:9000"));
        assert_eq!(cfg.provider_order().unwrap()[0], ProviderId::Nominatim);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.units, UnitSystem::Metric);
        assert_eq!(cfg.user_agent(), DEFAULT_USER_AGENT);
        assert!(cfg.providers.is_empty());
    }

    #[test]
    fn roundtrips_through_toml() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Google, "KEY".into());
        cfg.units = UnitSystem::Imperial;

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.provider_api_key(ProviderId::Google), Some("KEY"));
        assert_eq!(back.units, UnitSystem::Imperial);
    }
}
