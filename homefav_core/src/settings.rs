use crate::error::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Directory holding the file-backed key-value store (native only)
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    /// Site origin used to resolve `favorite_properties_path`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Endpoint returning listing summaries for `property_ids[]`
    #[serde(default = "default_favorite_properties_path")]
    pub favorite_properties_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            api_base_url: default_api_base_url(),
            favorite_properties_path: default_favorite_properties_path(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    #[cfg(feature = "native")]
    pub fn from_file(path: &str) -> Result<Self, CoreError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("HOMEFAV"));
        let cfg = builder.build()?;
        Ok(cfg.try_deserialize()?)
    }

    #[cfg(feature = "native")]
    pub fn from_toml_str(contents: &str) -> Result<Self, CoreError> {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    #[cfg(feature = "native")]
    pub fn save_to_file(&self, path: &str) -> Result<(), CoreError> {
        let toml_string = toml::to_string(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Validate settings ranges and constraints
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.storage_dir.trim().is_empty() {
            return Err(CoreError::Validation("storage_dir must not be empty".to_string()));
        }
        if url::Url::parse(&self.api_base_url).is_err() {
            return Err(CoreError::Validation(format!(
                "api_base_url is not an absolute URL: {}",
                self.api_base_url
            )));
        }
        if self.favorite_properties_path.trim().is_empty() {
            return Err(CoreError::Validation("favorite_properties_path must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Validation("request_timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }
}

fn default_storage_dir() -> String { ".homefav".to_string() }
fn default_api_base_url() -> String { "http://127.0.0.1:8000".to_string() }
fn default_favorite_properties_path() -> String { "/property/ajax/favorites/".to_string() }
fn default_request_timeout_secs() -> u64 { 10 }
