//! Service-level settings: where sources, configuration and published
//! resources live.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Directory bundle file paths are resolved against.
    pub source_root: PathBuf,

    /// Directory holding `Assets.{toml,yaml,yml,json}`.
    pub config_dir: PathBuf,

    /// Content-addressed store for created resources.
    pub storage_dir: PathBuf,

    /// Web-reachable directory for published resources.
    pub public_dir: PathBuf,

    /// URI prefix matching `public_dir`.
    pub base_uri: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("."),
            config_dir: PathBuf::from("Configuration"),
            storage_dir: PathBuf::from("Data/Persistent/Resources"),
            public_dir: PathBuf::from("Web/_Resources/Persistent"),
            base_uri: "/_Resources/Persistent".to_string(),
            log_level: None,
        }
    }
}

impl ServiceSettings {
    /// Load settings from multiple sources.
    /// Priority: environment variables (`SATCHEL_*`) > settings file > defaults
    ///
    /// The file format follows its extension; a missing file is skipped.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                other => {
                    return Err(ConfigError::InvalidValue {
                        field: "settings".to_string(),
                        hint: Some(format!(
                            "unsupported settings format: {}",
                            other.unwrap_or("<none>")
                        )),
                    });
                }
            };
        }

        // SATCHEL_BASE_URI, SATCHEL_PUBLIC_DIR, ...
        figment = figment.merge(Env::prefixed("SATCHEL_"));

        figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "settings".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Resolve every directory against `base`, leaving absolute paths alone.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        for dir in [
            &mut self.source_root,
            &mut self.config_dir,
            &mut self.storage_dir,
            &mut self.public_dir,
        ] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        self
    }
}
