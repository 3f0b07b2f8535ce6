//! Application settings.
//!
//! Precedence, lowest to highest: built-in defaults, the TOML file
//! (`--config` or `playforge.toml` in the working directory), then
//! `PLAYFORGE__*` environment variables with `__` separating nested keys,
//! e.g. `PLAYFORGE__LLM__API_KEY`.

use crate::logging::LoggingSettings;
use config::{Config, Environment, File, FileFormat};
use playforge_error::{Error, ErrorKind, Result};
use playforge_llm::LlmSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PREFIX: &str = "PLAYFORGE";
pub const DEFAULT_CONFIG_FILE: &str = "playforge.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppSettings {
    /// Load settings; an explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let file = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::new(
                        ErrorKind::FileNotFound,
                        format!("config file not found: {}", path.display()),
                    )
                    .with_operation("settings::load"));
                }
                File::from(path).format(FileFormat::Toml).required(true)
            }
            None => File::from(Path::new(DEFAULT_CONFIG_FILE))
                .format(FileFormat::Toml)
                .required(false),
        };

        let settings: AppSettings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(prefix).separator("__").try_parsing(true))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| {
                Error::config_invalid(format!("failed to load settings: {}", e))
                    .with_operation("settings::load")
                    .set_source(e)
            })?;

        settings.llm.validate()?;
        Ok(settings)
    }
}
