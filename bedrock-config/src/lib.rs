use log::warn;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub mod compression;
pub mod limits;
pub mod logging;

pub use compression::CompressionConfig;
pub use limits::{ItemConfig, LimitsConfig};
pub use logging::{LogLevel, LoggingConfig};

const CONFIG_ROOT_FOLDER: &str = "config/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't access {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("couldn't parse config at {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Settings shared by everything that reads or writes the wire format.
#[derive(Deserialize, Serialize, Default, Clone, Debug)]
#[serde(default)]
pub struct CodecConfiguration {
    pub logging: LoggingConfig,
    pub compression: CompressionConfig,
    pub limits: LimitsConfig,
    pub items: ItemConfig,
}

pub trait LoadConfiguration {
    /// Loads the configuration below `exec_dir`, writing the defaults there first if no
    /// file exists yet.
    fn load(exec_dir: &Path) -> Result<Self, ConfigError>
    where
        Self: Sized + Default + Serialize + DeserializeOwned,
    {
        let config_dir = exec_dir.join(CONFIG_ROOT_FOLDER);
        if !config_dir.exists() {
            log::debug!("creating new config root folder");
            fs::create_dir_all(&config_dir).map_err(|source| ConfigError::Io {
                path: config_dir.clone(),
                source,
            })?;
        }
        let path = config_dir.join(Self::get_path());

        let config = if path.exists() {
            let file_content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;

            toml::from_str(&file_content).map_err(|err| ConfigError::Parse {
                path: path.clone(),
                message: err.message().to_string(),
            })?
        } else {
            let content = Self::default();

            match toml::to_string(&content) {
                Ok(text) => {
                    if let Err(err) = fs::write(&path, text) {
                        warn!("Couldn't write default config to {:?}. Reason: {}", &path, err);
                    }
                }
                Err(err) => warn!("Couldn't serialize default config. Reason: {err}"),
            }

            content
        };

        config.validate()?;
        Ok(config)
    }

    fn get_path() -> &'static Path;

    fn validate(&self) -> Result<(), ConfigError>;
}

impl LoadConfiguration for CodecConfiguration {
    fn get_path() -> &'static Path {
        Path::new("codec.toml")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let compression = &self.compression;
        if compression.level > 9 {
            return Err(ConfigError::Invalid {
                field: "compression.level",
                reason: format!("{} is not in 0..=9", compression.level),
            });
        }
        if !compression::KNOWN_IDS.contains(&compression.algorithm) {
            return Err(ConfigError::Invalid {
                field: "compression.algorithm",
                reason: format!("unknown compression id {}", compression.algorithm),
            });
        }
        if compression.max_decompressed_size == 0 {
            return Err(ConfigError::Invalid {
                field: "compression.max_decompressed_size",
                reason: "must be positive".to_string(),
            });
        }
        if self.limits.max_slice_length == 0 {
            return Err(ConfigError::Invalid {
                field: "limits.max_slice_length",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
