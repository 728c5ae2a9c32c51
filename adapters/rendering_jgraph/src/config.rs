use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an optional TOML file with a [`RenderConfig`].
pub const RENDER_CONFIG_ENV: &str = "TILEFALL_RENDER_CONFIG";

/// Programs and settings used by the render pipeline.
///
/// Every field is optional in TOML; missing fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Program that turns jgraph scripts into postscript.
    pub jgraph: String,
    /// Program that rasterises postscript into the output image.
    pub convert: String,
    /// Rasterisation density in dots per inch.
    pub density: u32,
    /// JPEG quality passed to `convert`.
    pub quality: u32,
    /// Image written after every turn.
    pub output: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            jgraph: "jgraph".to_owned(),
            convert: "convert".to_owned(),
            density: 300,
            quality: 100,
            output: PathBuf::from("gameOutput.jpg"),
        }
    }
}

/// Errors raised while loading a [`RenderConfig`].
#[derive(Debug, Error)]
pub enum RenderConfigError {
    /// The configuration file could not be read.
    #[error("failed to read render config at {}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse render config")]
    Parse(#[from] toml::de::Error),
}

impl RenderConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, RenderConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses the configuration file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RenderConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| RenderConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Loads the file named by [`RENDER_CONFIG_ENV`], or the defaults when the
    /// variable is unset.
    pub fn from_env() -> Result<Self, RenderConfigError> {
        match std::env::var_os(RENDER_CONFIG_ENV) {
            Some(path) if !path.is_empty() => {
                log::info!("loading render config from {}", Path::new(&path).display());
                Self::from_path(path)
            }
            _ => Ok(Self::default()),
        }
    }
}
