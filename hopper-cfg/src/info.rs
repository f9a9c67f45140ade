//  INFO.rs
//    by Lut99
//
//  Created:
//    04 Feb 2025, 14:24:57
//  Last edited:
//    22 May 2025, 09:48:12
//  Auto updated?
//    Yes
//
//  Description:
//!   Provides the [`YamlInfo`] trait, which abstracts over the config
//!   files in this crate and gives them a uniform way of moving between
//!   disk and memory.
//

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;


/***** ERRORS *****/
/// Errors that relate to loading or storing a [`YamlInfo`].
#[derive(Debug, Error)]
pub enum YamlError {
    /// Failed to read the file from disk.
    #[error("Failed to read file '{}'", path.display())]
    FileRead { path: PathBuf, source: std::io::Error },
    /// The file was there but did not parse as the requested config.
    #[error("Failed to parse file '{}' as YAML", path.display())]
    FileParse { path: PathBuf, source: serde_yaml::Error },
    /// Failed to serialize the config itself.
    #[error("Failed to serialize {what} to YAML")]
    Serialize { what: &'static str, source: serde_yaml::Error },
    /// Failed to write the serialized config to disk.
    #[error("Failed to write file '{}'", path.display())]
    FileWrite { path: PathBuf, source: std::io::Error },
}





/***** LIBRARY *****/
/// Abstracts over the config files in this crate.
///
/// Everything that is [`Serialize`] + [`DeserializeOwned`] gets disk round-tripping for free by
/// implementing this trait.
pub trait YamlInfo: DeserializeOwned + Serialize {
    /// Parses this config from a YAML string.
    ///
    /// # Arguments
    /// - `raw`: The string to parse.
    ///
    /// # Errors
    /// This function errors if `raw` was not valid YAML for this config. The path in the error is
    /// the conventional `<string>`.
    #[inline]
    fn from_string(raw: impl AsRef<str>) -> Result<Self, YamlError> {
        serde_yaml::from_str(raw.as_ref()).map_err(|source| YamlError::FileParse { path: PathBuf::from("<string>"), source })
    }

    /// Reads this config from the given path.
    ///
    /// # Arguments
    /// - `path`: The path to read from.
    ///
    /// # Errors
    /// This function errors if the file could not be read, or did not parse as this config.
    fn from_path(path: impl AsRef<Path>) -> Result<Self, YamlError> {
        let path: &Path = path.as_ref();
        let raw: String = fs::read_to_string(path).map_err(|source| YamlError::FileRead { path: path.into(), source })?;
        serde_yaml::from_str(&raw).map_err(|source| YamlError::FileParse { path: path.into(), source })
    }

    /// Serializes this config to a YAML string.
    ///
    /// # Errors
    /// This function errors if the config failed to serialize.
    #[inline]
    fn to_string(&self) -> Result<String, YamlError> {
        serde_yaml::to_string(self).map_err(|source| YamlError::Serialize { what: std::any::type_name::<Self>(), source })
    }

    /// Writes this config to the given path.
    ///
    /// # Arguments
    /// - `path`: The path to write to.
    ///
    /// # Errors
    /// This function errors if the config failed to serialize or the file could not be written.
    fn to_path(&self, path: impl AsRef<Path>) -> Result<(), YamlError> {
        let path: &Path = path.as_ref();
        let raw: String = self.to_string()?;
        fs::write(path, raw).map_err(|source| YamlError::FileWrite { path: path.into(), source })
    }
}
