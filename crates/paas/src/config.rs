use std::{
    fs, io,
    path::{Path, PathBuf},
};

use common::config::Logging;
use derive_more::{Display, Error, From};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// Client configuration errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum ClientConfigError {
    /// Unable to load the configuration using [`figment`].
    Figment(figment::Error),

    /// IO-related error.
    Io(io::Error),

    /// Unable to parse the existing configuration file using [`toml`] crate.
    TomlParse(toml::de::Error),

    /// Unable to serialize the configuration using [`toml`] crate.
    Toml(toml::ser::Error),

    /// User's home directory cannot be determined.
    #[display(fmt = "unable to find home directory")]
    HomeDirNotFound,

    /// No target or token was stored yet.
    #[display(fmt = "not logged in, run `paas login` first")]
    NotLoggedIn,
}

/// Client configuration, stored in `~/.paas/config.toml`.
#[derive(Default, Deserialize)]
pub(crate) struct ClientConfig {
    /// API server address.
    target: Option<String>,

    /// Authentication token.
    token: Option<String>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: Logging,
}

impl ClientConfig {
    /// Load the configuration from the provided file, or from the default location,
    /// merged with `PAAS_`-prefixed environment variables.
    ///
    /// Nested keys are separated with an underscore, so `PAAS_LOGGING_LEVEL`
    /// sets `logging.level`.
    pub(crate) fn new(path: Option<&Path>) -> Result<Self, ClientConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        Ok(Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("PAAS_").split("_"))
            .extract()?)
    }

    /// Store target and token in the configuration file, keeping every other key intact.
    pub(crate) fn write_credentials(
        path: Option<&Path>,
        target: &str,
        token: &str,
    ) -> Result<(), ClientConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        let mut table = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str::<toml::Table>(&contents)?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => toml::Table::new(),
            Err(error) => return Err(error.into()),
        };

        table.insert(String::from("target"), toml::Value::from(target));
        table.insert(String::from("token"), toml::Value::from(token));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, toml::to_string(&table)?)?;

        Ok(())
    }

    /// Authentication token.
    pub(crate) fn token(&self) -> Result<&str, ClientConfigError> {
        self.token
            .as_deref()
            .ok_or(ClientConfigError::NotLoggedIn)
    }

    /// Full URL of an unversioned API endpoint.
    pub(crate) fn url(&self, path: &str) -> Result<String, ClientConfigError> {
        let target = self
            .target
            .as_deref()
            .ok_or(ClientConfigError::NotLoggedIn)?;

        Ok(format!("{}{path}", target.trim_end_matches('/')))
    }

    /// Full URL of an API endpoint under the provided version prefix.
    pub(crate) fn versioned_url(&self, version: &str, path: &str) -> Result<String, ClientConfigError> {
        self.url(&format!("/{version}{path}"))
    }

    /// Get client configuration storage path.
    ///
    /// Returns [`Err`] if home directory cannot be determined.
    fn config_path() -> Result<PathBuf, ClientConfigError> {
        let mut home_dir = home::home_dir().ok_or(ClientConfigError::HomeDirNotFound)?;
        home_dir.push(".paas/config.toml");
        Ok(home_dir)
    }
}
