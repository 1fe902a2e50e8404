use std::path::Path;

use derive_more::{Display, Error, From};
use reqwest::Url;
use tracing::info;

use crate::{
    commands::Login,
    config::{ClientConfig, ClientConfigError},
};

/// `login` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum LoginError {
    /// Client configuration error.
    ClientConfig(ClientConfigError),

    /// Target is not a valid URL.
    #[display(fmt = "invalid target address: {}", _0)]
    #[from(ignore)]
    InvalidTarget(#[error(not(source))] String),

    /// Target uses a scheme other than HTTP(S).
    #[display(fmt = "unsupported target scheme: {}", _0)]
    #[from(ignore)]
    UnsupportedScheme(#[error(not(source))] String),
}

/// Login flow entrypoint.
pub(crate) fn login(
    Login { target, token }: Login,
    config_file: Option<&Path>,
) -> Result<(), LoginError> {
    let url = Url::parse(&target).map_err(|error| LoginError::InvalidTarget(error.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(LoginError::UnsupportedScheme(String::from(url.scheme())));
    }

    ClientConfig::write_credentials(config_file, &target, &token)?;

    info!(target = %url, "credentials stored");
    println!("Logged in to {target}.");

    Ok(())
}
