use derive_more::{Display, Error, From};
use reqwest::blocking::{multipart::Form, Client};

use crate::{
    commands::Build,
    config::{ClientConfig, ClientConfigError},
    upload::{self, UploadError},
};

/// API version of the build endpoint.
const BUILD_API_VERSION: &str = "1.5";

/// `app build` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum BuildError {
    /// Client configuration error.
    ClientConfig(ClientConfigError),

    /// Archive upload error.
    Upload(UploadError),

    /// Image tag is empty.
    #[display(fmt = "image tag cannot be empty")]
    EmptyTag,
}

/// Build flow entrypoint.
pub(crate) fn build(
    Build {
        app,
        tag,
        files_only,
        paths,
    }: Build,
    config: &ClientConfig,
) -> Result<(), BuildError> {
    if tag.trim().is_empty() {
        return Err(BuildError::EmptyTag);
    }

    let client = Client::new();
    let progress = upload::spinner();

    upload::ensure_app_exists(&client, config, &app, &progress)?;

    let archive_file = upload::create_archive(files_only, &paths, None, &progress)?;
    let form = upload::attach_archive(Form::new().text("tag", tag), &archive_file, &progress)?;

    let request = client
        .post(config.versioned_url(BUILD_API_VERSION, &format!("/apps/{app}/build"))?)
        .bearer_auth(config.token()?)
        .multipart(form);

    upload::send(request, &progress)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{build, BuildError};
    use crate::{commands::Build, config::ClientConfig};

    #[test]
    fn empty_tag_is_rejected_before_any_request() {
        let config = ClientConfig::default();

        let result = build(
            Build {
                app: String::from("web"),
                tag: String::from("  "),
                files_only: false,
                paths: vec![PathBuf::from(".")],
            },
            &config,
        );

        assert!(matches!(result, Err(BuildError::EmptyTag)));
    }
}
