use std::path::PathBuf;

use derive_more::{Display, Error, From};
use reqwest::blocking::{multipart::Form, Client};
use tracing::debug;

use crate::{
    commands::Deploy,
    config::{ClientConfig, ClientConfigError},
    container_file::{ContainerFile, ContainerFileError},
    upload::{self, UploadError},
};

/// `app deploy` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum DeployError {
    /// Client configuration error.
    ClientConfig(ClientConfigError),

    /// Container file could not be resolved.
    ContainerFile(ContainerFileError),

    /// Archive upload error.
    Upload(UploadError),

    /// Image deploys do not accept local files.
    #[display(fmt = "you can't deploy files and docker image at the same time")]
    ConflictingSources,

    /// Neither files, a container file nor an image were provided.
    #[display(
        fmt = "you should provide at least one file, a container file or a docker image to deploy"
    )]
    NothingToDeploy,
}

/// Where the deployed application comes from.
#[derive(Debug, PartialEq, Eq)]
enum Source {
    /// Prebuilt container image.
    Image(String),

    /// Local files, optionally built with a container file.
    Files {
        /// Container file path or a directory containing one.
        dockerfile: Option<PathBuf>,

        /// Paths to archive.
        paths: Vec<PathBuf>,
    },
}

impl Source {
    /// Validate the combination of deployment arguments.
    fn new(
        image: Option<String>,
        dockerfile: Option<PathBuf>,
        paths: Vec<PathBuf>,
    ) -> Result<Self, DeployError> {
        match (image, dockerfile, paths.is_empty()) {
            (Some(image), None, true) => Ok(Source::Image(image)),
            (Some(_), _, _) => Err(DeployError::ConflictingSources),
            (None, None, true) => Err(DeployError::NothingToDeploy),
            (None, dockerfile, _) => Ok(Source::Files { dockerfile, paths }),
        }
    }
}

/// Deploy flow entrypoint.
pub(crate) fn deploy(
    Deploy {
        app,
        image,
        message,
        dockerfile,
        files_only,
        paths,
    }: Deploy,
    config: &ClientConfig,
) -> Result<(), DeployError> {
    let source = Source::new(image, dockerfile, paths)?;

    let client = Client::new();
    let progress = upload::spinner();

    upload::ensure_app_exists(&client, config, &app, &progress)?;

    let request = client
        .post(config.url(&format!("/apps/{app}/deploy"))?)
        .bearer_auth(config.token()?);

    match source {
        Source::Image(image) => {
            debug!(%image, "deploying image");

            let mut fields = vec![("origin", String::from("image")), ("image", image)];

            if let Some(message) = message {
                fields.push(("message", message));
            }

            progress.set_message("Deploying image...");

            upload::send(request.form(&fields), &progress)?;
        }
        Source::Files { dockerfile, paths } => {
            let container_file = dockerfile
                .map(|path| ContainerFile::resolve(&app, &path))
                .transpose()?;

            let paths = match &container_file {
                Some(container_file) if paths.is_empty() => vec![container_file.context_dir()],
                _ => paths,
            };

            let archive_file = upload::create_archive(files_only, &paths, None, &progress)?;

            let mut form = Form::new();

            form = match container_file {
                Some(container_file) => form
                    .text("origin", "dockerfile")
                    .text("dockerfile", container_file.contents),
                None => form.text("origin", "app-deploy"),
            };

            if let Some(message) = message {
                form = form.text("message", message);
            }

            let form = upload::attach_archive(form, &archive_file, &progress)?;

            upload::send(request.multipart(form), &progress)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{deploy, DeployError, Source};
    use crate::{commands::Deploy, config::ClientConfig};

    #[test]
    fn image_source() {
        assert_eq!(
            Source::new(Some(String::from("nginx:latest")), None, Vec::new()).unwrap(),
            Source::Image(String::from("nginx:latest"))
        );
    }

    #[test]
    fn file_sources() {
        assert_eq!(
            Source::new(None, None, vec![PathBuf::from(".")]).unwrap(),
            Source::Files {
                dockerfile: None,
                paths: vec![PathBuf::from(".")],
            }
        );
        assert_eq!(
            Source::new(None, Some(PathBuf::from("Dockerfile")), Vec::new()).unwrap(),
            Source::Files {
                dockerfile: Some(PathBuf::from("Dockerfile")),
                paths: Vec::new(),
            }
        );
    }

    #[test]
    fn conflicting_sources() {
        assert!(matches!(
            Source::new(Some(String::from("nginx")), None, vec![PathBuf::from(".")]),
            Err(DeployError::ConflictingSources)
        ));
        assert!(matches!(
            Source::new(
                Some(String::from("nginx")),
                Some(PathBuf::from("Dockerfile")),
                Vec::new()
            ),
            Err(DeployError::ConflictingSources)
        ));
    }

    #[test]
    fn nothing_to_deploy() {
        let result = deploy(
            Deploy {
                app: String::from("web"),
                image: None,
                message: None,
                dockerfile: None,
                files_only: false,
                paths: Vec::new(),
            },
            &ClientConfig::default(),
        );

        assert!(matches!(result, Err(DeployError::NothingToDeploy)));
    }
}
