/// `archive` subcommand.
mod archive;

/// `app build` subcommand.
mod build;

/// `app deploy` subcommand.
mod deploy;

/// `login` subcommand.
mod login;

pub(crate) use archive::archive;
pub(crate) use build::build;
pub(crate) use deploy::deploy;
pub(crate) use login::login;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// CLI configuration.
#[derive(Parser)]
#[command(about, version)]
pub(crate) struct Cli {
    /// Configuration file path, defaults to `~/.paas/config.toml`.
    #[arg(short, long, global = true)]
    pub config_file: Option<PathBuf>,

    /// Selected subcommand.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Store the API server address and the authentication token.
    Login(Login),

    /// Create a deployment archive locally, without uploading it.
    Archive(Archive),

    /// Application management.
    #[command(subcommand)]
    App(AppCommands),
}

/// `app` subcommands.
#[derive(Subcommand)]
pub(crate) enum AppCommands {
    /// Build an application image without deploying it.
    Build(Build),

    /// Deploy an application from files, a container file or an image.
    Deploy(Deploy),
}

/// `login` subcommand configuration.
#[derive(Args)]
pub struct Login {
    /// API server address, for example `https://paas.example.com`.
    target: String,

    /// Authentication token.
    #[arg(short, long)]
    token: String,
}

/// `archive` subcommand configuration.
#[derive(Args)]
pub struct Archive {
    /// Path where to write the gzip-compressed tar archive.
    #[arg(short, long, default_value = "archive.tar.gz")]
    output: PathBuf,

    /// Store every file by its base name and skip directory entries.
    #[arg(short, long)]
    files_only: bool,

    /// Files with patterns used to exclude entries, defaults to `.paasignore`.
    #[arg(short, long)]
    ignore_file: Vec<PathBuf>,

    /// Files and directories to archive.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

/// `app build` subcommand configuration.
#[derive(Args)]
pub struct Build {
    /// Application name.
    #[arg(short, long)]
    app: String,

    /// Image tag.
    #[arg(short, long)]
    tag: String,

    /// Store every file by its base name and skip directory entries.
    #[arg(short, long)]
    files_only: bool,

    /// Files and directories to build from.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

/// `app deploy` subcommand configuration.
#[derive(Args)]
pub struct Deploy {
    /// Application name.
    #[arg(short, long)]
    app: String,

    /// Container image to deploy instead of local files.
    #[arg(short, long)]
    image: Option<String>,

    /// Deploy message.
    #[arg(short, long)]
    message: Option<String>,

    /// Container file, or a directory to look for one in.
    #[arg(short, long)]
    dockerfile: Option<PathBuf>,

    /// Store every file by its base name and skip directory entries.
    #[arg(short, long)]
    files_only: bool,

    /// Files and directories to deploy.
    paths: Vec<PathBuf>,
}
