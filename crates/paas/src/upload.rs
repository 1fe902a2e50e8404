use std::{
    io::{self, Read, Write},
    path::Path,
    time::Duration,
};

use archiver::{build_archive, ArchiveOptions, ArchiverError};
use byte_unit::Byte;
use derive_more::{Display, Error, From};
use indicatif::ProgressBar;
use reqwest::blocking::{
    multipart::{Form, Part},
    Client, RequestBuilder,
};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::{ClientConfig, ClientConfigError};

/// Name under which the archive is uploaded.
const ARCHIVE_FILE_NAME: &str = "archive.tar.gz";

/// Response suffix the server sends once the operation has completed.
const SUCCESS_MARKER: &[u8] = b"\nOK\n";

/// Upload process errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum UploadError {
    /// IO-related error.
    Io(io::Error),

    /// HTTP client error.
    Http(reqwest::Error),

    /// Client configuration error.
    ClientConfig(ClientConfigError),

    /// Archive could not be created.
    #[display(fmt = "unable to create archive: {}", _0)]
    Archiver(ArchiverError),

    /// Server output did not finish with a success marker.
    #[display(fmt = "command aborted, the server did not confirm the operation")]
    Aborted,
}

/// Spinner used by the remote commands.
pub(crate) fn spinner() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.enable_steady_tick(Duration::from_millis(150));
    progress
}

/// Ensure that the application exists before any archive is built.
pub(crate) fn ensure_app_exists(
    client: &Client,
    config: &ClientConfig,
    app: &str,
    progress: &ProgressBar,
) -> Result<(), UploadError> {
    progress.set_message(format!("Looking up application {app}..."));

    client
        .get(config.url(&format!("/apps/{app}"))?)
        .bearer_auth(config.token()?)
        .send()?
        .error_for_status()?;

    Ok(())
}

/// Archive the provided paths into a temporary file.
///
/// Paths must reside in `working_dir`, which defaults to the current directory.
/// Archiver warnings are printed to stderr above the spinner.
pub(crate) fn create_archive<P: AsRef<Path>>(
    files_only: bool,
    paths: &[P],
    working_dir: Option<&Path>,
    progress: &ProgressBar,
) -> Result<NamedTempFile, UploadError> {
    progress.set_message("Archiving...");

    let mut options = ArchiveOptions::for_upload(ProgressLog::new(progress));
    options.working_dir = working_dir.map(Path::to_path_buf);

    let archive_file = build_archive(NamedTempFile::new()?, files_only, paths, options)?;

    Ok(archive_file)
}

/// Attach the archive to a multipart form as the `file` part.
pub(crate) fn attach_archive(
    form: Form,
    archive_file: &NamedTempFile,
    progress: &ProgressBar,
) -> Result<Form, UploadError> {
    let size = archive_file.as_file().metadata()?.len();

    progress.set_message(format!(
        "Uploading files ({})...",
        Byte::from_bytes(size.into()).get_appropriate_unit(false)
    ));

    info!(size, "uploading archive");

    let part = Part::reader_with_length(archive_file.reopen()?, size)
        .file_name(ARCHIVE_FILE_NAME)
        .mime_str("application/gzip")?;

    Ok(form.part("file", part))
}

/// Send a prepared request and stream the response body to stdout.
///
/// Returns [`UploadError::Aborted`] unless the output ends with the success marker.
pub(crate) fn send(request: RequestBuilder, progress: &ProgressBar) -> Result<(), UploadError> {
    let response = request.send()?.error_for_status()?;

    debug!(status = %response.status(), "upload accepted");

    progress.finish_and_clear();

    let stdout = io::stdout();

    if stream_output(response, &mut stdout.lock())? {
        Ok(())
    } else {
        Err(UploadError::Aborted)
    }
}

/// Copy `reader` into `out`, reporting whether the copied data ends with the success marker.
fn stream_output<R: Read, W: Write>(mut reader: R, out: &mut W) -> io::Result<bool> {
    let mut buf = [0; 8 * 1024];
    let mut tail = Vec::with_capacity(SUCCESS_MARKER.len() * 2);

    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };

        out.write_all(&buf[..read])?;
        out.flush()?;

        tail.extend_from_slice(&buf[..read]);

        if tail.len() > SUCCESS_MARKER.len() {
            tail.drain(..tail.len() - SUCCESS_MARKER.len());
        }
    }

    Ok(tail == SUCCESS_MARKER)
}

/// Line-buffered writer that prints complete lines above a spinner.
struct ProgressLog<'a> {
    /// Spinner to suspend while printing.
    progress: &'a ProgressBar,

    /// Incomplete line.
    buf: Vec<u8>,
}

impl<'a> ProgressLog<'a> {
    /// Create new writer for the provided spinner.
    fn new(progress: &'a ProgressBar) -> Self {
        Self {
            progress,
            buf: Vec::new(),
        }
    }
}

impl Write for ProgressLog<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);

        while let Some(position) = self.buf.iter().position(|byte| *byte == b'\n') {
            let line = self.buf.drain(..=position).collect::<Vec<_>>();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);

            self.progress.suspend(|| eprintln!("{line}"));
        }

        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
