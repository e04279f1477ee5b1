use std::fs;
use std::path::Path;

use tracing::info;
use zip::ZipArchive;

use crate::adapters::archive_source::ArchiveSource;
use crate::error::DeployError;

/// Downloads the archive at `url` and extracts it into a freshly emptied
/// `contents_dir`. Returns the number of archive entries.
pub fn fetch_and_extract(
    source: &dyn ArchiveSource,
    url: &str,
    contents_dir: &Path,
) -> Result<usize, DeployError> {
    reset_dir(contents_dir)?;

    let staging_dir = contents_dir
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let archive_file = tempfile::Builder::new()
        .prefix("client-archive-")
        .suffix(".zip")
        .tempfile_in(staging_dir)
        .map_err(|error| DeployError::Fetch(format!("failed to create archive file: {error}")))?;

    source
        .download(url, archive_file.path())
        .map_err(|error| DeployError::Fetch(format!("failed to download archive: {error}")))?;
    info!(
        component = "archive_fetcher",
        event = "download_finished",
        url
    );

    let reader = archive_file
        .reopen()
        .map_err(|error| DeployError::Fetch(format!("failed to open archive: {error}")))?;
    let mut archive = ZipArchive::new(reader)
        .map_err(|error| DeployError::Fetch(format!("unreadable archive: {error}")))?;
    let entries = archive.len();
    archive
        .extract(contents_dir)
        .map_err(|error| DeployError::Fetch(format!("failed to extract archive: {error}")))?;

    info!(
        component = "archive_fetcher",
        event = "extract_finished",
        entries,
        contents_dir = %contents_dir.display(),
    );
    Ok(entries)
}

fn reset_dir(dir: &Path) -> Result<(), DeployError> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|error| {
            DeployError::Fetch(format!(
                "failed to clear scratch directory {}: {error}",
                dir.display()
            ))
        })?;
    }
    fs::create_dir_all(dir).map_err(|error| {
        DeployError::Fetch(format!(
            "failed to create scratch directory {}: {error}",
            dir.display()
        ))
    })
}
