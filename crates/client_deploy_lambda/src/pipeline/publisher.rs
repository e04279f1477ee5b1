use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::adapters::object_store::ObjectStore;
use crate::error::DeployError;
use crate::runtime::object_keys::{content_type_for, object_key};

/// Upper bound of keys per delete request accepted by the storage API.
pub const DELETE_BATCH_SIZE: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub key: String,
    pub content_type: String,
}

/// Deletes every object in `bucket`. An empty bucket is a no-op.
pub fn clean_bucket(store: &dyn ObjectStore, bucket: &str) -> Result<usize, DeployError> {
    let mut keys = Vec::new();
    let mut continuation_token: Option<String> = None;
    loop {
        let page = store
            .list_objects(bucket, continuation_token.as_deref())
            .map_err(|error| DeployError::Upload(format!("failed to list {bucket}: {error}")))?;
        keys.extend(page.keys);
        match page.next_token {
            Some(token) => continuation_token = Some(token),
            None => break,
        }
    }

    for batch in keys.chunks(DELETE_BATCH_SIZE) {
        store
            .delete_objects(bucket, batch)
            .map_err(|error| {
                DeployError::Upload(format!("failed to delete from {bucket}: {error}"))
            })?;
    }

    info!(
        component = "bucket_publisher",
        event = "bucket_cleaned",
        bucket,
        deleted = keys.len(),
    );
    Ok(keys.len())
}

/// Uploads every regular file under `root_dir`, keyed by its relative path
/// under `prefix`. A failed file does not stop its siblings, but any failure
/// fails the call.
pub fn upload_all(
    store: &dyn ObjectStore,
    bucket: &str,
    root_dir: &Path,
    prefix: &str,
) -> Result<Vec<UploadedObject>, DeployError> {
    let files = collect_files(root_dir).map_err(|error| {
        DeployError::Upload(format!("failed to walk {}: {error}", root_dir.display()))
    })?;

    let mut uploaded = Vec::with_capacity(files.len());
    let mut failures = Vec::new();
    for path in &files {
        let Some(key) = path
            .strip_prefix(root_dir)
            .ok()
            .and_then(|relative| object_key(prefix, relative))
        else {
            failures.push(format!("{}: no object key", path.display()));
            continue;
        };
        let content_type = content_type_for(path);

        match store.put_file(bucket, &key, path, &content_type) {
            Ok(()) => uploaded.push(UploadedObject { key, content_type }),
            Err(message) => {
                error!(
                    component = "bucket_publisher",
                    event = "upload_failed",
                    bucket,
                    key = %key,
                    error = %message,
                );
                failures.push(format!("{key}: {message}"));
            }
        }
    }

    if let Some(first) = failures.first() {
        return Err(DeployError::Upload(format!(
            "{} of {} files failed to upload, first: {first}",
            failures.len(),
            files.len()
        )));
    }

    info!(
        component = "bucket_publisher",
        event = "upload_finished",
        bucket,
        objects = uploaded.len(),
    );
    Ok(uploaded)
}

/// Depth-first listing of regular files. Symlinks are not followed.
fn collect_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut files = Vec::new();
    for entry in entries {
        let file_type = entry.file_type()?;
        let path = entry.path();
        if file_type.is_dir() {
            files.extend(collect_files(&path)?);
        } else if file_type.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
