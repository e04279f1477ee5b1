use std::path::{Component, Path};

/// Content type used when the extension is unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "binary/octet-stream";

/// Joins a tree-relative path under `prefix` as a `/`-separated object key.
/// Returns `None` for paths that are empty or climb out of the tree.
pub fn object_key(prefix: &str, relative_path: &Path) -> Option<String> {
    let mut segments: Vec<String> = prefix
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();
    let prefix_len = segments.len();

    for component in relative_path.components() {
        match component {
            Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if segments.len() == prefix_len {
        return None;
    }
    Some(segments.join("/"))
}

pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}
