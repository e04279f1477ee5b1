use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    pub next_token: Option<String>,
}

pub trait ObjectStore {
    fn put_file(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
        content_type: &str,
    ) -> Result<(), String>;

    fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, String>;

    /// Deletes up to 1000 keys in one request.
    fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), String>;
}
