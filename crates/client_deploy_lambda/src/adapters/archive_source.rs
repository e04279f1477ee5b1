use std::path::Path;

pub trait ArchiveSource {
    /// Writes the archive at `url` to `destination`, replacing its contents.
    fn download(&self, url: &str, destination: &Path) -> Result<(), String>;
}
