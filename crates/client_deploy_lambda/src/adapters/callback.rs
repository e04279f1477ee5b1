pub trait CallbackSender {
    /// PUTs `body` to the presigned callback URL and returns the HTTP status.
    fn put(&self, url: &str, body: &[u8]) -> Result<u16, String>;
}
