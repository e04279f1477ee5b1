pub trait IdentityLookup {
    /// Returns `Ok(None)` when the app client has no secret.
    fn client_secret(&self, user_pool_id: &str, client_id: &str) -> Result<Option<String>, String>;
}
