pub mod archive_source;
pub mod callback;
pub mod cdn;
pub mod identity;
pub mod object_store;
