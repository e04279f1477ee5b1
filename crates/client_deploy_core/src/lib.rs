//! Shared client deployment domain primitives.
//!
//! This crate owns the custom-resource contract, the lifecycle step plan, and
//! the deterministic naming rules for published objects. It intentionally
//! excludes AWS SDK and Lambda runtime concerns.

pub mod client_config;
pub mod contract;
pub mod lifecycle;
pub mod object_keys;
pub mod settings;
