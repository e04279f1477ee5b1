pub use client_deploy_core::{client_config, contract, lifecycle, object_keys, settings};
