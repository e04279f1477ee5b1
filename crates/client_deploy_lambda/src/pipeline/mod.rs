//! Deployment pipeline steps, each a thin function over an adapter seam.

pub mod archive;
pub mod config_injector;
pub mod publisher;
pub mod purger;
pub mod reporter;
