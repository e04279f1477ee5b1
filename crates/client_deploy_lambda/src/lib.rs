//! AWS-oriented adapters and handlers for the client deployment custom resource.
//!
//! This crate owns runtime integration details (the lifecycle handler, the
//! deployment pipeline, and provider adapter seams) and exposes a single
//! runtime module boundary for contract, lifecycle plan, and object key
//! primitives.

pub mod adapters;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod runtime;
