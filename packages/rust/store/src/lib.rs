//! Content store access for stackbind.
//!
//! This crate provides:
//! - [`StackClient`] — a Contentstack-compatible Content Delivery API client
//! - [`registry`] — the process-wide, credential-keyed client cache
//! - [`Query`] / [`build_filters`] — named-operation query building and the
//!   global/file filter merge

pub mod client;
pub mod query;
pub mod registry;

pub use client::StackClient;
pub use query::{Query, build_filters};
pub use registry::client_for;
