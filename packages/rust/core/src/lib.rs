//! The stackbind binding pipeline.
//!
//! Binds content-store entries to a site build's file descriptors:
//! - [`pipeline`] — the end-to-end `bind` entry point and [`BindOptions`]
//! - [`validate`] — pre-query credential/selector validation
//! - [`hooks`] — user-registered entry and post hooks
//! - [`naming`] — output path derivation for fanned-out entries
//! - [`expand`] — single/list/fan-out binding modes
//! - [`partials`] — shared partial content fetched once per build
//! - [`reconcile`] — removal of layout-less query descriptors

pub mod expand;
pub mod hooks;
pub mod naming;
pub mod partials;
pub mod pipeline;
pub mod reconcile;
pub mod validate;

pub use hooks::{EntryHook, HookRegistry, PostHook};
pub use pipeline::{BindOptions, bind};

// The shared domain types are half the public API; re-export them so
// orchestrators depend on one crate.
pub use stackbind_shared::{
    AppConfig, BindError, Binding, Credentials, Entry, FieldMap, FileMap, FilterSet, QuerySpec,
    Result, SiteFile,
};
