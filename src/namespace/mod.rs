//! Namespace projection: the filesystem-shaped view of a normalized export
//!
//! - [`tree`] - The ordered [`Namespace`] / [`Entry`] tree and its materialization to disk
//! - [`documents`] - `_metadata.json` and `_index.json` document types
//! - [`builder`] - Projection of a [`ChatExport`](crate::models::ChatExport) onto a tree
//!
//! Projection has no failure paths; only writing to disk can fail.

pub mod builder;
pub mod documents;
pub mod tree;

pub use builder::{ProjectionOptions, build_namespace, build_namespace_at, conversation_dir_name};
pub use tree::{Entry, MaterializeStats, Namespace};
