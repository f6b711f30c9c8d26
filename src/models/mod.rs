//! Normalized data model shared by every export provider.
//!
//! - [`Conversation`] - One chat thread with its messages in rendering order
//! - [`Message`] / [`Attachment`] - Individual turns and their file metadata
//! - [`Project`] / [`ProjectDoc`] - Project records with attached documents
//! - [`Memories`] - Free-text memory blobs keyed by project identifier
//! - [`ChatExport`] - Everything parsed from a single archive
//!
//! Entities are built once by a parser and never mutated afterwards; the namespace
//! projector consumes them by reference.

pub mod conversation;
pub mod export;
pub mod memories;
pub mod project;

pub use conversation::{Attachment, Conversation, Message, Provider, Role};
pub use export::{ChatExport, ExportStats};
pub use memories::Memories;
pub use project::{Project, ProjectDoc};
