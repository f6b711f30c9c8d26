//! chat-ffs - Turn chat service exports into a mountable filesystem tree
//!
//! This library reads the data-export archives of chat services and projects them onto a
//! nested name -> text tree that a FUSE-style mounter can expose as directories and files.
//! It supports:
//!
//! - Flat `chat_messages` exports, including projects, project documents and memories
//! - Branching `mapping` exports, linearized along the first-child path
//! - Provider auto-detection on ZIP files and extracted export directories
//! - Deterministic projection with `_metadata.json` / `_index.json` documents
//!
//! # Example
//!
//! ```no_run
//! use chat_ffs::{Archive, Provider, ProjectionOptions, build_namespace};
//! use std::path::Path;
//!
//! let archive = Archive::open(Path::new("export.zip"))?;
//! let provider = Provider::detect_in(&archive).expect("unknown export format");
//! let export = provider.load(&archive);
//! let namespace = build_namespace(&export, &ProjectionOptions::default());
//! namespace.materialize(Path::new("chats"))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod models;
pub mod namespace;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use models::{ChatExport, Conversation, Provider};
pub use namespace::{Namespace, ProjectionOptions, build_namespace, build_namespace_at};
pub use parsers::Archive;
pub use utils::slugify;
