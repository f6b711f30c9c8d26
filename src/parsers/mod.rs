//! Archive readers for the supported chat export schemas
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach:
//!
//! - **Record-level failures**: A conversation, message, project, document or attachment
//!   that is malformed or missing a required field is logged at `warn` and skipped. The rest
//!   of the batch is still parsed.
//!
//! - **Archive-level failures**: An unreadable archive, an undecodable aggregate file or a
//!   wrong top-level JSON type is logged at `error` and produces an empty result.
//!
//! - **Error propagation**: Internal steps return `anyhow::Result` with context. The
//!   [`Provider`](crate::models::Provider) methods are the boundary where those errors turn
//!   into log events, so detection and parsing never fail from the caller's point of view.
//!
//! An export that yields zero conversations is therefore a normal result; the CLI reports it
//! to the user instead of crashing.

pub mod archive;
pub mod chatgpt;
pub mod claude;
pub mod deserializers;
pub mod message_tree;
pub mod provider;

use anyhow::Result;
use serde_json::Value;
use tracing::{error, info, warn};

pub use archive::Archive;
pub use message_tree::{MessageTree, TreeNode};

/// Aggregate conversation list shared by both schemas
pub const CONVERSATIONS_FILE: &str = "conversations.json";
pub const PROJECTS_FILE: &str = "projects.json";
pub const MEMORIES_FILE: &str = "memories.json";

/// Decode a root member that must hold a JSON array
///
/// Archive-level failures are logged and reported as `None`.
fn decode_record_list(archive: &Archive, name: &str) -> Option<Vec<Value>> {
    match archive.read_json(name) {
        Ok(Value::Array(items)) => Some(items),
        Ok(_) => {
            error!("{} is not a list, ignoring it", name);
            None
        }
        Err(e) => {
            error!("Failed to read {}: {:#}", name, e);
            None
        }
    }
}

/// Parse each element independently, skipping the ones that fail
///
/// `parse` returns `Ok(None)` for records it already logged as skipped, and `Err` for
/// structural problems that are logged here.
fn parse_records<T, F>(items: Vec<Value>, kind: &str, mut parse: F) -> Vec<T>
where
    F: FnMut(Value, &str) -> Result<Option<T>>,
{
    let total = items.len();
    let mut records = Vec::with_capacity(total);

    for (index, item) in items.into_iter().enumerate() {
        let source = format!("#{}", index);
        match parse(item, &source) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => warn!("Skipping {} {}: {:#}", kind, source, e),
        }
    }

    let skipped = total - records.len();
    if skipped > 0 {
        info!("Parsed {} {} record(s), skipped {}", records.len(), kind, skipped);
    }
    records
}
