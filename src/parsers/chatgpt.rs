//! Branching `mapping` export schema
//!
//! Each conversation stores its messages as an edit graph keyed by node id. Edits and
//! regenerations add sibling children; only the first-child path is kept.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::archive::Archive;
use super::deserializers::{deserialize_optional_string, deserialize_optional_timestamp};
use super::message_tree::{MessageTree, TreeNode};
use super::{CONVERSATIONS_FILE, decode_record_list, parse_records};
use crate::models::{Conversation, Message, Provider, Role};

const DEFAULT_TITLE: &str = "Untitled";

#[derive(Debug, Deserialize)]
struct RawConversation {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    conversation_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    create_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    mapping: Option<IndexMap<String, RawNode>>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    parent: Option<String>,
    #[serde(default)]
    children: Option<Vec<String>>,
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    id: Option<String>,
    #[serde(default)]
    author: Option<RawAuthor>,
    #[serde(default)]
    content: Option<RawContent>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    create_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(default)]
    parts: Option<Vec<Value>>,
}

impl RawContent {
    /// String fragments joined in order; images and other structured parts are ignored
    fn text(&self) -> String {
        self.parts.iter().flatten().filter_map(Value::as_str).collect()
    }
}

/// Whether the archive holds a branching-schema export
///
/// True when `conversations.json` is a non-empty array whose first record carries a
/// `mapping` object.
pub fn detect(archive: &Archive) -> bool {
    if !archive.contains(CONVERSATIONS_FILE) {
        return false;
    }

    match archive.read_json(CONVERSATIONS_FILE) {
        Ok(Value::Array(items)) => items
            .first()
            .and_then(Value::as_object)
            .is_some_and(|first| first.get("mapping").is_some_and(Value::is_object)),
        Ok(_) => false,
        Err(e) => {
            warn!("Failed to inspect {}: {:#}", CONVERSATIONS_FILE, e);
            false
        }
    }
}

/// Parse and linearize every conversation in `conversations.json`
pub fn parse(archive: &Archive) -> Vec<Conversation> {
    let Some(items) = decode_record_list(archive, CONVERSATIONS_FILE) else {
        return Vec::new();
    };
    parse_records(items, "conversation", parse_conversation)
}

fn parse_conversation(value: Value, source: &str) -> Result<Option<Conversation>> {
    let raw: RawConversation =
        serde_json::from_value(value).context("Unexpected conversation structure")?;

    let id = raw.id.filter(|id| !id.is_empty()).or(raw.conversation_id);
    let Some(id) = id.filter(|id| !id.is_empty()) else {
        warn!("Conversation {} missing id, skipping", source);
        return Ok(None);
    };
    let Some(created_at) = raw.create_time else {
        warn!("Conversation {} missing create_time, skipping", source);
        return Ok(None);
    };

    let tree = build_tree(raw.mapping.unwrap_or_default());
    if !tree.is_empty() && tree.root().is_none() {
        bail!("No root node in mapping of conversation {}", id);
    }

    let messages: Vec<Message> = tree
        .linearize()
        .into_iter()
        .filter_map(|(node_id, message)| convert_message(node_id, message, created_at))
        .collect();

    debug!(
        conversation = %id,
        nodes = tree.len(),
        messages = messages.len(),
        "Linearized conversation"
    );

    Ok(Some(Conversation {
        title: raw.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        updated_at: raw.update_time.unwrap_or(created_at),
        created_at,
        provider: Provider::ChatGpt,
        messages,
        id,
    }))
}

/// Arena of nodes whose payload remembers the owning node id for the message-id fallback
fn build_tree(mapping: IndexMap<String, RawNode>) -> MessageTree<(String, RawMessage)> {
    let nodes = mapping
        .into_iter()
        .map(|(node_id, node)| {
            let tree_node = TreeNode {
                parent: node.parent,
                children: node.children.unwrap_or_default(),
                payload: node.message.map(|message| (node_id.clone(), message)),
            };
            (node_id, tree_node)
        })
        .collect();
    MessageTree::new(nodes)
}

fn convert_message(
    node_id: &str,
    message: &RawMessage,
    conversation_created: DateTime<Utc>,
) -> Option<Message> {
    let role_name = message.author.as_ref().and_then(|a| a.role.as_deref()).unwrap_or_default();
    let Some(role) = map_author_role(role_name) else {
        debug!(node = node_id, role = role_name, "Dropping message with unsupported role");
        return None;
    };

    let content = message.content.as_ref().map(RawContent::text).unwrap_or_default();
    if content.trim().is_empty() {
        return None;
    }

    Some(Message {
        id: message.id.clone().filter(|id| !id.is_empty()).unwrap_or_else(|| node_id.to_string()),
        role,
        content,
        timestamp: message.create_time.unwrap_or(conversation_created),
        attachments: Vec::new(),
    })
}

fn map_author_role(role: &str) -> Option<Role> {
    match role {
        "user" => Some(Role::User),
        "assistant" => Some(Role::Assistant),
        "system" => Some(Role::System),
        _ => None,
    }
}
