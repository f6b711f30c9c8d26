//! Flat `chat_messages` export schema
//!
//! Two on-disk variants exist:
//! - Older exports: one `conversations/<uuid>.json` file per conversation
//! - Newer exports: a single root `conversations.json` array
//!
//! The same archive may also carry `projects.json` and `memories.json`.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::archive::Archive;
use super::deserializers::{deserialize_optional_string, deserialize_optional_timestamp};
use super::{
    CONVERSATIONS_FILE, MEMORIES_FILE, PROJECTS_FILE, decode_record_list, parse_records,
};
use crate::models::{
    Attachment, Conversation, Memories, Message, Project, ProjectDoc, Provider, Role,
};

const CONVERSATIONS_DIR: &str = "conversations/";
const DEFAULT_TITLE: &str = "Untitled";
const DEFAULT_PROJECT_NAME: &str = "Untitled Project";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
struct RawConversation {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    uuid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    chat_messages: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    uuid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    sender: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    text: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    attachments: Option<Vec<Value>>,
}

// Exports have used both spellings of each field
#[derive(Debug, Deserialize)]
struct RawAttachment {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    uuid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    file_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    filename: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    mime_type: Option<String>,
    #[serde(default)]
    file_size: Option<Value>,
    #[serde(default)]
    size: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawProject {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    uuid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    docs: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawProjectDoc {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    uuid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    filename: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    content: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawMemories {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    conversations_memory: Option<String>,
    #[serde(default)]
    project_memories: Option<IndexMap<String, Value>>,
}

fn is_conversation_file(name: &str) -> bool {
    name.starts_with(CONVERSATIONS_DIR) && name.ends_with(".json")
}

/// Whether the archive holds a flat-schema export
///
/// True when there is a `conversations/*.json` member, or when the root
/// `conversations.json` starts with a record that has `uuid` and `chat_messages` but no
/// `mapping` tree.
pub fn detect(archive: &Archive) -> bool {
    if archive.names().any(is_conversation_file) {
        return true;
    }

    if !archive.contains(CONVERSATIONS_FILE) {
        return false;
    }

    match archive.read_json(CONVERSATIONS_FILE) {
        Ok(Value::Array(items)) => items.first().and_then(Value::as_object).is_some_and(|first| {
            first.contains_key("uuid")
                && first.contains_key("chat_messages")
                && !first.contains_key("mapping")
        }),
        Ok(_) => false,
        Err(e) => {
            warn!("Failed to inspect {}: {:#}", CONVERSATIONS_FILE, e);
            false
        }
    }
}

/// Parse every conversation in the archive
///
/// The root `conversations.json` wins when present; otherwise each
/// `conversations/*.json` member is parsed in archive order. Records that fail are logged
/// and skipped.
pub fn parse(archive: &Archive) -> Vec<Conversation> {
    if archive.contains(CONVERSATIONS_FILE) {
        let Some(items) = decode_record_list(archive, CONVERSATIONS_FILE) else {
            return Vec::new();
        };
        return parse_records(items, "conversation", parse_conversation);
    }

    let mut conversations = Vec::new();
    for name in archive.names().filter(|n| is_conversation_file(n)) {
        let parsed = archive.read_json(name).and_then(|value| parse_conversation(value, name));
        match parsed {
            Ok(Some(conversation)) => conversations.push(conversation),
            Ok(None) => {}
            Err(e) => warn!("Skipping conversation {}: {:#}", name, e),
        }
    }
    debug!(count = conversations.len(), "Parsed per-file conversations");
    conversations
}

fn parse_conversation(value: Value, source: &str) -> Result<Option<Conversation>> {
    let raw: RawConversation =
        serde_json::from_value(value).context("Unexpected conversation structure")?;

    let Some(id) = raw.uuid.filter(|id| !id.is_empty()) else {
        warn!("Conversation {} missing uuid, skipping", source);
        return Ok(None);
    };
    let Some(created_at) = raw.created_at else {
        warn!("Conversation {} missing created_at, skipping", source);
        return Ok(None);
    };

    let mut messages = Vec::new();
    for (i, msg_value) in raw.chat_messages.unwrap_or_default().into_iter().enumerate() {
        match parse_message(msg_value) {
            Ok(Some(message)) => messages.push(message),
            Ok(None) => {}
            Err(e) => warn!("Skipping message {} in conversation {}: {:#}", i, id, e),
        }
    }

    Ok(Some(Conversation {
        title: raw.name.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        updated_at: raw.updated_at.unwrap_or(created_at),
        created_at,
        provider: Provider::Claude,
        messages,
        id,
    }))
}

fn parse_message(value: Value) -> Result<Option<Message>> {
    let raw: RawMessage = serde_json::from_value(value).context("Unexpected message structure")?;

    let Some(id) = raw.uuid.filter(|id| !id.is_empty()) else {
        warn!("Message missing uuid, skipping");
        return Ok(None);
    };

    let sender = raw.sender.unwrap_or_default();
    let Some(role) = map_sender_to_role(&sender) else {
        warn!("Message {} has unknown sender '{}', skipping", id, sender);
        return Ok(None);
    };

    let Some(timestamp) = raw.created_at else {
        warn!("Message {} missing created_at, skipping", id);
        return Ok(None);
    };

    let attachments = raw
        .attachments
        .unwrap_or_default()
        .into_iter()
        .filter_map(|att| match parse_attachment(att) {
            Ok(attachment) => attachment,
            Err(e) => {
                warn!("Skipping attachment in message {}: {:#}", id, e);
                None
            }
        })
        .collect();

    Ok(Some(Message { content: raw.text.unwrap_or_default(), role, timestamp, attachments, id }))
}

fn parse_attachment(value: Value) -> Result<Option<Attachment>> {
    let raw: RawAttachment =
        serde_json::from_value(value).context("Unexpected attachment structure")?;

    let id = raw.id.filter(|s| !s.is_empty()).or(raw.uuid).unwrap_or_default();
    let filename = raw.file_name.filter(|s| !s.is_empty()).or(raw.filename).unwrap_or_default();
    if id.is_empty() || filename.is_empty() {
        debug!("Dropping attachment without id or filename");
        return Ok(None);
    }

    Ok(Some(Attachment {
        id,
        filename,
        mime_type: raw.mime_type.unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
        size: raw.file_size.or(raw.size).as_ref().and_then(Value::as_u64),
    }))
}

fn map_sender_to_role(sender: &str) -> Option<Role> {
    match sender {
        "human" => Some(Role::User),
        "assistant" => Some(Role::Assistant),
        _ => None,
    }
}

/// Parse `projects.json`, if the archive has one
pub fn parse_projects(archive: &Archive) -> Vec<Project> {
    if !archive.contains(PROJECTS_FILE) {
        return Vec::new();
    }
    let Some(items) = decode_record_list(archive, PROJECTS_FILE) else {
        return Vec::new();
    };

    // Docs without a timestamp all share the moment the archive was read
    let now = Utc::now();
    parse_records(items, "project", |value, source| parse_project(value, source, now))
}

fn parse_project(value: Value, source: &str, now: DateTime<Utc>) -> Result<Option<Project>> {
    let raw: RawProject = serde_json::from_value(value).context("Unexpected project structure")?;

    let Some(id) = raw.uuid.filter(|id| !id.is_empty()) else {
        warn!("Project {} missing uuid, skipping", source);
        return Ok(None);
    };
    let Some(created_at) = raw.created_at else {
        warn!("Project {} missing created_at, skipping", source);
        return Ok(None);
    };

    let docs = raw
        .docs
        .unwrap_or_default()
        .into_iter()
        .filter_map(|doc| match parse_project_doc(doc, now) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Skipping document in project {}: {:#}", id, e);
                None
            }
        })
        .collect();

    Ok(Some(Project {
        name: raw.name.unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
        description: raw.description.unwrap_or_default(),
        updated_at: raw.updated_at.unwrap_or(created_at),
        created_at,
        docs,
        id,
    }))
}

fn parse_project_doc(value: Value, now: DateTime<Utc>) -> Result<Option<ProjectDoc>> {
    let raw: RawProjectDoc =
        serde_json::from_value(value).context("Unexpected document structure")?;

    let Some(filename) = raw.filename.filter(|f| !f.is_empty()) else {
        debug!("Dropping project document without filename");
        return Ok(None);
    };

    Ok(Some(ProjectDoc {
        id: raw.uuid.unwrap_or_default(),
        filename,
        content: raw.content.unwrap_or_default(),
        created_at: raw.created_at.unwrap_or(now),
    }))
}

/// Parse `memories.json`; a missing file or an empty list means no memories
pub fn parse_memories(archive: &Archive) -> Option<Memories> {
    if !archive.contains(MEMORIES_FILE) {
        return None;
    }

    match read_memories(archive) {
        Ok(memories) => memories,
        Err(e) => {
            error!("Failed to read memories from {}: {:#}", MEMORIES_FILE, e);
            None
        }
    }
}

fn read_memories(archive: &Archive) -> Result<Option<Memories>> {
    let Value::Array(items) = archive.read_json(MEMORIES_FILE)? else {
        bail!("{} is not a list", MEMORIES_FILE);
    };
    let Some(first) = items.into_iter().next() else {
        return Ok(None);
    };

    let raw: RawMemories = serde_json::from_value(first).context("Unexpected memories structure")?;

    let mut project_memories = IndexMap::new();
    for (project_id, memory) in raw.project_memories.unwrap_or_default() {
        match memory {
            Value::String(text) => {
                project_memories.insert(project_id, text);
            }
            Value::Null => {}
            other => warn!("Project memory {} is not text ({}), skipping", project_id, other),
        }
    }

    Ok(Some(Memories {
        conversations_memory: raw.conversations_memory.unwrap_or_default(),
        project_memories,
    }))
}
