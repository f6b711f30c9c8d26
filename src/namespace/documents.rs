//! JSON documents placed alongside conversations, projects and memories
//!
//! Every struct here round-trips: reading a generated `_metadata.json` or `_index.json`
//! back through `serde_json` recovers the same identifiers, titles, timestamps and counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::models::{Conversation, Memories, Project, ProjectDoc, Provider};

/// RFC 3339 with an explicit `+00:00` offset and only as many fractional digits as needed
mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

/// `_metadata.json` inside a conversation directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMetadata {
    pub id: String,
    pub title: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub provider: Provider,
    pub message_count: usize,
    pub attachment_count: usize,
}

impl From<&Conversation> for ConversationMetadata {
    fn from(conv: &Conversation) -> Self {
        Self {
            id: conv.id.clone(),
            title: conv.title.clone(),
            created_at: conv.created_at,
            updated_at: conv.updated_at,
            provider: conv.provider,
            message_count: conv.messages.len(),
            attachment_count: conv.attachment_count(),
        }
    }
}

/// Root `_index.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootIndex {
    pub conversation_count: usize,
    #[serde(with = "timestamp")]
    pub generated_at: DateTime<Utc>,
    pub conversations: Vec<ConversationSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ProjectSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_memories: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_memory_count: Option<usize>,
}

impl RootIndex {
    pub fn new(
        conversations: &[Conversation],
        projects: &[Project],
        memories: Option<&Memories>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let has_projects = !projects.is_empty();
        Self {
            conversation_count: conversations.len(),
            generated_at,
            conversations: conversations.iter().map(ConversationSummary::from).collect(),
            project_count: has_projects.then_some(projects.len()),
            projects: has_projects.then(|| projects.iter().map(ProjectSummary::from).collect()),
            has_memories: memories.map(|_| true),
            project_memory_count: memories.map(|m| m.project_memories.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub provider: Provider,
    pub message_count: usize,
}

impl From<&Conversation> for ConversationSummary {
    fn from(conv: &Conversation) -> Self {
        Self {
            id: conv.id.clone(),
            title: conv.title.clone(),
            created_at: conv.created_at,
            updated_at: conv.updated_at,
            provider: conv.provider,
            message_count: conv.messages.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub doc_count: usize,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            created_at: project.created_at,
            doc_count: project.docs.len(),
        }
    }
}

/// `_metadata.json` inside a project directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub doc_count: usize,
    pub docs: Vec<DocSummary>,
}

impl From<&Project> for ProjectMetadata {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            created_at: project.created_at,
            updated_at: project.updated_at,
            doc_count: project.docs.len(),
            docs: project.docs.iter().map(DocSummary::from).collect(),
        }
    }
}

/// Document listing; the original filename is kept even when the leaf was renamed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSummary {
    pub id: String,
    pub filename: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl From<&ProjectDoc> for DocSummary {
    fn from(doc: &ProjectDoc) -> Self {
        Self { id: doc.id.clone(), filename: doc.filename.clone(), created_at: doc.created_at }
    }
}

/// `_projects/_index.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectsIndex {
    pub project_count: usize,
    #[serde(with = "timestamp")]
    pub generated_at: DateTime<Utc>,
    pub projects: Vec<ProjectIndexEntry>,
}

impl ProjectsIndex {
    pub fn new(projects: &[Project], generated_at: DateTime<Utc>) -> Self {
        Self {
            project_count: projects.len(),
            generated_at,
            projects: projects.iter().map(ProjectIndexEntry::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIndexEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub doc_count: usize,
}

impl From<&Project> for ProjectIndexEntry {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            created_at: project.created_at,
            updated_at: project.updated_at,
            doc_count: project.docs.len(),
        }
    }
}

/// Label used in the memories index for a memory whose project was not exported
pub const UNKNOWN_PROJECT_NAME: &str = "Unknown";

/// `_memories/_index.json`; lengths only, never memory text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoriesIndex {
    #[serde(with = "timestamp")]
    pub generated_at: DateTime<Utc>,
    pub has_conversations_memory: bool,
    pub conversations_memory_length: usize,
    pub project_memory_count: usize,
    pub project_memories: Vec<ProjectMemoryEntry>,
}

impl MemoriesIndex {
    pub fn new(memories: &Memories, projects: &[Project], generated_at: DateTime<Utc>) -> Self {
        let project_memories = memories
            .project_memories
            .iter()
            .map(|(project_id, text)| ProjectMemoryEntry {
                project_id: project_id.clone(),
                project_name: Memories::project_name(project_id, projects)
                    .unwrap_or(UNKNOWN_PROJECT_NAME)
                    .to_string(),
                memory_length: text.chars().count(),
            })
            .collect();

        Self {
            generated_at,
            has_conversations_memory: !memories.conversations_memory.is_empty(),
            conversations_memory_length: memories.conversations_memory.chars().count(),
            project_memory_count: memories.project_memories.len(),
            project_memories,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMemoryEntry {
    pub project_id: String,
    pub project_name: String,
    pub memory_length: usize,
}

/// Pretty-print a document with two-space indentation
pub fn render<T: Serialize>(document: &T) -> String {
    match serde_json::to_string_pretty(document) {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to serialize document: {}", e);
            String::from("{}")
        }
    }
}
