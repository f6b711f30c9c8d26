//! Projection of a [`ChatExport`] onto a namespace tree
//!
//! Layout:
//!
//! ```text
//! {YYYY-MM-DD}_{slug}/        one per conversation
//!     _metadata.json
//!     001_user.md, 002_assistant.md, ...
//! _projects/                  only when projects exist
//!     {slug}/_metadata.json + one leaf per document
//!     _index.json
//! _memories/                  only when memories exist
//!     conversations.md
//!     projects/{slug}.md
//!     _index.json
//! _index.json
//! ```

use chrono::{DateTime, Utc};
use tracing::debug;

use super::documents::{
    ConversationMetadata, MemoriesIndex, ProjectMetadata, ProjectsIndex, RootIndex, render,
};
use super::tree::Namespace;
use crate::models::{ChatExport, Conversation, Memories, Project};
use crate::utils::{DEFAULT_MAX_SLUG_LEN, UniqueNames, sanitize_filename, slugify};

pub const INDEX_FILE: &str = "_index.json";
pub const METADATA_FILE: &str = "_metadata.json";
pub const PROJECTS_DIR: &str = "_projects";
pub const MEMORIES_DIR: &str = "_memories";
pub const CONVERSATIONS_MEMORY_FILE: &str = "conversations.md";
pub const PROJECT_MEMORIES_DIR: &str = "projects";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionOptions {
    /// Longest slug used in directory and file names, never below the length of `untitled`
    pub max_name_len: usize,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self { max_name_len: DEFAULT_MAX_SLUG_LEN }
    }
}

/// Project an export, stamping index documents with the current time
pub fn build_namespace(export: &ChatExport, options: &ProjectionOptions) -> Namespace {
    build_namespace_at(export, options, Utc::now())
}

/// Project an export with a fixed `generated_at`
///
/// Identical inputs with the same `generated_at` always produce identical namespaces.
pub fn build_namespace_at(
    export: &ChatExport,
    options: &ProjectionOptions,
    generated_at: DateTime<Utc>,
) -> Namespace {
    let mut root = Namespace::new();
    let mut names = UniqueNames::with_reserved([INDEX_FILE, PROJECTS_DIR, MEMORIES_DIR]);

    for conv in &export.conversations {
        let name = names.claim(&conversation_dir_name(conv, options.max_name_len));
        root.insert_dir(name, conversation_dir(conv));
    }

    if !export.projects.is_empty() {
        root.insert_dir(PROJECTS_DIR, projects_dir(&export.projects, options, generated_at));
    }

    if let Some(memories) = &export.memories {
        root.insert_dir(
            MEMORIES_DIR,
            memories_dir(memories, &export.projects, options, generated_at),
        );
    }

    let index = RootIndex::new(
        &export.conversations,
        &export.projects,
        export.memories.as_ref(),
        generated_at,
    );
    root.insert_file(INDEX_FILE, render(&index));

    debug!(
        conversations = export.conversations.len(),
        projects = export.projects.len(),
        entries = root.len(),
        "Built namespace"
    );
    root
}

/// `{YYYY-MM-DD}_{slug}` from the creation date and title
pub fn conversation_dir_name(conv: &Conversation, max_name_len: usize) -> String {
    format!("{}_{}", conv.created_at.format("%Y-%m-%d"), slugify(&conv.title, max_name_len))
}

fn conversation_dir(conv: &Conversation) -> Namespace {
    let mut dir = Namespace::new();
    dir.insert_file(METADATA_FILE, render(&ConversationMetadata::from(conv)));

    for (i, message) in conv.messages.iter().enumerate() {
        dir.insert_file(format!("{:03}_{}.md", i + 1, message.role), message.content.as_str());
    }
    dir
}

fn projects_dir(
    projects: &[Project],
    options: &ProjectionOptions,
    generated_at: DateTime<Utc>,
) -> Namespace {
    let mut dir = Namespace::new();
    let mut names = UniqueNames::with_reserved([INDEX_FILE]);

    for project in projects {
        let name = names.claim(&slugify(&project.name, options.max_name_len));
        dir.insert_dir(name, project_dir(project));
    }

    dir.insert_file(INDEX_FILE, render(&ProjectsIndex::new(projects, generated_at)));
    dir
}

fn project_dir(project: &Project) -> Namespace {
    let mut dir = Namespace::new();
    let mut names = UniqueNames::with_reserved([METADATA_FILE]);

    dir.insert_file(METADATA_FILE, render(&ProjectMetadata::from(project)));
    for doc in &project.docs {
        let name = names.claim_file(&sanitize_filename(&doc.filename));
        dir.insert_file(name, doc.content.as_str());
    }
    dir
}

fn memories_dir(
    memories: &Memories,
    projects: &[Project],
    options: &ProjectionOptions,
    generated_at: DateTime<Utc>,
) -> Namespace {
    let mut dir = Namespace::new();

    if !memories.conversations_memory.is_empty() {
        dir.insert_file(CONVERSATIONS_MEMORY_FILE, memories.conversations_memory.as_str());
    }

    if !memories.project_memories.is_empty() {
        let mut project_dir = Namespace::new();
        let mut names = UniqueNames::new();

        for (project_id, text) in &memories.project_memories {
            let label = Memories::project_label(project_id, projects);
            let name = names.claim_file(&format!("{}.md", slugify(&label, options.max_name_len)));
            project_dir.insert_file(name, text.as_str());
        }
        dir.insert_dir(PROJECT_MEMORIES_DIR, project_dir);
    }

    dir.insert_file(INDEX_FILE, render(&MemoriesIndex::new(memories, projects, generated_at)));
    dir
}
