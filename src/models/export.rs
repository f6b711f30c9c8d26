use chrono::{DateTime, Utc};

use super::{Conversation, Memories, Project, Provider};

/// Everything normalized from one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExport {
    pub provider: Provider,
    pub conversations: Vec<Conversation>,
    pub projects: Vec<Project>,
    pub memories: Option<Memories>,
}

/// Summary numbers shown by `chat-ffs info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportStats {
    pub conversation_count: usize,
    pub message_count: usize,
    pub project_count: usize,
    pub doc_count: usize,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

impl ChatExport {
    pub fn new(provider: Provider, conversations: Vec<Conversation>) -> Self {
        Self { provider, conversations, projects: Vec::new(), memories: None }
    }

    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = projects;
        self
    }

    pub fn with_memories(mut self, memories: Option<Memories>) -> Self {
        self.memories = memories;
        self
    }

    pub fn stats(&self) -> ExportStats {
        let created = self.conversations.iter().map(|c| c.created_at);
        ExportStats {
            conversation_count: self.conversations.len(),
            message_count: self.conversations.iter().map(|c| c.messages.len()).sum(),
            project_count: self.projects.len(),
            doc_count: self.projects.iter().map(|p| p.docs.len()).sum(),
            earliest: created.clone().min(),
            latest: created.max(),
        }
    }
}
