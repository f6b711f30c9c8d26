//! Provider dispatch: detection order and the shared capability set

use std::path::Path;

use tracing::{debug, error, info};

use super::archive::Archive;
use super::{chatgpt, claude};
use crate::models::{ChatExport, Conversation, Memories, Project, Provider};

impl Provider {
    /// Order in which detectors are probed. The `mapping` marker of the branching schema is
    /// the most specific signal, so it goes first.
    pub const DETECTION_ORDER: [Provider; 2] = [Provider::ChatGpt, Provider::Claude];

    /// First provider in [`Self::DETECTION_ORDER`] whose detector accepts the archive
    pub fn detect_in(archive: &Archive) -> Option<Provider> {
        let detected = Self::DETECTION_ORDER.into_iter().find(|provider| provider.detect(archive));
        debug!(provider = ?detected, "Provider detection finished");
        detected
    }

    pub fn detect(self, archive: &Archive) -> bool {
        match self {
            Provider::Claude => claude::detect(archive),
            Provider::ChatGpt => chatgpt::detect(archive),
        }
    }

    pub fn parse(self, archive: &Archive) -> Vec<Conversation> {
        let conversations = match self {
            Provider::Claude => claude::parse(archive),
            Provider::ChatGpt => chatgpt::parse(archive),
        };
        info!(provider = %self, count = conversations.len(), "Parsed conversations");
        conversations
    }

    /// Project records; the branching schema has none
    pub fn parse_projects(self, archive: &Archive) -> Vec<Project> {
        match self {
            Provider::Claude => claude::parse_projects(archive),
            Provider::ChatGpt => Vec::new(),
        }
    }

    /// Memory records; the branching schema has none
    pub fn parse_memories(self, archive: &Archive) -> Option<Memories> {
        match self {
            Provider::Claude => claude::parse_memories(archive),
            Provider::ChatGpt => None,
        }
    }

    /// Everything this provider can read from the archive
    pub fn load(self, archive: &Archive) -> ChatExport {
        ChatExport::new(self, self.parse(archive))
            .with_projects(self.parse_projects(archive))
            .with_memories(self.parse_memories(archive))
    }

    /// Detect against an archive on disk; unreadable archives are never a match
    pub fn detect_path(self, path: &Path) -> bool {
        match Archive::open(path) {
            Ok(archive) => self.detect(&archive),
            Err(e) => {
                debug!("Cannot inspect {}: {:#}", path.display(), e);
                false
            }
        }
    }

    /// Parse an archive on disk; unreadable archives yield no conversations
    pub fn parse_path(self, path: &Path) -> Vec<Conversation> {
        match Archive::open(path) {
            Ok(archive) => self.parse(&archive),
            Err(e) => {
                error!("{:#}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::parsers::{CONVERSATIONS_FILE, MEMORIES_FILE, PROJECTS_FILE};

    fn flat_archive() -> Archive {
        Archive::from_members([
            (
                CONVERSATIONS_FILE,
                json!([{"uuid": "c1", "created_at": "2024-01-15T10:00:00Z", "chat_messages": []}])
                    .to_string(),
            ),
            (
                PROJECTS_FILE,
                json!([{"uuid": "p1", "name": "Research", "created_at": "2024-01-01T00:00:00Z"}])
                    .to_string(),
            ),
            (MEMORIES_FILE, json!([{"conversations_memory": "Likes Rust"}]).to_string()),
        ])
    }

    fn branching_archive() -> Archive {
        Archive::from_members([(
            CONVERSATIONS_FILE,
            json!([{"id": "g1", "create_time": 1705312800.0, "mapping": {}}]).to_string(),
        )])
    }

    #[test]
    fn test_detect_in() {
        assert_eq!(Provider::detect_in(&flat_archive()), Some(Provider::Claude));
        assert_eq!(Provider::detect_in(&branching_archive()), Some(Provider::ChatGpt));
        assert_eq!(Provider::detect_in(&Archive::default()), None);
    }

    #[test]
    fn test_mixed_archive_prefers_branching_schema() {
        let archive = Archive::from_members([
            (
                "conversations/c1.json",
                json!({"uuid": "c1", "created_at": "2024-01-15T10:00:00Z"}).to_string(),
            ),
            (
                CONVERSATIONS_FILE,
                json!([{"id": "g1", "create_time": 1705312800.0, "mapping": {}}]).to_string(),
            ),
        ]);

        assert!(Provider::Claude.detect(&archive));
        assert!(Provider::ChatGpt.detect(&archive));
        assert_eq!(Provider::detect_in(&archive), Some(Provider::ChatGpt));
    }

    #[test]
    fn test_load_flat_export() {
        let export = Provider::Claude.load(&flat_archive());

        assert_eq!(export.provider, Provider::Claude);
        assert_eq!(export.conversations.len(), 1);
        assert_eq!(export.projects.len(), 1);
        assert_eq!(export.memories.unwrap().conversations_memory, "Likes Rust");
    }

    #[test]
    fn test_branching_schema_has_no_projects_or_memories() {
        let archive = branching_archive();
        assert!(Provider::ChatGpt.parse_projects(&archive).is_empty());
        assert!(Provider::ChatGpt.parse_memories(&archive).is_none());
    }

    #[test]
    fn test_path_helpers_degrade_gracefully() {
        let temp_dir = TempDir::new().unwrap();
        let bogus = temp_dir.path().join("export.zip");
        let mut file = std::fs::File::create(&bogus).unwrap();
        file.write_all(b"not a zip archive").unwrap();

        assert!(!Provider::Claude.detect_path(&bogus));
        assert!(Provider::ChatGpt.parse_path(&bogus).is_empty());
        assert!(Provider::Claude.parse_path(&temp_dir.path().join("missing.zip")).is_empty());
    }
}
