use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Project;

/// Length of the identifier prefix used when a project memory has no matching project
pub const UNRESOLVED_PROJECT_LABEL_LEN: usize = 8;

/// Memory blobs from an export
///
/// `project_memories` keys are project identifiers. They are weak references: nothing
/// guarantees a project with that identifier was exported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memories {
    #[serde(default)]
    pub conversations_memory: String,
    #[serde(default)]
    pub project_memories: IndexMap<String, String>,
}

impl Memories {
    /// Name of the project a memory belongs to, if it was exported
    pub fn project_name<'a>(project_id: &str, projects: &'a [Project]) -> Option<&'a str> {
        projects.iter().find(|p| p.id == project_id).map(|p| p.name.as_str())
    }

    /// Project name, or the first characters of the identifier when the project is unknown
    pub fn project_label(project_id: &str, projects: &[Project]) -> String {
        match Self::project_name(project_id, projects) {
            Some(name) => name.to_string(),
            None => project_id.chars().take(UNRESOLVED_PROJECT_LABEL_LEN).collect(),
        }
    }
}
