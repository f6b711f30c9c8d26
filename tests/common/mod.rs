//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Builder for export archives written into a temp directory
pub struct ExportBuilder {
    temp_dir: TempDir,
    members: Vec<(String, Vec<u8>)>,
}

/// A written export; keeps its temp directory alive
pub struct TestExport {
    temp_dir: TempDir,
    path: PathBuf,
}

impl TestExport {
    /// Path to the archive (ZIP file or extracted directory)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scratch output location next to the archive (not created)
    pub fn output_dir(&self) -> PathBuf {
        self.temp_dir.path().join("out")
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl ExportBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir, members: Vec::new() }
    }

    /// Add a member with raw content
    pub fn with_file(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.members.push((name.to_string(), content.as_ref().to_vec()));
        self
    }

    pub fn with_json(self, name: &str, value: &Value) -> Self {
        let content = serde_json::to_vec_pretty(value).expect("Failed to serialize fixture");
        self.with_file(name, content)
    }

    /// Root `conversations.json` holding the given records
    pub fn with_conversations(self, conversations: Vec<Value>) -> Self {
        self.with_json("conversations.json", &Value::Array(conversations))
    }

    pub fn with_projects(self, projects: Vec<Value>) -> Self {
        self.with_json("projects.json", &Value::Array(projects))
    }

    pub fn with_memories(self, memories: Value) -> Self {
        self.with_json("memories.json", &json!([memories]))
    }

    /// Write the members into `export.zip`
    pub fn build_zip(self) -> TestExport {
        let path = self.temp_dir.path().join("export.zip");
        let file = fs::File::create(&path).expect("Failed to create export.zip");
        let mut writer = ZipWriter::new(file);

        for (name, content) in &self.members {
            writer.start_file(name.as_str(), SimpleFileOptions::default()).expect("start_file");
            writer.write_all(content).expect("Failed to write zip member");
        }
        writer.finish().expect("Failed to finish zip");

        TestExport { temp_dir: self.temp_dir, path }
    }

    /// Write the members as an extracted export directory
    pub fn build_dir(self) -> TestExport {
        let path = self.temp_dir.path().join("export");
        for (name, content) in &self.members {
            let member_path = path.join(name);
            if let Some(parent) = member_path.parent() {
                fs::create_dir_all(parent).expect("Failed to create member dir");
            }
            fs::write(&member_path, content).expect("Failed to write member");
        }
        fs::create_dir_all(&path).expect("Failed to create export dir");

        TestExport { temp_dir: self.temp_dir, path }
    }
}

impl Default for ExportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for flat-schema conversation records
pub struct ClaudeConversationBuilder {
    uuid: String,
    name: Option<String>,
    created_at: String,
    messages: Vec<Value>,
}

impl ClaudeConversationBuilder {
    pub fn new(uuid: &str, name: &str) -> Self {
        Self {
            uuid: uuid.to_string(),
            name: Some(name.to_string()),
            created_at: "2024-01-15T10:00:00Z".to_string(),
            messages: Vec::new(),
        }
    }

    pub fn created_at(mut self, created_at: &str) -> Self {
        self.created_at = created_at.to_string();
        self
    }

    pub fn untitled(mut self) -> Self {
        self.name = None;
        self
    }

    /// Append a message; timestamps advance one minute per message
    pub fn message(mut self, sender: &str, text: &str) -> Self {
        let index = self.messages.len();
        self.messages.push(json!({
            "uuid": format!("{}-msg-{:03}", self.uuid, index + 1),
            "sender": sender,
            "text": text,
            "created_at": format!("2024-01-15T10:{:02}:00Z", index),
            "attachments": []
        }));
        self
    }

    pub fn raw_message(mut self, message: Value) -> Self {
        self.messages.push(message);
        self
    }

    pub fn to_json(&self) -> Value {
        let mut value = json!({
            "uuid": self.uuid,
            "created_at": self.created_at,
            "updated_at": self.created_at,
            "chat_messages": self.messages,
        });
        if let Some(name) = &self.name {
            value["name"] = json!(name);
        }
        value
    }
}

/// Builder for branching-schema conversation records
///
/// Messages form a single chain under `client-created-root`; [`Self::branch`] adds an
/// alternate child to the last node, listed after the canonical one.
pub struct ChatGptConversationBuilder {
    id: String,
    title: String,
    create_time: f64,
    mapping: serde_json::Map<String, Value>,
    last: String,
}

impl ChatGptConversationBuilder {
    pub fn new(id: &str, title: &str) -> Self {
        let mut mapping = serde_json::Map::new();
        mapping.insert(
            "client-created-root".to_string(),
            json!({"id": "client-created-root", "message": null, "parent": null, "children": []}),
        );
        Self {
            id: id.to_string(),
            title: title.to_string(),
            create_time: 1705312800.0,
            mapping,
            last: "client-created-root".to_string(),
        }
    }

    pub fn create_time(mut self, create_time: f64) -> Self {
        self.create_time = create_time;
        self
    }

    /// Append a message to the canonical chain
    pub fn message(mut self, role: &str, text: &str) -> Self {
        let node_id = format!("{}-node-{}", self.id, self.mapping.len());
        let parent = self.last.clone();
        self.attach(&node_id, &parent, role, text);
        self.last = node_id;
        self
    }

    /// Add an alternate sibling of the last message, listed after it and never followed
    pub fn branch(mut self, role: &str, text: &str) -> Self {
        let node_id = format!("{}-alt-{}", self.id, self.mapping.len());
        let parent = self.mapping[&self.last]["parent"]
            .as_str()
            .expect("branch needs a message to branch from")
            .to_string();
        self.attach(&node_id, &parent, role, text);
        self
    }

    fn attach(&mut self, node_id: &str, parent: &str, role: &str, text: &str) {
        let create_time = self.create_time + self.mapping.len() as f64 * 60.0;
        self.mapping.insert(
            node_id.to_string(),
            json!({
                "id": node_id,
                "message": {
                    "id": format!("{}-msg", node_id),
                    "author": {"role": role},
                    "content": {"content_type": "text", "parts": [text]},
                    "create_time": create_time
                },
                "parent": parent,
                "children": []
            }),
        );
        if let Some(parent_node) = self.mapping.get_mut(parent) {
            parent_node["children"].as_array_mut().expect("children array").push(json!(node_id));
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "create_time": self.create_time,
            "update_time": self.create_time + 3600.0,
            "mapping": self.mapping,
        })
    }
}

pub const PYTHON_HELP_ID: &str = "a1b2c3d4-e5f6-7890-abcd-ef1234567890";

/// "Python Data Processing Help": three flat-schema messages with one attachment
pub fn python_help_conversation() -> Value {
    let answer = "You can use pandas:\n\n```python\nimport pandas as pd\n\
                  df = pd.read_csv('sales.csv')\nhigh = df[df['revenue'] > 1000]\n```";
    let mut conversation = ClaudeConversationBuilder::new(PYTHON_HELP_ID, "Python Data Processing Help")
        .message("human", "I have a CSV file with sales data. How do I keep rows with revenue > 1000?")
        .message("assistant", answer)
        .message("human", "Thanks! That worked perfectly.")
        .to_json();
    conversation["chat_messages"][0]["attachments"] = json!([
        {"id": "att-001", "file_name": "sales.csv", "mime_type": "text/csv", "file_size": 2048}
    ]);
    conversation
}

/// "こんにちは Unicode": five flat-schema messages with non-ASCII content
pub fn unicode_conversation() -> Value {
    ClaudeConversationBuilder::new("b2c3d4e5-f6a7-8901-bcde-f12345678901", "こんにちは Unicode")
        .created_at("2024-01-20T14:30:00Z")
        .message("human", "こんにちは! Can you help with Unicode?")
        .message("assistant", "もちろん! Unicode covers scripts like 日本語, Ελληνικά and emoji 🎉.")
        .message("human", "What about combining characters like é?")
        .message("assistant", "é can be one code point or e + U+0301.")
        .message("human", "ありがとう!")
        .to_json()
}

/// "JavaScript Async Patterns": linear branching-schema conversation
pub fn async_patterns_conversation() -> Value {
    ChatGptConversationBuilder::new("conv-js-async", "JavaScript Async Patterns")
        .message("user", "What's the difference between promises and async/await?")
        .message("assistant", "async/await is syntax sugar over promises.")
        .to_json()
}

/// "Git Branching Strategy": canonical reply mentions hotfix, the alternate mentions GitFlow
pub fn git_branching_conversation() -> Value {
    ChatGptConversationBuilder::new("conv-git", "Git Branching Strategy")
        .create_time(1705399200.0)
        .message("system", "You are a helpful assistant.")
        .message("user", "What branching strategy should a small team use?")
        .message("assistant", "Trunk-based development with short-lived branches.")
        .message("user", "How do we ship urgent fixes?")
        .message("assistant", "Cut a hotfix branch from main, fix, and merge back quickly.")
        .branch("assistant", "Adopt GitFlow with release and develop branches.")
        .message("user", "   ")
        .to_json()
}

pub fn research_project() -> Value {
    json!({
        "uuid": "proj-1111-aaaa",
        "name": "Research Notes",
        "description": "Reading list and summaries",
        "created_at": "2024-01-10T09:00:00Z",
        "updated_at": "2024-01-12T09:00:00Z",
        "docs": [
            {"uuid": "doc-1", "filename": "summary.md", "content": "# Summary\n\nKey findings.", "created_at": "2024-01-10T09:05:00Z"},
            {"uuid": "doc-2", "filename": "summary.md", "content": "Second summary", "created_at": "2024-01-11T09:05:00Z"}
        ]
    })
}

pub fn memories() -> Value {
    json!({
        "conversations_memory": "The user prefers concise answers with code examples.",
        "project_memories": {
            "proj-1111-aaaa": "Focus on distributed systems papers.",
            "orphan99-0000-0000": "Memory for a project that was not exported."
        }
    })
}

/// Flat-schema export with two conversations, one project and memories
pub fn full_claude_export() -> ExportBuilder {
    ExportBuilder::new()
        .with_conversations(vec![python_help_conversation(), unicode_conversation()])
        .with_projects(vec![research_project()])
        .with_memories(memories())
}

/// Branching-schema export with two conversations
pub fn full_chatgpt_export() -> ExportBuilder {
    ExportBuilder::new()
        .with_conversations(vec![async_patterns_conversation(), git_branching_conversation()])
}
