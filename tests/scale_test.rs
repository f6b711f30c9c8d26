/// Scale and resource tests
///
/// These tests push larger exports through the whole pipeline and verify counts and
/// duplicate resolution hold up
mod common;

use chat_ffs::parsers::Archive;
use chat_ffs::{ProjectionOptions, Provider, build_namespace};
use common::*;

#[test]
fn test_scale_many_conversations_with_shared_titles() {
    // 500 conversations over 10 distinct (date, title) pairs, 50 of each
    let conversations = (0..500)
        .map(|i| {
            ClaudeConversationBuilder::new(&format!("conv-{:04}", i), &format!("Topic {}", i % 10))
                .created_at(&format!("2024-02-{:02}T08:00:00Z", 1 + i % 5))
                .message("human", "question")
                .message("assistant", "answer")
                .to_json()
        })
        .collect();
    let export = ExportBuilder::new().with_conversations(conversations).build_zip();

    let archive = Archive::open(export.path()).unwrap();
    let parsed = Provider::Claude.load(&archive);
    assert_eq!(parsed.conversations.len(), 500);

    let ns = build_namespace(&parsed, &ProjectionOptions::default());
    // 500 conversation directories + _index.json, all names unique
    assert_eq!(ns.len(), 501);
    assert!(ns.contains("2024-02-01_topic-0"));
    assert!(ns.contains("2024-02-01_topic-0_2"));
    assert!(ns.contains("2024-02-01_topic-0_50"));
    assert!(!ns.contains("2024-02-01_topic-0_51"));
    assert!(ns.contains("2024-02-05_topic-9_50"));
}

#[test]
fn test_scale_long_branching_conversation() {
    let mut builder = ChatGptConversationBuilder::new("long", "Long Thread");
    for i in 0..1000 {
        let role = if i % 2 == 0 { "user" } else { "assistant" };
        builder = builder.message(role, &format!("turn {}", i));
        if i % 7 == 0 {
            builder = builder.branch(role, "regenerated alternative");
        }
    }
    let export = ExportBuilder::new().with_conversations(vec![builder.to_json()]).build_zip();

    let archive = Archive::open(export.path()).unwrap();
    let conversations = Provider::ChatGpt.parse(&archive);

    assert_eq!(conversations[0].messages.len(), 1000);
    assert!(conversations[0].messages.iter().all(|m| m.content.starts_with("turn ")));
}

#[test]
fn test_scale_repeated_projection_is_stable() {
    let export = full_claude_export().build_zip();
    let archive = Archive::open(export.path()).unwrap();
    let parsed = Provider::Claude.load(&archive);

    let expected = build_namespace(&parsed, &ProjectionOptions::default()).len();
    for i in 0..200 {
        let ns = build_namespace(&parsed, &ProjectionOptions::default());
        assert_eq!(ns.len(), expected, "Iteration {} should match", i);
    }
}
