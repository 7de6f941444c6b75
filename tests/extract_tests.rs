// tests/extract_tests.rs

use chrono::{Local, TimeZone};
use dql_lang::extract::{self, UnitKind};
use dql_lang::metadata::{add_file_metadata, extract_metadata, split_front_matter};
use dql_lang::{FileStat, Metadata, MetadataValue};
use pretty_assertions::assert_eq;
use std::path::Path;

fn lines(text: &str) -> Vec<String> {
    text.lines().map(String::from).collect()
}

// ============================================================================
// Front matter
// ============================================================================

#[test]
fn test_split_front_matter() {
    let doc = lines("---\ntitle: a\n---\nbody");
    let (front, body) = split_front_matter(&doc);
    assert_eq!(front, &lines("title: a")[..]);
    assert_eq!(body, &lines("body")[..]);
}

#[test]
fn test_unclosed_front_matter_is_body() {
    let doc = lines("---\ntitle: a\nbody");
    let (front, body) = split_front_matter(&doc);
    assert!(front.is_empty());
    assert_eq!(body.len(), 3);
}

#[test]
fn test_front_matter_must_start_the_document() {
    let doc = lines("\n---\ntitle: a\n---");
    let (front, _) = split_front_matter(&doc);
    assert!(front.is_empty());
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn test_front_matter_values_are_typed() {
    let doc = lines("---\nTitle: \"Weekly review\"\npriority: 2\ndone: true\nurl: http://x\n---");
    let metadata = extract_metadata(&doc);
    assert_eq!(
        metadata.get("title"),
        Some(&MetadataValue::String("Weekly review".to_string()))
    );
    assert_eq!(metadata.get("priority"), Some(&MetadataValue::Integer(2)));
    assert_eq!(metadata.get("DONE"), Some(&MetadataValue::Boolean(true)));
    assert_eq!(metadata.text("url").as_deref(), Some("http://x"));
}

#[test]
fn test_inline_annotation_forms() {
    let doc = lines(
        "status:: open\n\
         **Owner**:: Jane\n\
         [due:: 2024-05-01] | [reviewed:: false]\n\
         Call Bob [phone:: 555-0100] about the [next step:: invoice]",
    );
    let metadata = extract_metadata(&doc);
    assert_eq!(metadata.text("status").as_deref(), Some("open"));
    assert_eq!(metadata.text("owner").as_deref(), Some("Jane"));
    assert_eq!(metadata.text("due").as_deref(), Some("2024-05-01"));
    assert_eq!(metadata.get("reviewed"), Some(&MetadataValue::Boolean(false)));
    assert_eq!(metadata.text("phone").as_deref(), Some("555-0100"));
    assert_eq!(metadata.text("next-step").as_deref(), Some("invoice"));
    assert_eq!(metadata.len(), 6);
}

#[test]
fn test_indented_inline_annotation() {
    let metadata = extract_metadata(&lines("    author:: Jane"));
    assert_eq!(metadata.text("author").as_deref(), Some("Jane"));
}

#[test]
fn test_later_value_wins() {
    let doc = lines("---\nauthor: Jane\n---\nauthor:: John");
    assert_eq!(extract_metadata(&doc).text("author").as_deref(), Some("John"));
}

#[test]
fn test_lines_without_annotations_are_ignored() {
    let doc = lines("just text\n- [ ] a task\nkey: value");
    assert!(extract_metadata(&doc).is_empty());
}

#[test]
fn test_file_metadata() {
    let created = Local.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
    let modified = Local.with_ymd_and_hms(2024, 3, 4, 12, 30, 0).unwrap();
    let stat = FileStat {
        size: 120,
        created,
        modified,
    };

    let mut metadata = Metadata::new();
    metadata.insert("file.name", "user value");
    add_file_metadata(&mut metadata, Path::new("notes/todo.md"), &stat);

    assert_eq!(metadata.text("file.name").as_deref(), Some("todo.md"));
    assert_eq!(metadata.text("file.folder").as_deref(), Some("notes"));
    assert_eq!(metadata.text("file.path").as_deref(), Some("notes/todo.md"));
    assert_eq!(metadata.text("file.shortname").as_deref(), Some("todo"));
    assert_eq!(
        metadata.text("file.link").as_deref(),
        Some("[todo.md](notes/todo.md)")
    );
    assert_eq!(metadata.get("file.size"), Some(&MetadataValue::Integer(120)));
    assert_eq!(metadata.text("file.cday").as_deref(), Some("2024-01-02"));
    assert_eq!(metadata.text("file.mday").as_deref(), Some("2024-03-04"));
    assert_eq!(metadata.text("file.mtime"), Some(modified.to_rfc3339()));
}

#[test]
fn test_file_folder_without_parent() {
    let now = Local::now();
    let stat = FileStat {
        size: 0,
        created: now,
        modified: now,
    };
    let mut metadata = Metadata::new();
    add_file_metadata(&mut metadata, Path::new("todo.md"), &stat);
    assert_eq!(metadata.text("file.folder").as_deref(), Some("."));
}

// ============================================================================
// Content units
// ============================================================================

#[test]
fn test_unordered_list_items() {
    let doc = lines("- one\n  continued\n\n- two\n  - nested\ntext\n- three");
    assert_eq!(
        extract::extract(UnitKind::UnorderedList, &doc),
        vec!["- one\n  continued", "- two\n  - nested", "- three"]
    );
}

#[test]
fn test_unordered_list_keeps_interior_blank_lines() {
    let doc = lines("- a\n\n  b\n\n\nafter");
    assert_eq!(extract::unordered_lists(&doc), vec!["- a\n\n  b"]);
}

#[test]
fn test_unordered_list_skips_tasks() {
    let doc = lines("- [ ] task\n- item");
    assert_eq!(extract::unordered_lists(&doc), vec!["- item"]);
}

#[test]
fn test_ordered_list_items() {
    let doc = lines("1. first\n   detail\n2. second\n\n3. third\nplain");
    assert_eq!(
        extract::extract(UnitKind::OrderedList, &doc),
        vec!["1. first\n   detail", "2. second", "3. third"]
    );
}

#[test]
fn test_fenced_code_blocks() {
    let doc = lines("```rust\nlet a = 1;\n```\ntext\n  ```\nb\n\nc\n```\n```\nunclosed");
    assert_eq!(
        extract::extract(UnitKind::FencedCode, &doc),
        vec!["let a = 1;", "b\n\nc"]
    );
}

#[test]
fn test_paragraph_lines() {
    let doc = lines(
        "# Title\n\nFirst line.\nSecond line.\n\n- item\n  cont\n\nAfter list.\n```\nx\n```\n\n\nEnd.",
    );
    assert_eq!(
        extract::extract(UnitKind::Paragraph, &doc),
        vec!["First line.", "Second line.", "", "After list.", "", "End."]
    );
}

#[test]
fn test_tasks() {
    let doc = lines("- [ ] open\ntext\n  - [x] done\n- [O] cancelled\n- [-] other");
    assert_eq!(
        extract::extract(UnitKind::Task, &doc),
        vec!["- [ ] open", "  - [x] done", "- [O] cancelled"]
    );
}

#[test]
fn test_empty_document() {
    for kind in [
        UnitKind::Task,
        UnitKind::Paragraph,
        UnitKind::OrderedList,
        UnitKind::UnorderedList,
        UnitKind::FencedCode,
    ] {
        assert!(extract::extract(kind, &[]).is_empty());
    }
}
