// tests/integration_tests.rs
//
// End-to-end runs of the engine over documents on disk and in memory.

use chrono::{Local, TimeZone};
use dql_lang::cli::{run_query, RunOptions};
use dql_lang::{
    parse, Diagnostics, DocumentSource, Engine, ExecError, FileStat, FsSource, QueryError,
    TokenKind,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Documents kept in memory, keyed by path.
struct MemorySource {
    docs: BTreeMap<PathBuf, String>,
}

impl MemorySource {
    fn new(docs: &[(&str, &str)]) -> Self {
        MemorySource {
            docs: docs
                .iter()
                .map(|(path, text)| (PathBuf::from(path), text.to_string()))
                .collect(),
        }
    }
}

impl DocumentSource for MemorySource {
    fn resolve(&self, source: &str) -> Result<Vec<PathBuf>, ExecError> {
        let found: Vec<PathBuf> = self
            .docs
            .keys()
            .filter(|path| path.as_path() == Path::new(source) || path.starts_with(source))
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(ExecError::path(
                Path::new(source),
                io::Error::new(io::ErrorKind::NotFound, "no such document"),
            ));
        }
        Ok(found)
    }

    fn read_lines(&self, path: &Path) -> Result<Vec<String>, ExecError> {
        self.docs
            .get(path)
            .map(|text| text.lines().map(String::from).collect())
            .ok_or_else(|| ExecError::read(path, io::ErrorKind::NotFound.into()))
    }

    fn stat(&self, path: &Path) -> Result<FileStat, ExecError> {
        let text = self
            .docs
            .get(path)
            .ok_or_else(|| ExecError::read(path, io::ErrorKind::NotFound.into()))?;
        let time = Local.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        Ok(FileStat {
            size: text.len() as u64,
            created: time,
            modified: time,
        })
    }
}

fn project_notes() -> MemorySource {
    MemorySource::new(&[
        (
            "mem/a.md",
            "---\nproject: alpha\nauthor: John Doe\n---\n- [ ] write item2\n- [x] ship item10\n- [ ] review item1",
        ),
        ("mem/b.md", "---\nproject: beta\n---\n- [ ] plan"),
        ("mem/c.md", "- [X] misc"),
        ("sorted.md", "- [ ] item10\n- [ ] item2\n- [x] item1"),
    ])
}

fn run_mem(query: &str) -> String {
    Engine::new(project_notes())
        .execute(query)
        .unwrap_or_else(|e| panic!("{}: {}", query, e))
        .output
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn run_fs(query: &str) -> Result<String, QueryError> {
    Engine::new(FsSource::new()).execute(query).map(|e| e.output)
}

// ============================================================================
// TASK
// ============================================================================

#[test]
fn test_task_checked() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "tasks.md",
        "# Tasks\n- [ ] Task 1\n- [X] Task 2\n- [ ] Task 3\n- [X] Task 4\n",
    );

    let checked = run_fs(&format!(r#"TASK FROM "{}" WHERE CHECKED"#, path.display())).unwrap();
    assert_eq!(checked, "- [X] Task 2\n- [X] Task 4");

    let open = run_fs(&format!(r#"TASK FROM "{}" WHERE NOT CHECKED"#, path.display())).unwrap();
    assert_eq!(open, "- [ ] Task 1\n- [ ] Task 3");
}

#[test]
fn test_task_from_directory_skips_front_matter() {
    let output = run_mem(r#"TASK FROM "mem/" WHERE CONTAINS "item""#);
    assert_eq!(output, "- [ ] write item2\n- [x] ship item10\n- [ ] review item1");
}

// ============================================================================
// UNORDEREDLIST
// ============================================================================

#[test]
fn test_unordered_list_contains() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "test.md",
        "- Item 1\n- Item 2\n- Item 3 is a really\n  long item that wraps\n  over three lines\n- Item 4\n",
    );

    let really = run_fs(&format!(
        r#"UNORDEREDLIST FROM "{}" WHERE CONTAINS "really""#,
        path.display()
    ))
    .unwrap();
    assert_eq!(
        really,
        "- Item 3 is a really\n  long item that wraps\n  over three lines"
    );

    let others = run_fs(&format!(
        r#"UNORDEREDLIST FROM "{}" WHERE NOT CONTAINS "REALLY""#,
        path.display()
    ))
    .unwrap();
    assert_eq!(others, "- Item 1\n- Item 2\n- Item 4");
}

// ============================================================================
// TABLE
// ============================================================================

fn todos() -> TempDir {
    let dir = TempDir::new().unwrap();
    let titles = ["Buy milk", "Call Bob", "Fix the bike", "Plan trip", "Read book"];
    for (i, title) in titles.iter().enumerate() {
        write(
            dir.path(),
            &format!("todos/todo{}.md", i + 1),
            &format!("---\ntitle: {}\n---\n- [ ] something\n", title),
        );
    }
    write(dir.path(), "todos/notes.txt", "title:: ignored");
    dir
}

#[test]
fn test_table_with_file_column() {
    let dir = todos();
    let output = run_fs(&format!(
        r#"TABLE file.folder AS "Folder", title AS "Title" FROM "{}""#,
        dir.path().join("todos").display()
    ))
    .unwrap();

    assert_eq!(
        output,
        "| File     | Folder | Title        |\n\
         |----------|--------|--------------|\n\
         | todo1.md | todos  | Buy milk     |\n\
         | todo2.md | todos  | Call Bob     |\n\
         | todo3.md | todos  | Fix the bike |\n\
         | todo4.md | todos  | Plan trip    |\n\
         | todo5.md | todos  | Read book    |\n"
    );
}

#[test]
fn test_table_no_id() {
    let dir = todos();
    let output = run_fs(&format!(
        r#"TABLE NO ID file.folder AS "Folder", title AS "Title" FROM "{}""#,
        dir.path().join("todos").display()
    ))
    .unwrap();

    assert_eq!(
        output,
        "| Folder | Title        |\n\
         |--------|--------------|\n\
         | todos  | Buy milk     |\n\
         | todos  | Call Bob     |\n\
         | todos  | Fix the bike |\n\
         | todos  | Plan trip    |\n\
         | todos  | Read book    |\n"
    );
}

#[test]
fn test_table_file_path_column() {
    let dir = todos();
    let root = dir.path().join("todos");
    let output = run_fs(&format!(
        r#"TABLE NO ID file.path AS "Path" FROM "{}""#,
        root.display()
    ))
    .unwrap();
    assert!(output.contains(&root.join("todo1.md").display().to_string()));
}

#[test]
fn test_table_where_and_sort() {
    let output = run_mem(r#"TABLE project AS "Project" FROM "mem/" WHERE [project] CONTAINS "a" SORT [Project] DESC"#);
    assert_eq!(
        output,
        "| File | Project |\n\
         |------|---------|\n\
         | b.md | beta    |\n\
         | a.md | alpha   |\n"
    );
}

#[test]
fn test_table_missing_value_is_empty_cell() {
    let output = run_mem(r#"TABLE NO ID project FROM "mem/c.md""#);
    assert_eq!(output, "| project |\n|---------|\n|         |\n");
}

// ============================================================================
// LIST
// ============================================================================

#[test]
fn test_list_where_metadata() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.md", "---\nauthor: \"John Doe\"\n---\ntext");
    write(dir.path(), "b.md", "author:: John Doe\n");
    write(dir.path(), "c.md", "author:: Jane Doe\n");
    write(dir.path(), "sub/d.md", "[author:: John Doe]\n");
    write(dir.path(), "e.md", "no metadata here\n");

    let output = run_fs(&format!(
        r#"LIST FROM "{}" WHERE [author] IS "John Doe""#,
        dir.path().display()
    ))
    .unwrap();
    assert_eq!(output, "- a.md\n- b.md\n- d.md");
}

#[test]
fn test_list_keeps_duplicate_sources() {
    assert_eq!(
        run_mem(r#"LIST FROM "mem/b.md", "mem/b.md""#),
        "- b.md\n- b.md"
    );
}

#[test]
fn test_list_file_metadata_overrides_user_keys() {
    let source = MemorySource::new(&[("x/note.md", "[file.name:: fake.md]\n")]);
    let output = Engine::new(source)
        .execute(r#"LIST FROM "x/" WHERE [file.name] IS "note.md""#)
        .unwrap()
        .output;
    assert_eq!(output, "- note.md");
}

// ============================================================================
// SORT, GROUP BY, LIMIT
// ============================================================================

#[test]
fn test_sort_naturally() {
    assert_eq!(
        run_mem(r#"TASK FROM "sorted.md" WHERE NOT CHECKED SORT"#),
        "- [ ] item2\n- [ ] item10"
    );
    assert_eq!(
        run_mem(r#"TASK FROM "sorted.md" SORT DESC"#),
        "- [x] item1\n- [ ] item10\n- [ ] item2"
    );
}

#[test]
fn test_limit() {
    assert_eq!(run_mem(r#"TASK FROM "mem/" LIMIT 2"#), "- [ ] write item2\n- [x] ship item10");
    assert_eq!(run_mem(r#"TASK FROM "mem/" LIMIT 0"#), "");
}

#[test]
fn test_group_by() {
    assert_eq!(
        run_mem(r#"TASK FROM "mem/" GROUP BY [project]"#),
        "- Unknown\n    - [X] misc\n\n\
         - alpha\n    - [ ] write item2\n    - [x] ship item10\n    - [ ] review item1\n\n\
         - beta\n    - [ ] plan\n\n"
    );
}

#[test]
fn test_group_by_with_limits() {
    assert_eq!(
        run_mem(r#"TASK FROM "mem/" WHERE NOT CHECKED GROUP BY 1 [project] LIMIT 1"#),
        "- alpha\n    - [ ] write item2\n\n"
    );
}

// ============================================================================
// Errors and diagnostics
// ============================================================================

#[test]
fn test_missing_path() {
    let dir = TempDir::new().unwrap();
    let err = run_fs(&format!(
        r#"TASK FROM "{}""#,
        dir.path().join("missing.md").display()
    ))
    .unwrap_err();
    assert!(matches!(
        err,
        QueryError::Exec(ExecError::PathResolution { .. })
    ));
}

#[test]
fn test_parse_error_aborts() {
    assert!(matches!(
        Engine::new(project_notes()).execute(r#"TASK "mem/""#),
        Err(QueryError::Parse(_))
    ));
}

#[test]
fn test_diagnostics() {
    let execution = Engine::new(project_notes())
        .with_diagnostics(Diagnostics {
            emit_tokens: true,
            emit_metadata: true,
        })
        .execute(r#"LIST FROM "mem/""#)
        .unwrap();

    let tokens = execution.tokens.unwrap();
    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[3].kind, TokenKind::Eof);

    let paths: Vec<&Path> = execution.metadata.iter().map(|d| d.path.as_path()).collect();
    assert_eq!(
        paths,
        vec![Path::new("mem/a.md"), Path::new("mem/b.md"), Path::new("mem/c.md")]
    );
    assert_eq!(
        execution.metadata[0].metadata.text("author").as_deref(),
        Some("John Doe")
    );
    assert_eq!(
        execution.metadata[2].metadata.text("file.cday").as_deref(),
        Some("2024-05-01")
    );
}

#[test]
fn test_run_parsed_query() {
    let engine = Engine::new(project_notes());
    let query = parse(r#"TASK FROM "mem/" WHERE CHECKED"#).unwrap();
    assert_eq!(engine.run(&query).unwrap(), "- [x] ship item10\n- [X] misc");

    let query = parse(r#"LIST FROM "nowhere/""#).unwrap();
    assert!(matches!(
        engine.run(&query),
        Err(ExecError::PathResolution { .. })
    ));
}

#[test]
fn test_no_diagnostics_by_default() {
    let execution = Engine::new(project_notes()).execute(r#"LIST FROM "mem/""#).unwrap();
    assert!(execution.tokens.is_none());
    assert!(execution.metadata.is_empty());
}

#[test]
fn test_run_query_json_dumps() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "n.md", "---\npriority: 3\n---\n- [ ] x\n");

    let result = run_query(&RunOptions {
        query: format!(r#"TASK FROM "{}""#, path.display()),
        show_tokens: true,
        show_metadata: true,
    })
    .unwrap();

    assert_eq!(result.output, "- [ ] x");
    let tokens = result.tokens.unwrap();
    assert_eq!(tokens[0], serde_json::json!({ "kind": "KEYWORD", "text": "TASK" }));
    let metadata = result.metadata.unwrap();
    assert_eq!(metadata[0]["metadata"]["priority"], serde_json::json!(3));
    assert_eq!(metadata[0]["metadata"]["file.name"], serde_json::json!("n.md"));
}
