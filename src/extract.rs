//! Structural scanners turning document body lines into content units.
//!
//! Each scanner recognizes exactly one construct and is independent of the
//! others; front matter must already be stripped from the input.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::QueryKind;
use crate::engine::ExecError;

static ORDERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s").expect("valid ordered list pattern"));

const TASK_MARKERS: [&str; 7] = [
    "- [ ]", "- [x]", "- [X]", "- [.]", "- [o]", "- [O]", "- [0]",
];

const FENCE: &str = "```";

/// Content unit kinds the scanners can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Task,
    Paragraph,
    OrderedList,
    UnorderedList,
    FencedCode,
}

impl TryFrom<QueryKind> for UnitKind {
    type Error = ExecError;

    fn try_from(kind: QueryKind) -> Result<Self, Self::Error> {
        match kind {
            QueryKind::Task => Ok(UnitKind::Task),
            QueryKind::Paragraph => Ok(UnitKind::Paragraph),
            QueryKind::OrderedList => Ok(UnitKind::OrderedList),
            QueryKind::UnorderedList => Ok(UnitKind::UnorderedList),
            QueryKind::FencedCode => Ok(UnitKind::FencedCode),
            other => Err(ExecError::UnsupportedUnitKind(other)),
        }
    }
}

/// Runs the scanner for `kind` over body lines.
pub fn extract(kind: UnitKind, lines: &[String]) -> Vec<String> {
    match kind {
        UnitKind::Task => tasks(lines),
        UnitKind::Paragraph => paragraphs(lines),
        UnitKind::OrderedList => ordered_lists(lines),
        UnitKind::UnorderedList => unordered_lists(lines),
        UnitKind::FencedCode => fenced_code(lines),
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with(FENCE)
}

/// Checkbox lines, one unit per line.
pub fn tasks(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| {
            let trimmed = line.trim_start();
            TASK_MARKERS.iter().any(|marker| trimmed.starts_with(marker))
        })
        .cloned()
        .collect()
}

/// Prose lines: everything except headings, lists and fenced code.
///
/// Runs of blank lines collapse to one and a blank line at either end of the
/// result is dropped. Each remaining line is its own unit.
pub fn paragraphs(lines: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = vec![];
    let mut in_code = false;
    let mut in_list = false;

    for line in lines {
        if is_fence(line) {
            in_code = !in_code;
            continue;
        }
        if in_code || line.starts_with('#') {
            continue;
        }
        if line.starts_with("- ") || line.starts_with("* ") || ORDERED_MARKER.is_match(line) {
            in_list = true;
            continue;
        }

        let blank = is_blank(line);
        if in_list && blank {
            in_list = false;
        }
        if in_list && indent_of(line) > 0 {
            continue;
        }

        if blank && kept.last().is_some_and(|prev| is_blank(prev)) {
            continue;
        }
        kept.push(line.clone());
    }

    if kept.first().is_some_and(|l| is_blank(l)) {
        kept.remove(0);
    }
    if kept.last().is_some_and(|l| is_blank(l)) {
        kept.pop();
    }
    kept
}

/// Builder for multi-line list items.
#[derive(Default)]
struct ItemCollector {
    items: Vec<String>,
    current: Vec<String>,
    /// Blank lines at the end of `current` not yet followed by content
    trailing_blanks: usize,
}

impl ItemCollector {
    fn push(&mut self, line: &str) {
        self.current.push(line.to_string());
        self.trailing_blanks = 0;
    }

    fn push_blank(&mut self, line: &str) {
        self.current.push(line.to_string());
        self.trailing_blanks += 1;
    }

    /// Closes the current item, dropping its trailing blank lines.
    fn flush(&mut self) {
        let keep = self.current.len() - self.trailing_blanks;
        if keep > 0 {
            self.items.push(self.current[..keep].join("\n"));
        }
        self.current.clear();
        self.trailing_blanks = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.items
    }
}

fn is_unordered_marker(trimmed: &str) -> bool {
    trimmed.starts_with('-') && !trimmed.starts_with("- [") && trimmed != "---"
}

/// Dash list items with their continuation lines.
///
/// Markers at or left of the current item's indent start a new item; deeper
/// markers and deeper lines belong to the current one.
pub fn unordered_lists(lines: &[String]) -> Vec<String> {
    let mut collector = ItemCollector::default();
    let mut in_list = false;
    let mut indent_level = 0;

    for line in lines {
        let trimmed = line.trim();
        let indent = indent_of(line);

        if is_unordered_marker(trimmed) && (!in_list || indent <= indent_level) {
            collector.flush();
            collector.push(line);
            in_list = true;
            indent_level = indent;
        } else if in_list && trimmed.is_empty() {
            collector.push_blank(line);
        } else if in_list && (trimmed.starts_with('-') || indent > indent_level) {
            collector.push(line);
        } else {
            collector.flush();
            in_list = false;
            indent_level = 0;
        }
    }

    collector.finish()
}

/// Numbered list items with their continuation lines.
///
/// A blank line ends the item and the list.
pub fn ordered_lists(lines: &[String]) -> Vec<String> {
    let mut collector = ItemCollector::default();
    let mut in_list = false;
    let mut indent_level = 0;

    for line in lines {
        let trimmed = line.trim();
        let indent = indent_of(line);

        if ORDERED_MARKER.is_match(trimmed) && (!in_list || indent <= indent_level) {
            collector.flush();
            collector.push(line);
            in_list = true;
            indent_level = indent;
        } else if in_list && !trimmed.is_empty() && indent > indent_level {
            collector.push(line);
        } else {
            collector.flush();
            in_list = false;
            indent_level = 0;
        }
    }

    collector.finish()
}

/// Contents of paired ``` fences, one unit per block.
pub fn fenced_code(lines: &[String]) -> Vec<String> {
    let mut blocks = vec![];
    let mut current: Option<Vec<&str>> = None;

    for line in lines {
        if is_fence(line) {
            match current.take() {
                Some(block) => blocks.push(block.join("\n")),
                None => current = Some(vec![]),
            }
        } else if let Some(block) = current.as_mut() {
            block.push(line);
        }
    }

    blocks
}
