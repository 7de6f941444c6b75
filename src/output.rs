//! Text rendering of query results.
//!
//! # Features
//!
//! - **Pipe tables** via [`Table`] - aligned markdown tables with a dashed
//!   header separator
//! - **Grouped blocks** via [`render_groups()`] - `- key` headers with their
//!   items indented below
//!
//! # Examples
//!
//! ```
//! use dql_lang::output::Table;
//!
//! let mut table = Table::new(vec!["File".to_string(), "Title".to_string()]);
//! table.push_row(vec!["a.md".to_string(), "Groceries".to_string()]);
//!
//! assert_eq!(
//!     table.render(),
//!     "| File | Title     |\n|------|-----------|\n| a.md | Groceries |\n"
//! );
//! ```

use std::cmp::Ordering;

use crate::ast::{Direction, QueryKind};

/// Rows of a table result with their header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Table {
            headers,
            rows: vec![],
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Stable multi-key sort over `(column index, direction)` keys.
    ///
    /// The first key that tells two rows apart decides their order; rows
    /// equal on every key keep their relative order. Mixed numeric and text
    /// cells do not form a total order, so rows go through `merge_sort`
    /// rather than `sort_by`, which may panic on such input.
    pub fn sort_rows(&mut self, keys: &[(usize, Direction)]) {
        if keys.is_empty() {
            return;
        }
        let compare = |a: &Vec<String>, b: &Vec<String>| {
            keys.iter()
                .map(|&(index, direction)| {
                    let ord = compare_cells(cell(a, index), cell(b, index));
                    match direction {
                        Direction::Asc => ord,
                        Direction::Desc => ord.reverse(),
                    }
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        };

        let rows = std::mem::take(&mut self.rows);
        self.rows = merge_sort(rows, &compare);
    }

    /// Display width of every column, in characters.
    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, value) in row.iter().enumerate() {
                let width = value.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut result = String::new();

        write_row(&mut result, &self.headers, &widths);
        for width in &widths {
            result.push('|');
            result.push_str(&"-".repeat(width + 2));
        }
        result.push_str("|\n");
        for row in &self.rows {
            write_row(&mut result, row, &widths);
        }

        result
    }
}

/// Top-down merge sort, stable for any comparator.
///
/// On a tie the element from the left half goes first. An inconsistent
/// comparator only yields some permutation of the input.
fn merge_sort<T>(mut items: Vec<T>, compare: &impl Fn(&T, &T) -> Ordering) -> Vec<T> {
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let mut left = merge_sort(items, compare).into_iter().peekable();
    let mut right = merge_sort(right, compare).into_iter().peekable();

    let mut merged = Vec::with_capacity(left.len() + right.len());
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            _ => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    merged.extend(left);
    merged.extend(right);
    merged
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", String::as_str)
}

/// Numeric comparison when both cells are numbers, byte order otherwise.
fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    for (value, width) in cells.iter().zip(widths) {
        out.push_str(&format!("| {:<width$} ", value, width = width));
    }
    out.push_str("|\n");
}

/// Renders grouped units as `- key` blocks.
///
/// Items are indented by four spaces (every line of a multi-line item);
/// paragraph and code items get a blank line after them, and every group is
/// followed by a blank line.
pub fn render_groups(groups: &[(String, Vec<&str>)], kind: QueryKind) -> String {
    let spaced = matches!(kind, QueryKind::Paragraph | QueryKind::FencedCode);
    let mut result = String::new();

    for (key, items) in groups {
        result.push_str(&format!("- {}\n", key));
        for item in items {
            for line in item.lines() {
                if !line.is_empty() {
                    result.push_str("    ");
                    result.push_str(line);
                }
                result.push('\n');
            }
            if spaced {
                result.push('\n');
            }
        }
        result.push('\n');
    }

    result
}
