/// Test applied to a condition's subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring
    ///
    /// # Example
    /// ```text
    /// CONTAINS "review"
    /// ```
    Contains,

    /// Exact equality
    ///
    /// # Example
    /// ```text
    /// [status] IS "done"
    /// ```
    Is,

    /// Task checkbox is ticked (`[x]` or `[X]`)
    Checked,
}

/// How a condition folds into the result of the conditions before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

/// Single `WHERE` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub negated: bool,

    /// Metadata field tested instead of the unit text
    pub field: Option<String>,

    pub predicate: Predicate,

    /// Right-hand side for `CONTAINS` / `IS`
    pub operand: Option<String>,

    pub combinator: Combinator,
}

impl Condition {
    pub fn is_metadata_subject(&self) -> bool {
        self.field.is_some()
    }
}

/// Conditions of a `WHERE` clause, evaluated strictly left to right.
///
/// There is no precedence and no grouping: `a OR b AND c` means
/// `(a OR b) AND c`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WhereClause {
    pub conditions: Vec<Condition>,
}
