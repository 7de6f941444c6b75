use crate::{
    ast::{Combinator, Condition, Predicate, WhereClause},
    value::Metadata,
};

/// Evaluates `WHERE` conditions against one candidate.
///
/// The candidate is the text of a content unit together with the metadata of
/// the document it came from. Table rows have no unit text and are evaluated
/// with an empty string.
pub struct Evaluator<'a> {
    text: &'a str,
    metadata: &'a Metadata,
}

impl<'a> Evaluator<'a> {
    pub fn new(text: &'a str, metadata: &'a Metadata) -> Self {
        Evaluator { text, metadata }
    }

    /// Folds all conditions left to right.
    ///
    /// The first result seeds the accumulator, every later condition is
    /// merged with its own combinator: `((c1 op2 c2) op3 c3) ...`. An empty
    /// list passes.
    ///
    /// # Examples
    ///
    /// ```
    /// use dql_lang::{Evaluator, Lexer, Metadata, Parser};
    ///
    /// let mut parser = Parser::new(Lexer::new(
    ///     r#"TASK FROM x WHERE CONTAINS "milk" OR CONTAINS "bread" AND NOT CHECKED"#,
    /// ))
    /// .unwrap();
    /// let query = parser.parse_query().unwrap();
    /// let clause = query.where_clause.unwrap();
    /// let metadata = Metadata::new();
    ///
    /// assert!(Evaluator::new("- [ ] buy milk", &metadata).matches(&clause.conditions));
    /// assert!(!Evaluator::new("- [x] buy milk", &metadata).matches(&clause.conditions));
    /// ```
    pub fn matches(&self, conditions: &[Condition]) -> bool {
        let mut results = conditions.iter().map(|c| (c.combinator, self.eval_condition(c)));

        let Some((_, first)) = results.next() else {
            return true;
        };

        results.fold(first, |acc, (combinator, met)| match combinator {
            Combinator::And => acc && met,
            Combinator::Or => acc || met,
        })
    }

    /// Like [`Evaluator::matches`], with a missing clause passing everything.
    pub fn matches_clause(&self, clause: Option<&WhereClause>) -> bool {
        clause.is_none_or(|clause| self.matches(&clause.conditions))
    }

    fn subject(&self, condition: &Condition) -> String {
        match &condition.field {
            Some(field) => self.metadata.text(field).unwrap_or_default(),
            None => self.text.to_string(),
        }
    }

    fn eval_condition(&self, condition: &Condition) -> bool {
        let subject = self.subject(condition);
        let operand = condition.operand.as_deref().unwrap_or_default();

        let met = match condition.predicate {
            Predicate::Contains => subject.to_lowercase().contains(&operand.to_lowercase()),
            Predicate::Is => subject == operand,
            Predicate::Checked => subject.contains("[x]") || subject.contains("[X]"),
        };

        met != condition.negated
    }
}
