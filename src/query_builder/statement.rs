use std::fmt;

use crate::types::Value;

/// A compiled SQL fragment with `?` placeholders and its positional inputs.
///
/// Fragments are concatenated in a fixed order: base statement, joins, filter,
/// sort. `Display` back-substitutes literal values for inspection only;
/// execution always binds [`QueryNode::inputs`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryNode {
    sql: String,
    inputs: Vec<Value>,
}

impl QueryNode {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            inputs: Vec::new(),
        }
    }

    pub fn with_inputs(sql: impl Into<String>, inputs: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            inputs,
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn inputs(&self) -> &[Value] {
        &self.inputs
    }

    /// Append another fragment, keeping input order aligned with placeholder order.
    pub fn append(&mut self, other: QueryNode) {
        self.sql.push_str(&other.sql);
        self.inputs.extend(other.inputs);
    }

    /// Inputs formatted for diagnostics: strings quoted, everything else stringified.
    #[must_use]
    pub fn display_inputs(&self) -> Vec<String> {
        self.inputs.iter().map(Value::to_display_input).collect()
    }

    /// The statement with each placeholder replaced by its literal-quoted input.
    #[must_use]
    pub fn render_literals(&self) -> String {
        substitute_placeholders(&self.sql, &self.inputs)
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_literals())
    }
}

/// Replace bare `?` placeholders, left to right, skipping quoted text and comments.
///
/// Placeholders without a matching input are left as `?`.
fn substitute_placeholders(sql: &str, inputs: &[Value]) -> String {
    let mut out = String::with_capacity(sql.len() + inputs.len() * 4);
    let mut state = State::Normal;
    let mut next_input = inputs.iter();
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Normal => match c {
                '\'' => state = State::SingleQuoted,
                '"' => state = State::DoubleQuoted,
                '-' if chars.peek() == Some(&'-') => state = State::LineComment,
                '/' if chars.peek() == Some(&'*') => state = State::BlockComment,
                '?' => {
                    if let Some(value) = next_input.next() {
                        out.push_str(&value.to_literal());
                        continue;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if c == '\'' {
                    state = State::Normal;
                }
            }
            State::DoubleQuoted => {
                if c == '"' {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    out.push(c);
                    if let Some(slash) = chars.next() {
                        out.push(slash);
                    }
                    state = State::Normal;
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

// An escaped quote ('') closes and immediately reopens the literal, so no extra state is needed.
#[derive(Clone, Copy)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_in_order() {
        let node = QueryNode::with_inputs(
            "SELECT id FROM users WHERE name = ? AND age > ?",
            vec![Value::from("o'neil"), Value::from(30)],
        );
        assert_eq!(
            node.to_string(),
            "SELECT id FROM users WHERE name = 'o''neil' AND age > 30"
        );
        // the compiled form is untouched
        assert_eq!(node.sql(), "SELECT id FROM users WHERE name = ? AND age > ?");
    }

    #[test]
    fn skips_literals_and_comments() {
        let node = QueryNode::with_inputs(
            "SELECT '?', \"?\" -- ?\n/* ? */ FROM t WHERE a = ?",
            vec![Value::from(1)],
        );
        assert_eq!(
            node.to_string(),
            "SELECT '?', \"?\" -- ?\n/* ? */ FROM t WHERE a = 1"
        );
    }

    #[test]
    fn leaves_unmatched_placeholders() {
        let node = QueryNode::with_inputs("VALUES (?, ?)", vec![Value::Null]);
        assert_eq!(node.to_string(), "VALUES (NULL, ?)");
    }

    #[test]
    fn append_keeps_inputs_aligned() {
        let mut base = QueryNode::new("DELETE FROM t");
        base.append(QueryNode::with_inputs(" WHERE a = ?", vec![Value::from(2)]));
        assert_eq!(base.sql(), "DELETE FROM t WHERE a = ?");
        assert_eq!(base.inputs(), &[Value::Integer(2)]);
        assert_eq!(base.display_inputs(), vec!["2".to_string()]);
    }
}
