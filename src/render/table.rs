use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::render::palette;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub name: String,
}

/// When a cell rule fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Condition {
    Equals(f64),
    GreaterThan(f64),
    /// null or the empty string
    Empty,
}

impl Condition {
    pub fn matches(&self, cell: &Value) -> bool {
        match self {
            Condition::Equals(v) => cell.as_f64().is_some_and(|c| (c - v).abs() < 1e-9),
            Condition::GreaterThan(v) => cell.as_f64().is_some_and(|c| c > *v),
            Condition::Empty => match cell {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRule {
    pub column: String,
    pub when: Condition,
    pub background: String,
    pub color: String,
}

impl CellRule {
    pub fn new(column: &str, when: Condition, background: &str) -> Self {
        Self {
            column: column.to_string(),
            when,
            background: background.to_string(),
            color: "black".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Map<String, Value>>,
    pub rules: Vec<CellRule>,
}

impl DataTable {
    pub fn new(columns: &[(&str, &str)]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(id, name)| Column { id: id.to_string(), name: name.to_string() })
                .collect(),
            rows: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: CellRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends a row from any serialisable record. Non-object values are
    /// ignored.
    pub fn push_row<T: Serialize>(&mut self, row: &T) {
        if let Ok(Value::Object(map)) = serde_json::to_value(row) {
            self.rows.push(map);
        }
    }

    pub fn push_map(&mut self, row: Map<String, Value>) {
        self.rows.push(row);
    }

    /// First rule matching this cell, if any.
    pub fn style_for(&self, column: &str, cell: &Value) -> Option<&CellRule> {
        self.rules.iter().find(|r| r.column == column && r.when.matches(cell))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rendered cell text: integers without a fraction, empty for null.
    pub fn cell_text(cell: &Value) -> String {
        match cell {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                Some(f) => format!("{:.2}", f),
                None => n.to_string(),
            },
            other => other.to_string(),
        }
    }
}

/// Green for each listed value in one column.
pub fn highlight_values(column: &str, values: &[f64]) -> Vec<CellRule> {
    values
        .iter()
        .map(|v| CellRule::new(column, Condition::Equals(*v), palette::HIGHLIGHT_GREEN))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conditions() {
        assert!(Condition::Equals(413.0).matches(&json!(413)));
        assert!(!Condition::Equals(413.0).matches(&json!("413")));
        assert!(Condition::GreaterThan(0.0).matches(&json!(1.5)));
        assert!(!Condition::GreaterThan(0.0).matches(&json!(0)));
        assert!(Condition::Empty.matches(&Value::Null));
        assert!(Condition::Empty.matches(&json!("")));
        assert!(!Condition::Empty.matches(&json!(0)));
    }

    #[test]
    fn first_matching_rule_wins() {
        let table = DataTable::new(&[("certified", "Certified")])
            .with_rule(CellRule::new("certified", Condition::Equals(1.0), palette::HIGHLIGHT_GREEN))
            .with_rule(CellRule::new("certified", Condition::Equals(0.0), palette::HIGHLIGHT_RED))
            .with_rule(CellRule::new("certified", Condition::Empty, palette::HIGHLIGHT_ORANGE));
        assert_eq!(table.style_for("certified", &json!(0)).map(|r| r.background.as_str()), Some(palette::HIGHLIGHT_RED));
        assert_eq!(table.style_for("certified", &Value::Null).map(|r| r.background.as_str()), Some(palette::HIGHLIGHT_ORANGE));
        assert!(table.style_for("other", &json!(1)).is_none());
    }

    #[test]
    fn cell_text_formats() {
        assert_eq!(DataTable::cell_text(&json!(1426.0)), "1426");
        assert_eq!(DataTable::cell_text(&json!(12.345)), "12.35");
        assert_eq!(DataTable::cell_text(&Value::Null), "");
    }
}
