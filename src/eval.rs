use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use recursion::CollapsibleExt;
use serde::{Deserialize, Serialize};
use slog::{debug, Logger};

use crate::ast::frame::NodeFrame;
use crate::ast::{parse_number, Comparison, LogicalOperator, Node};
use crate::error::{Result, RuleError};

/// A single attribute value in a data record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numbers, and text that reads as a finite number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => parse_number(s),
            FieldValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(n.into())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// Attribute name to value mapping a rule is evaluated against.
/// Keys are case-sensitive; `null` in JSON input counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRecord {
    fields: BTreeMap<String, Option<FieldValue>>,
}

impl DataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(attribute, value);
        self
    }

    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(attribute.into(), Some(value.into()));
    }

    pub fn get(&self, attribute: &str) -> Option<&FieldValue> {
        self.fields.get(attribute).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a JSON object; nested arrays or objects are rejected
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_reader(reader: impl Read) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for DataRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = DataRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Evaluate a rule against a record.
///
/// Both sides of every AND/OR are evaluated, so a comparison that cannot
/// be applied fails the whole rule even when the other side already
/// decides the result. Absent attributes make their comparison false.
pub fn evaluate(node: &Node, record: &DataRecord) -> Result<bool> {
    node.collapse_frames(|frame: NodeFrame<'_, Result<bool>>| -> Result<bool> {
        match frame {
            NodeFrame::Comparison(c) => compare(c, record),
            NodeFrame::BooleanOp(operator, left, right) => {
                let (left, right) = (left?, right?);
                Ok(match operator {
                    LogicalOperator::And => left && right,
                    LogicalOperator::Or => left || right,
                })
            }
        }
    })
}

pub fn evaluate_logged(logger: &Logger, node: &Node, record: &DataRecord) -> Result<bool> {
    let result = evaluate(node, record);
    match &result {
        Ok(b) => debug!(logger, "evaluated rule"; "rule" => %node, "result" => b),
        Err(e) => debug!(logger, "rule evaluation failed"; "rule" => %node, "error" => %e),
    }
    result
}

fn compare(comparison: &Comparison, record: &DataRecord) -> Result<bool> {
    let actual = match record.get(comparison.attribute()) {
        Some(v) => v,
        None => return Ok(false),
    };
    let comparator = comparison.comparator();
    let expected = comparison.value();

    match (actual.as_number(), expected.as_number()) {
        (Some(a), Some(b)) => Ok(comparator.holds(&a, &b)),
        _ if comparator.is_ordering() => Err(RuleError::TypeMismatch {
            attribute: comparison.attribute().to_string(),
            comparator,
        }),
        _ => Ok(comparator.holds(actual.to_string().as_str(), expected.as_text().as_str())),
    }
}
