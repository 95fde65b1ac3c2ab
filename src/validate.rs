//! Static checks on rule text that go beyond "does it parse": unknown
//! attributes, duplicated conditions and rough evaluation cost.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::ast::Node;
use crate::parser::{parse_with, ParseOptions};

pub const REDUNDANT_WARNING: &str = "Rule contains potentially redundant conditions";
pub const COMPLEXITY_WARNING: &str = "Rule may have performance implications";

/// The set of attribute names a rule may reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    attributes: BTreeSet<String>,
}

impl Catalog {
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// age, department, salary and experience
    pub fn default_employee() -> Self {
        Self::new(["age", "department", "salary", "experience"])
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.attributes.contains(attribute)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attributes used by `node` that are not in the catalog, sorted
    pub fn unknown_in(&self, node: &Node) -> Vec<String> {
        node.attributes()
            .into_iter()
            .filter(|a| !self.contains(a))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
    Unknown,
}

impl Complexity {
    pub fn of(node: &Node) -> Self {
        let comparisons = node.comparison_count();
        let operators = node.operator_count();
        if comparisons > 5 || operators > 4 {
            Complexity::High
        } else if comparisons > 3 || operators > 2 {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub complexity: Complexity,
}

/// Check rule text. Never fails: syntax problems come back as errors in
/// the report.
pub fn validate(rule: &str, catalog: Option<&Catalog>, options: ParseOptions) -> ValidationReport {
    let node = match parse_with(rule, options) {
        Ok(node) => node,
        Err(e) => {
            return ValidationReport {
                is_valid: false,
                errors: vec![e.to_string()],
                warnings: Vec::new(),
                complexity: Complexity::Unknown,
            }
        }
    };

    let errors: Vec<String> = catalog
        .map(|catalog| catalog.unknown_in(&node))
        .unwrap_or_default()
        .into_iter()
        .map(|attribute| format!("Invalid attribute: {}", attribute))
        .collect();

    let complexity = Complexity::of(&node);
    let mut warnings = Vec::new();
    if complexity == Complexity::High {
        warnings.push(COMPLEXITY_WARNING.to_string());
    }
    if has_redundant_comparisons(&node) {
        warnings.push(REDUNDANT_WARNING.to_string());
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        complexity,
    }
}

/// True when the same comparison appears more than once anywhere in the rule
pub fn has_redundant_comparisons(node: &Node) -> bool {
    let mut seen = HashSet::new();
    node.comparisons()
        .into_iter()
        .any(|c| !seen.insert(c.to_string()))
}
