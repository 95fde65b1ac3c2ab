//! Boolean rule expressions over named attributes.
//!
//! Rule text such as `(age > 35 AND department = 'Sales') OR experience > 5`
//! is tokenized and parsed into a [`Node`] tree, evaluated against a
//! [`DataRecord`], merged with other rules via [`combine()`] and rendered
//! back to canonical text with [`to_canonical`].

pub mod ast;
pub mod book;
pub mod combine;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod stats;
pub mod validate;

#[cfg(test)]
mod proptest_generators;

pub use ast::{Comparator, Comparison, Literal, LogicalOperator, Node};
pub use combine::{combine, combine_cloned};
pub use error::{Result, RuleError};
pub use eval::{evaluate, evaluate_logged, DataRecord, FieldValue};
pub use lexer::{tokenize, Lexeme, Token};
pub use parser::{parse, parse_with, ParseOptions, DEFAULT_MAX_DEPTH};
pub use render::{to_canonical, to_debug_tree};
pub use validate::{validate, Catalog, Complexity, ValidationReport};

/// Parse several rules and AND them together in order
pub fn combine_rules<S: AsRef<str>>(rules: &[S]) -> Result<Node> {
    let nodes = rules
        .iter()
        .map(|r| parse(r.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    combine(nodes)
}
