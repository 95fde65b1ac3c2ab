use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::ast::Comparator;

/// Everything that can go wrong while lexing, parsing, evaluating or
/// combining a rule. Source-located variants carry the rule text so they
/// render as labelled diagnostics.
#[derive(Debug, Clone, PartialEq, Diagnostic, Error)]
pub enum RuleError {
    #[error("Lexical error at position {position}: {reason}")]
    #[diagnostic(
        code(rulex::lex),
        help("Rules are built from attribute names, comparators (>, <, >=, <=, =, !=), numbers, quoted strings, AND, OR and parentheses")
    )]
    Lex {
        reason: String,
        position: usize,
        #[label("{reason}")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Parse error at position {position}: {reason}")]
    #[diagnostic(code(rulex::parse))]
    Parse {
        reason: String,
        position: usize,
        #[label("{reason}")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Cannot apply '{comparator}' to non-numeric values of attribute '{attribute}'")]
    #[diagnostic(
        code(rulex::type_mismatch),
        help("Text values only support = and !=")
    )]
    TypeMismatch {
        attribute: String,
        comparator: Comparator,
    },

    #[error("Invalid argument: {reason}")]
    #[diagnostic(code(rulex::invalid_argument))]
    InvalidArgument { reason: String },

    #[error("Rule nests deeper than {limit} levels")]
    #[diagnostic(
        code(rulex::too_deep),
        help("Flatten the rule or raise the nesting limit")
    )]
    TooDeep {
        limit: usize,
        position: usize,
        #[label("nesting limit exceeded here")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },
}

pub type Result<T> = std::result::Result<T, RuleError>;

impl RuleError {
    pub(crate) fn lex(src: &str, position: usize, reason: impl Into<String>) -> Self {
        RuleError::Lex {
            reason: reason.into(),
            position,
            span: point_span(src, position),
            src: src.to_string(),
        }
    }

    pub(crate) fn parse(src: &str, position: usize, reason: impl Into<String>) -> Self {
        RuleError::Parse {
            reason: reason.into(),
            position,
            span: point_span(src, position),
            src: src.to_string(),
        }
    }

    pub(crate) fn too_deep(src: &str, position: usize, limit: usize) -> Self {
        RuleError::TooDeep {
            limit,
            position,
            span: point_span(src, position),
            src: src.to_string(),
        }
    }

    /// Byte offset into the rule text, for errors raised while reading it
    pub fn position(&self) -> Option<usize> {
        match self {
            RuleError::Lex { position, .. }
            | RuleError::Parse { position, .. }
            | RuleError::TooDeep { position, .. } => Some(*position),
            RuleError::TypeMismatch { .. } | RuleError::InvalidArgument { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            RuleError::Lex { reason, .. } | RuleError::Parse { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Label span one character wide so miette draws an arrow; positions at
/// the end of input point back at the last character.
fn point_span(src: &str, position: usize) -> SourceSpan {
    if position < src.len() {
        let width = src[position..].chars().next().map_or(1, char::len_utf8);
        (position, width).into()
    } else if let Some((start, c)) = src.char_indices().next_back() {
        (start, c.len_utf8()).into()
    } else {
        (0, 0).into()
    }
}
