use crate::ast::Node;
use crate::error::{Result, RuleError};

/// AND together two or more rules, left-deep and in the given order:
/// `[a, b, c]` becomes `(a AND b) AND c`, the same shape the parser
/// builds for a chain of ANDs. Nothing is deduplicated or simplified.
pub fn combine<I>(rules: I) -> Result<Node>
where
    I: IntoIterator<Item = Node>,
{
    let mut rules = rules.into_iter();
    let first = rules.next();
    let second = rules.next();

    match (first, second) {
        (Some(first), Some(second)) => Ok(rules.fold(Node::and(first, second), Node::and)),
        (first, _) => Err(RuleError::InvalidArgument {
            reason: format!(
                "combine needs at least two rules, got {}",
                usize::from(first.is_some())
            ),
        }),
    }
}

/// Like [`combine`], leaving the caller's rules in place
pub fn combine_cloned(rules: &[Node]) -> Result<Node> {
    combine(rules.iter().cloned())
}
