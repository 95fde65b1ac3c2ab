//! Rule syntax tree
//!
//! A rule is a binary tree: comparison leaves joined by AND/OR nodes.
//! Each boolean node owns both of its children, so trees are plain values
//! that can be cloned, compared and dropped without bookkeeping.

pub mod frame;

use std::collections::BTreeSet;
use std::fmt;
use std::mem;
use std::str::FromStr;

use recursion::CollapsibleExt;

use self::frame::NodeFrame;

/// Comparators available between an attribute and a literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
    Ne,
}

impl Comparator {
    pub const ALL: [Comparator; 6] = [
        Comparator::Gt,
        Comparator::Lt,
        Comparator::Gte,
        Comparator::Lte,
        Comparator::Eq,
        Comparator::Ne,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Gte => ">=",
            Comparator::Lte => "<=",
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.symbol() == symbol)
    }

    /// `>`, `<`, `>=` and `<=` need an ordering, `=` and `!=` only equality
    pub fn is_ordering(self) -> bool {
        !matches!(self, Comparator::Eq | Comparator::Ne)
    }

    pub fn holds<T: PartialOrd + ?Sized>(self, actual: &T, expected: &T) -> bool {
        match self {
            Comparator::Gt => actual > expected,
            Comparator::Lt => actual < expected,
            Comparator::Gte => actual >= expected,
            Comparator::Lte => actual <= expected,
            Comparator::Eq => actual == expected,
            Comparator::Ne => actual != expected,
        }
    }

    // tag used by the debug tree
    pub(crate) fn tag(self) -> &'static str {
        match self {
            Comparator::Gt => "GT",
            Comparator::Lt => "LT",
            Comparator::Gte => "GTE",
            Comparator::Lte => "LTE",
            Comparator::Eq => "EQ",
            Comparator::Ne => "NEQ",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }

    /// Higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            LogicalOperator::Or => 1,
            LogicalOperator::And => 2,
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Right-hand side of a comparison
///
/// Rule text has no escapes, so a `Text` holding both `'` and `"` has no
/// re-parseable rendering. The lexer never produces one; literals built
/// by hand should avoid it if they are meant to round-trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
}

impl Literal {
    /// Numeric view: numbers as-is, text only when it reads as a finite number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            Literal::Text(s) => parse_number(s),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Literal::Number(n) => n.to_string(),
            Literal::Text(s) => s.clone(),
        }
    }
}

pub(crate) fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Text(s) if s.contains('\'') => write!(f, "\"{}\"", s),
            Literal::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Number(n.into())
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Text(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::Text(s)
    }
}

/// `attribute comparator literal`, immutable once built
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    attribute: String,
    comparator: Comparator,
    value: Literal,
}

impl Comparison {
    pub fn new(attribute: impl Into<String>, comparator: Comparator, value: impl Into<Literal>) -> Self {
        Self {
            attribute: attribute.into(),
            comparator,
            value: value.into(),
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn value(&self) -> &Literal {
        &self.value
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.attribute, self.comparator, self.value)
    }
}

/// Rule tree. `Drop`, `Clone`, `PartialEq` and `Debug` are written by hand
/// so that arbitrarily long AND/OR chains never recurse on the call stack.
pub enum Node {
    Comparison(Comparison),
    BooleanOp {
        operator: LogicalOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn comparison(
        attribute: impl Into<String>,
        comparator: Comparator,
        value: impl Into<Literal>,
    ) -> Self {
        Node::Comparison(Comparison::new(attribute, comparator, value))
    }

    pub fn binary(operator: LogicalOperator, left: Self, right: Self) -> Self {
        Node::BooleanOp {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Self, right: Self) -> Self {
        Self::binary(LogicalOperator::And, left, right)
    }

    pub fn or(left: Self, right: Self) -> Self {
        Self::binary(LogicalOperator::Or, left, right)
    }

    pub fn operator(&self) -> Option<LogicalOperator> {
        match self {
            Node::Comparison(_) => None,
            Node::BooleanOp { operator, .. } => Some(*operator),
        }
    }

    /// Comparison leaves in left-to-right order
    pub fn comparisons(&self) -> Vec<&Comparison> {
        self.collapse_frames(|frame: NodeFrame<'_, Vec<&Comparison>>| match frame {
            NodeFrame::Comparison(c) => vec![c],
            NodeFrame::BooleanOp(_, mut left, right) => {
                left.extend(right);
                left
            }
        })
    }

    /// Distinct attribute names referenced by the rule, sorted
    pub fn attributes(&self) -> BTreeSet<String> {
        self.comparisons()
            .into_iter()
            .map(|c| c.attribute().to_string())
            .collect()
    }

    pub fn comparison_count(&self) -> usize {
        self.collapse_frames(|frame: NodeFrame<'_, usize>| match frame {
            NodeFrame::Comparison(_) => 1,
            NodeFrame::BooleanOp(_, l, r) => l + r,
        })
    }

    pub fn operator_count(&self) -> usize {
        self.collapse_frames(|frame: NodeFrame<'_, usize>| match frame {
            NodeFrame::Comparison(_) => 0,
            NodeFrame::BooleanOp(_, l, r) => l + r + 1,
        })
    }

    /// A lone comparison has depth 1
    pub fn depth(&self) -> usize {
        self.collapse_frames(|frame: NodeFrame<'_, usize>| match frame {
            NodeFrame::Comparison(_) => 1,
            NodeFrame::BooleanOp(_, l, r) => l.max(r) + 1,
        })
    }

    // stand-in left behind when a child is moved out during drop; owns no heap
    fn hollow() -> Self {
        Node::Comparison(Comparison {
            attribute: String::new(),
            comparator: Comparator::Eq,
            value: Literal::Number(0.0),
        })
    }

    // move boolean children out into `into`, leaving leaves in place
    fn detach_children(&mut self, into: &mut Vec<Node>) {
        if let Node::BooleanOp { left, right, .. } = self {
            for child in [left, right] {
                if let Node::BooleanOp { .. } = **child {
                    into.push(mem::replace(&mut **child, Node::hollow()));
                }
            }
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        self.collapse_frames(|frame: NodeFrame<'_, Node>| match frame {
            NodeFrame::Comparison(c) => Node::Comparison(c.clone()),
            NodeFrame::BooleanOp(operator, left, right) => Node::binary(operator, left, right),
        })
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Node::Comparison(a), Node::Comparison(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (
                    Node::BooleanOp {
                        operator: op_a,
                        left: left_a,
                        right: right_a,
                    },
                    Node::BooleanOp {
                        operator: op_b,
                        left: left_b,
                        right: right_b,
                    },
                ) => {
                    if op_a != op_b {
                        return false;
                    }
                    pending.push((&**right_a, &**right_b));
                    pending.push((&**left_a, &**left_b));
                }
                _ => return false,
            }
        }
        true
    }
}

/// Shows the canonical form
impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node")
            .field(&crate::render::to_canonical(self))
            .finish()
    }
}

/// Canonical form
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::to_canonical(self))
    }
}

impl FromStr for Node {
    type Err = crate::error::RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(s)
    }
}

impl From<Comparison> for Node {
    fn from(c: Comparison) -> Self {
        Node::Comparison(c)
    }
}
