//! Text renderings of a rule tree: the canonical form, which parses back
//! to the same tree, and an indented debug tree for display.

use recursion::CollapsibleExt;

use crate::ast::frame::NodeFrame;
use crate::ast::{LogicalOperator, Node};

// rendered subtree plus the operator at its root, if any
struct Fragment {
    text: String,
    operator: Option<LogicalOperator>,
}

impl Fragment {
    fn precedence(&self) -> u8 {
        self.operator.map_or(u8::MAX, LogicalOperator::precedence)
    }

    fn wrapped_if(self, wrap: bool) -> String {
        if wrap {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

/// Render a rule back to infix text with only the parentheses the tree
/// shape needs. A left child is wrapped when it binds looser than its
/// parent; a right child also when it binds equally, since chains fold left.
pub fn to_canonical(node: &Node) -> String {
    node.collapse_frames(|frame: NodeFrame<'_, Fragment>| match frame {
        NodeFrame::Comparison(c) => Fragment {
            text: c.to_string(),
            operator: None,
        },
        NodeFrame::BooleanOp(operator, left, right) => {
            let parent = operator.precedence();
            let wrap_left = left.precedence() < parent;
            let wrap_right = right.precedence() <= parent;
            Fragment {
                text: format!(
                    "{} {} {}",
                    left.wrapped_if(wrap_left),
                    operator,
                    right.wrapped_if(wrap_right)
                ),
                operator: Some(operator),
            }
        }
    })
    .text
}

/// Render a rule as an indented, fully tagged node dump, e.g.
///
/// ```text
/// Node(type=<NodeType.OPERATOR: 'operator'>, operator=<Operator.AND: 'AND'>,
///   left=Node(type=<NodeType.COMPARISON: 'comparison'>, field='age', operator=<ComparisonOperator.GT: '>'>, value=30),
///   right=Node(type=<NodeType.COMPARISON: 'comparison'>, field='department', operator=<ComparisonOperator.EQ: '='>, value='Sales'))
/// ```
///
/// Display only; this form is not meant to be parsed.
pub fn to_debug_tree(node: &Node) -> String {
    node.collapse_frames(|frame: NodeFrame<'_, String>| match frame {
        NodeFrame::Comparison(c) => format!(
            "Node(type=<NodeType.COMPARISON: 'comparison'>, field='{}', operator=<ComparisonOperator.{}: '{}'>, value={})",
            c.attribute(),
            c.comparator().tag(),
            c.comparator(),
            c.value()
        ),
        NodeFrame::BooleanOp(operator, left, right) => format!(
            "Node(type=<NodeType.OPERATOR: 'operator'>, operator=<Operator.{op}: '{op}'>,\n  left={},\n  right={})",
            indent(&left),
            indent(&right),
            op = operator.keyword(),
        ),
    })
}

fn indent(text: &str) -> String {
    text.replace('\n', "\n  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Comparator;

    fn age_gt(n: i32) -> Node {
        Node::comparison("age", Comparator::Gt, n)
    }

    fn dept(name: &str) -> Node {
        Node::comparison("department", Comparator::Eq, name)
    }

    #[test]
    fn test_single_comparison() {
        assert_eq!(to_canonical(&age_gt(30)), "age > 30");
        assert_eq!(
            to_canonical(&Node::comparison("salary", Comparator::Gte, 50000.5)),
            "salary >= 50000.5"
        );
    }

    #[test]
    fn test_left_deep_chain_has_no_parens() {
        let node = Node::and(Node::and(age_gt(1), age_gt(2)), age_gt(3));
        assert_eq!(to_canonical(&node), "age > 1 AND age > 2 AND age > 3");
    }

    #[test]
    fn test_or_under_and_is_wrapped() {
        let node = Node::and(Node::or(age_gt(1), age_gt(2)), dept("Sales"));
        assert_eq!(
            to_canonical(&node),
            "(age > 1 OR age > 2) AND department = 'Sales'"
        );
        let node = Node::and(dept("Sales"), Node::or(age_gt(1), age_gt(2)));
        assert_eq!(
            to_canonical(&node),
            "department = 'Sales' AND (age > 1 OR age > 2)"
        );
    }

    #[test]
    fn test_and_under_or_is_bare() {
        let node = Node::or(Node::and(age_gt(1), dept("Sales")), age_gt(5));
        assert_eq!(
            to_canonical(&node),
            "age > 1 AND department = 'Sales' OR age > 5"
        );
    }

    #[test]
    fn test_right_nested_same_operator_is_wrapped() {
        let node = Node::and(age_gt(1), Node::and(age_gt(2), age_gt(3)));
        assert_eq!(to_canonical(&node), "age > 1 AND (age > 2 AND age > 3)");
        let node = Node::or(age_gt(1), Node::or(age_gt(2), age_gt(3)));
        assert_eq!(to_canonical(&node), "age > 1 OR (age > 2 OR age > 3)");
    }

    #[test]
    fn test_debug_tree_leaf() {
        assert_eq!(
            to_debug_tree(&dept("Sales")),
            "Node(type=<NodeType.COMPARISON: 'comparison'>, field='department', operator=<ComparisonOperator.EQ: '='>, value='Sales')"
        );
    }

    #[test]
    fn test_debug_tree_indents_nested_nodes() {
        let node = Node::or(Node::and(age_gt(30), dept("Sales")), age_gt(5));
        let rendered = to_debug_tree(&node);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "Node(type=<NodeType.OPERATOR: 'operator'>, operator=<Operator.OR: 'OR'>,"
        );
        assert_eq!(
            lines[1],
            "  left=Node(type=<NodeType.OPERATOR: 'operator'>, operator=<Operator.AND: 'AND'>,"
        );
        assert!(lines[2].starts_with("    left=Node(type=<NodeType.COMPARISON"));
        assert!(lines[3].starts_with("    right=Node(type=<NodeType.COMPARISON"));
        assert!(lines[3].ends_with("value='Sales'))"));
        assert!(lines[4].starts_with("  right=Node(type=<NodeType.COMPARISON"));
        assert!(lines[4].contains("operator=<ComparisonOperator.GT: '>'>, value=5"));
    }
}
