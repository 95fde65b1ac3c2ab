use super::{Comparison, LogicalOperator, Node};
use recursion::{Collapsible, MappableFrame, PartiallyApplied};

/// short-lived single layer of a borrowed rule tree, used for expressing
/// recursive algorithms (evaluation, rendering, metrics) without recursing
/// on the call stack
pub enum NodeFrame<'a, X> {
    // borrowed leaf
    Comparison(&'a Comparison),
    // boolean operator over two already-processed children
    BooleanOp(LogicalOperator, X, X),
}

impl<'a> MappableFrame for NodeFrame<'a, PartiallyApplied> {
    type Frame<X> = NodeFrame<'a, X>;

    fn map_frame<A, B>(input: Self::Frame<A>, mut f: impl FnMut(A) -> B) -> Self::Frame<B> {
        match input {
            NodeFrame::Comparison(c) => NodeFrame::Comparison(c),
            NodeFrame::BooleanOp(op, left, right) => {
                let left = f(left);
                NodeFrame::BooleanOp(op, left, f(right))
            }
        }
    }
}

impl<'a> Collapsible for &'a Node {
    type FrameToken = NodeFrame<'a, PartiallyApplied>;

    fn into_frame(self) -> NodeFrame<'a, Self> {
        match self {
            Node::Comparison(c) => NodeFrame::Comparison(c),
            Node::BooleanOp {
                operator,
                left,
                right,
            } => NodeFrame::BooleanOp(*operator, &**left, &**right),
        }
    }
}
