use rulex::{
    combine, combine_rules, evaluate, parse, to_canonical, to_debug_tree, DataRecord,
    LogicalOperator, Node, RuleError,
};

#[test]
fn test_combine_two_rules() {
    let combined = combine_rules(&["age > 30", "department = 'Sales'"]).unwrap();
    assert_eq!(combined.operator(), Some(LogicalOperator::And));
    assert_eq!(to_canonical(&combined), "age > 30 AND department = 'Sales'");

    let employee = DataRecord::new().with("age", 35).with("department", "Sales");
    assert!(evaluate(&combined, &employee).unwrap());
    let junior = DataRecord::new().with("age", 25).with("department", "Sales");
    assert!(!evaluate(&combined, &junior).unwrap());
}

#[test]
fn test_combine_keeps_order_and_shape() {
    let combined = combine_rules(&["a = 1", "b = 2 OR c = 3", "d = 4"]).unwrap();
    assert_eq!(to_canonical(&combined), "a = 1 AND (b = 2 OR c = 3) AND d = 4");

    let expected = Node::and(
        Node::and(parse("a = 1").unwrap(), parse("b = 2 OR c = 3").unwrap()),
        parse("d = 4").unwrap(),
    );
    assert_eq!(combined, expected);
}

#[test]
fn test_combined_rule_reparses() {
    let combined = combine_rules(&[
        "(age > 35 AND department = 'Sales') OR experience > 5",
        "salary >= 50000",
    ])
    .unwrap();
    let text = to_canonical(&combined);
    assert_eq!(
        text,
        "(age > 35 AND department = 'Sales' OR experience > 5) AND salary >= 50000"
    );
    assert_eq!(parse(&text).unwrap(), combined);
}

#[test]
fn test_combine_is_a_conjunction() {
    let rules = ["age > 30", "experience > 5 OR salary > 60000", "department != 'HR'"];
    let nodes: Vec<Node> = rules.iter().map(|r| parse(r).unwrap()).collect();
    let combined = combine(nodes.clone()).unwrap();

    let records = [
        DataRecord::new().with("age", 40).with("experience", 6).with("department", "Sales"),
        DataRecord::new().with("age", 40).with("experience", 2).with("salary", 70000),
        DataRecord::new().with("age", 25).with("experience", 9),
        DataRecord::new().with("age", 40).with("experience", 9).with("department", "HR"),
    ];
    for data in records.iter() {
        let each = nodes.iter().all(|n| evaluate(n, data).unwrap());
        assert_eq!(evaluate(&combined, data).unwrap(), each, "record {:?}", data);
    }
}

#[test]
fn test_combine_does_not_dedupe() {
    let combined = combine_rules(&["age > 30", "age > 30"]).unwrap();
    assert_eq!(to_canonical(&combined), "age > 30 AND age > 30");
}

#[test]
fn test_combine_needs_two_rules() {
    let none: [&str; 0] = [];
    assert!(matches!(
        combine_rules(&none),
        Err(RuleError::InvalidArgument { .. })
    ));
    assert!(matches!(
        combine_rules(&["age > 30"]),
        Err(RuleError::InvalidArgument { .. })
    ));
}

#[test]
fn test_combine_reports_parse_errors() {
    let err = combine_rules(&["age > 30", "salary >"]).unwrap_err();
    assert_eq!(err.position(), Some(8));
}

#[test]
fn test_combined_debug_tree() {
    let combined = combine_rules(&["age > 30", "department = 'Sales'"]).unwrap();
    assert_eq!(
        to_debug_tree(&combined),
        "Node(type=<NodeType.OPERATOR: 'operator'>, operator=<Operator.AND: 'AND'>,\n  \
         left=Node(type=<NodeType.COMPARISON: 'comparison'>, field='age', operator=<ComparisonOperator.GT: '>'>, value=30),\n  \
         right=Node(type=<NodeType.COMPARISON: 'comparison'>, field='department', operator=<ComparisonOperator.EQ: '='>, value='Sales'))"
    );
}
