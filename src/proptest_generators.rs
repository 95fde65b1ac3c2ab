#[cfg(test)]
mod tests {
    use crate::ast::{Comparator, Literal, LogicalOperator, Node};
    use crate::combine::combine_cloned;
    use crate::eval::{evaluate, DataRecord, FieldValue};
    use crate::parser::parse;
    use crate::render::to_canonical;
    use proptest::prelude::*;

    // small pool so generated records actually hit generated rules
    const ATTRIBUTES: [&str; 5] = ["age", "salary", "department", "experience", "_x1"];

    fn arb_attribute() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(ATTRIBUTES.to_vec()).prop_map(str::to_string),
            "[a-z_][a-z0-9_]{0,8}",
        ]
    }

    fn arb_comparator() -> impl Strategy<Value = Comparator> {
        prop::sample::select(Comparator::ALL.to_vec())
    }

    // Strategy for Literal: integers, short decimals and quote-free text
    fn arb_literal() -> impl Strategy<Value = Literal> {
        prop_oneof![
            (-100_000i64..100_000).prop_map(|n| Literal::Number(n as f64)),
            (-10_000i64..10_000, 1i32..4)
                .prop_map(|(n, scale)| Literal::Number(n as f64 / 10f64.powi(scale))),
            "[A-Za-z0-9 _&-]{0,12}".prop_map(Literal::Text),
        ]
    }

    fn arb_comparison() -> impl Strategy<Value = Node> {
        (arb_attribute(), arb_comparator(), arb_literal())
            .prop_map(|(attribute, comparator, value)| Node::comparison(attribute, comparator, value))
    }

    // Strategy for Node - using idiomatic prop_recursive
    fn arb_node() -> impl Strategy<Value = Node> {
        arb_comparison().prop_recursive(
            8,  // depth: stays well under the parser's nesting limit
            64, // desired_size
            2,  // expected_branch_size
            |inner| {
                prop_oneof![
                    (inner.clone(), inner.clone()).prop_map(|(a, b)| Node::and(a, b)),
                    (inner.clone(), inner).prop_map(|(a, b)| Node::or(a, b)),
                ]
            },
        )
    }

    fn arb_field_value() -> impl Strategy<Value = FieldValue> {
        prop_oneof![
            (-1000i64..1000).prop_map(FieldValue::from),
            any::<bool>().prop_map(FieldValue::Bool),
            prop::sample::select(vec!["Sales", "Marketing", "42", ""])
                .prop_map(FieldValue::from),
        ]
    }

    fn arb_record() -> impl Strategy<Value = DataRecord> {
        prop::collection::vec(
            (prop::sample::select(ATTRIBUTES.to_vec()), arb_field_value()),
            0..5,
        )
        .prop_map(|fields| fields.into_iter().collect())
    }

    #[test]
    fn test_generation() {
        use proptest::test_runner::{Config, TestRunner};

        let mut runner = TestRunner::new(Config {
            cases: 10,
            max_shrink_iters: 0,
            ..Config::default()
        });

        let result = runner.run(&arb_node(), |node| {
            prop_assert!(node.depth() <= 9);
            prop_assert_eq!(node.comparison_count(), node.operator_count() + 1);
            Ok(())
        });

        if let Err(e) = result {
            panic!("Generation failed: {:?}", e);
        }
    }

    proptest! {
        #[test]
        fn test_canonical_round_trip(node in arb_node()) {
            let text = to_canonical(&node);
            match parse(&text) {
                Ok(parsed) => prop_assert_eq!(&parsed, &node, "canonical text: `{}`", text),
                Err(e) => prop_assert!(false, "Failed to parse {node:?} -> `{text}`: {}", e),
            }
        }

        #[test]
        fn test_canonical_form_is_stable(node in arb_node()) {
            let once = to_canonical(&node);
            let twice = to_canonical(&parse(&once).unwrap());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_combined_rule_is_conjunction(
            rules in prop::collection::vec(arb_node(), 2..5),
            record in arb_record(),
        ) {
            let combined = combine_cloned(&rules).unwrap();
            let parts: Result<Vec<bool>, _> = rules.iter().map(|r| evaluate(r, &record)).collect();

            match (evaluate(&combined, &record), parts) {
                (Ok(got), Ok(parts)) => prop_assert_eq!(got, parts.iter().all(|b| *b)),
                (Err(_), Err(_)) => {}
                (got, parts) => prop_assert!(false, "combined {:?} vs parts {:?}", got, parts),
            }

            // and the combined text round trips like any other rule
            let text = to_canonical(&combined);
            prop_assert_eq!(parse(&text).unwrap(), combined);
        }

        #[test]
        fn test_precedence_matches_explicit_parens(
            a in arb_comparison(),
            b in arb_comparison(),
            c in arb_comparison(),
            record in arb_record(),
        ) {
            let implicit = parse(&format!("{} OR {} AND {}", a, b, c)).unwrap();
            let explicit = parse(&format!("{} OR ({} AND {})", a, b, c)).unwrap();
            prop_assert_eq!(&implicit, &explicit);
            prop_assert_eq!(
                evaluate(&implicit, &record).ok(),
                evaluate(&explicit, &record).ok()
            );
        }
    }

    #[test]
    fn test_operators_render_as_keywords() {
        assert_eq!(LogicalOperator::And.to_string(), "AND");
        assert_eq!(LogicalOperator::Or.to_string(), "OR");
    }
}
