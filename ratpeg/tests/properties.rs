//! Property tests for the invariants spec.md §8 calls out by name:
//! memoization must not change results, and left recursion must always
//! terminate (bounded by input length, not loop forever) regardless of
//! how deep the repetition runs.

use std::rc::Rc;

use proptest::prelude::*;
use ratpeg::{Grammar, GrammarBuilder, Node, Parser, ParserConfig, RuleNode};

fn digits() -> RuleNode {
    RuleNode::Regex {
        pattern: regex::Regex::new(r"[0-9]+").unwrap(),
        converter: Rc::new(|s: &str| Node::Str(Rc::from(s))),
        raw: false,
    }
}

/// `Expr <- Expr '+' Num | Num`, same shape as the worked example in
/// `ratpeg/tests/engine.rs`, reused here to vary input depth.
fn build_left_recursive_sum() -> Grammar {
    let mut b = GrammarBuilder::new();
    let expr = b.declare("Expr");
    let num = b.named("Num", digits());
    let plus = b.push(RuleNode::Literal(vec!["+".to_string()]));
    let rec_seq = b.push(RuleNode::Sequence(ratpeg::RecordClass {
        name: "Sum",
        fields: vec![
            ratpeg::Field {
                name: "left",
                rule: expr,
                hidden: false,
            },
            ratpeg::Field {
                name: "op",
                rule: plus,
                hidden: true,
            },
            ratpeg::Field {
                name: "right",
                rule: num,
                hidden: false,
            },
        ],
    }));
    b.define(expr, RuleNode::Choice(vec![rec_seq, num]));
    b.build().unwrap()
}

fn depth(node: &Node) -> usize {
    match node {
        Node::Record { fields, .. } => {
            1 + fields
                .iter()
                .map(|(_, v)| depth(v))
                .max()
                .unwrap_or(0)
        }
        _ => 0,
    }
}

proptest! {
    /// However many `+`-separated numbers are chained, left recursion
    /// terminates and grows exactly one `Sum` record per operator
    /// (left-associative: depth equals operator count).
    #[test]
    fn left_recursion_terminates_and_grows_one_level_per_operator(n in 1usize..40) {
        let nums: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        let text = nums.join("+");
        let g = build_left_recursive_sum();
        let start = g.rule_named("Expr").unwrap();
        let parser = Parser::new(&g, &text, ParserConfig::default());
        let node = parser.parse(start, true).expect("always parses a well-formed chain");
        prop_assert_eq!(depth(&node), n.saturating_sub(1));
    }

    /// Parsing the same grammar against the same text twice through
    /// independent `Parser`s (so each has its own fresh memo table)
    /// always agrees -- memoization is an optimization, not a source of
    /// divergent results.
    #[test]
    fn memoization_never_changes_the_parsed_value(n in 1usize..20) {
        let nums: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        let text = nums.join("+");
        let g = build_left_recursive_sum();
        let start = g.rule_named("Expr").unwrap();

        let a = Parser::new(&g, &text, ParserConfig::default()).parse(start, true).unwrap();
        let b = Parser::new(&g, &text, ParserConfig::default()).parse(start, true).unwrap();
        prop_assert_eq!(a, b);
    }

    /// A chain of `n` additions consumes exactly the whole input: no
    /// byte is left behind or double-counted by the left-recursion
    /// growth loop.
    #[test]
    fn left_recursive_parse_consumes_exactly_the_input(n in 1usize..40) {
        let nums: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        let text = nums.join("+");
        let g = build_left_recursive_sum();
        let start = g.rule_named("Expr").unwrap();
        let parser = Parser::new(&g, &text, ParserConfig::default());
        let (_, consumed) = parser.parse_partial(start).expect("parses");
        prop_assert_eq!(consumed, text.len());
    }
}
