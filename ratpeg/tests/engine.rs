//! End-to-end tests against hand-built grammars, covering the
//! invariants and worked examples from spec.md §8.

use std::rc::Rc;

use ratpeg::{Error, GrammarBuilder, Node, Parser, ParserConfig, RuleNode};

fn literal(s: &str) -> RuleNode {
    RuleNode::Literal(vec![s.to_string()])
}

fn digits() -> RuleNode {
    RuleNode::Regex {
        pattern: regex::Regex::new(r"[0-9]+").unwrap(),
        converter: Rc::new(|s: &str| Node::Str(Rc::from(s))),
        raw: false,
    }
}

/// `Expr <- Expr '+' Num | Num` (left-recursive arithmetic).
fn build_left_recursive_sum() -> ratpeg::Grammar {
    let mut b = GrammarBuilder::new();
    let expr = b.declare("Expr");
    let num = b.named("Num", digits());

    let plus = b.push(literal("+"));
    let rec_seq = b.push(RuleNode::Sequence(ratpeg::RecordClass {
        name: "Sum",
        fields: vec![
            ratpeg::Field { name: "left", rule: expr, hidden: false },
            ratpeg::Field { name: "op", rule: plus, hidden: true },
            ratpeg::Field { name: "right", rule: num, hidden: false },
        ],
    }));
    b.define(expr, RuleNode::Choice(vec![rec_seq, num]));
    b.build().unwrap()
}

#[test]
fn left_recursion_grows_left_associatively() {
    let g = build_left_recursive_sum();
    let start = g.rule_named("Expr").unwrap();
    let parser = Parser::new(&g, "1+2+3", ParserConfig::default());
    let node = parser.parse(start, true).expect("parses");

    // "1+2+3" should associate as ((1+2)+3): the outer record's
    // `left` field is itself a `Sum` record, not a flat list.
    let outer = match &node {
        Node::Record { class, fields } => {
            assert_eq!(*class, "Sum");
            fields
        }
        other => panic!("expected Sum record, got {other:?}"),
    };
    let right = outer.iter().find(|(n, _)| *n == "right").unwrap();
    assert_eq!(right.1.as_str(), Some("3"));
    let left = outer.iter().find(|(n, _)| *n == "left").unwrap();
    match &left.1 {
        Node::Record { class, .. } => assert_eq!(*class, "Sum"),
        other => panic!("expected nested Sum record, got {other:?}"),
    }
}

/// `A <- B 'x' | 'a'` ; `B <- A` (indirect left recursion).
#[test]
fn indirect_left_recursion_terminates() {
    let mut b = GrammarBuilder::new();
    let a = b.declare("A");
    let bb = b.declare("B");

    let lit_a = b.push(literal("a"));
    let lit_x = b.push(literal("x"));
    let seq = b.push(RuleNode::Sequence(ratpeg::RecordClass {
        name: "Ax",
        fields: vec![
            ratpeg::Field { name: "b", rule: bb, hidden: false },
            ratpeg::Field { name: "x", rule: lit_x, hidden: true },
        ],
    }));
    b.define(a, RuleNode::Choice(vec![seq, lit_a]));
    b.define(bb, RuleNode::Choice(vec![a]));

    let g = b.build().unwrap();
    let parser = Parser::new(&g, "axx", ParserConfig::default());
    let node = parser.parse(a, true).expect("parses without infinite recursion");
    match node {
        Node::Record { class, .. } => assert_eq!(class, "Ax"),
        other => panic!("expected Ax record, got {other:?}"),
    }
}

/// `Paren <- '(' ~ Expr ')' | NAME` -- once `~` is passed, failure to
/// find the closing paren must not fall through to the `NAME`
/// alternative.
#[test]
fn commit_prevents_fallthrough_to_next_alternative() {
    let mut b = GrammarBuilder::new();
    let name = b.rule_id("NAME").unwrap();
    let open = b.push(literal("("));
    let commit = b.push(RuleNode::Commit);
    let close = b.push(literal(")"));
    let paren_seq = b.push(RuleNode::Sequence(ratpeg::RecordClass {
        name: "Paren",
        fields: vec![
            ratpeg::Field { name: "open", rule: open, hidden: true },
            ratpeg::Field { name: "commit", rule: commit, hidden: true },
            ratpeg::Field { name: "inner", rule: name, hidden: false },
            ratpeg::Field { name: "close", rule: close, hidden: true },
        ],
    }));
    let paren = b.named("Paren", RuleNode::Choice(vec![paren_seq, name]));
    let g = b.build().unwrap();

    // Well-formed input still parses.
    let parser = Parser::new(&g, "(abc)", ParserConfig::default());
    assert!(parser.parse(paren, true).is_ok());

    // Missing ')' after commit must surface as a Syntax error, not
    // silently fall back to trying the bare-NAME alternative.
    let parser = Parser::new(&g, "(abc", ParserConfig::default());
    match parser.parse(paren, true) {
        Err(Error::Syntax { .. }) => {}
        other => panic!("expected committed Syntax failure, got {other:?}"),
    }
}

/// `items <- atom.','+`
#[test]
fn separator_repetition_rejects_trailing_separator() {
    let mut b = GrammarBuilder::new();
    let atom = b.rule_id("NAME").unwrap();
    let comma = b.push(literal(","));
    let items = b.named(
        "items",
        RuleNode::Repeat { item: atom, min: 1, separator: Some(comma) },
    );
    let g = b.build().unwrap();

    let parser = Parser::new(&g, "a,b,c", ParserConfig::default());
    let node = parser.parse(items, true).expect("parses");
    match node {
        Node::List(vs) => {
            let texts: Vec<_> = vs.iter().map(|v| v.as_str().unwrap()).collect();
            assert_eq!(texts, vec!["a", "b", "c"]);
        }
        other => panic!("expected List, got {other:?}"),
    }

    let parser = Parser::new(&g, "a,b,", ParserConfig::default());
    assert!(parser.parse(items, true).is_err());
}

/// Unconsumed input after a successful parse is an error when asked for.
#[test]
fn unconsumed_input_is_reported() {
    let mut b = GrammarBuilder::new();
    let name = b.rule_id("NAME").unwrap();
    b.named("Start", RuleNode::Choice(vec![name]));
    let g = b.build().unwrap();
    let start = g.rule_named("Start").unwrap();

    let parser = Parser::new(&g, "abc def", ParserConfig::default());
    match parser.parse(start, true) {
        Err(Error::UnconsumedInput(rest)) => assert_eq!(rest, " def"),
        other => panic!("expected UnconsumedInput, got {other:?}"),
    }

    // Same grammar, same input: `raise_on_unconsumed = false` accepts it.
    let parser = Parser::new(&g, "abc def", ParserConfig::default());
    assert!(parser.parse(start, false).is_ok());
}

/// `Adjacent <- NAME !SPACE NAME` -- whitespace sensitivity of the
/// negative lookahead over `SPACE`.
#[test]
fn negative_lookahead_over_space_is_whitespace_sensitive() {
    let mut b = GrammarBuilder::new();
    let name = b.rule_id("NAME").unwrap();
    let space = b.rule_id("SPACE").unwrap();
    let not_space = b.push(RuleNode::Not(space));
    let adjacent = b.named(
        "Adjacent",
        RuleNode::Sequence(ratpeg::RecordClass {
            name: "Adjacent",
            fields: vec![
                ratpeg::Field { name: "first", rule: name, hidden: false },
                ratpeg::Field { name: "gap", rule: not_space, hidden: true },
                ratpeg::Field { name: "second", rule: name, hidden: false },
            ],
        }),
    );
    let g = b.build().unwrap();

    let parser = Parser::new(&g, "ab", ParserConfig::default());
    assert!(parser.parse(adjacent, true).is_err(), "NAME greedily consumes 'ab' as one token");

    let parser = Parser::new(&g, "a b", ParserConfig::default());
    assert!(parser.parse(adjacent, true).is_err(), "a space between them must fail the lookahead");
}

/// Memoization must not change the parsed result: the same rule at the
/// same position, reached two different ways, agrees.
#[test]
fn memoization_is_idempotent() {
    let mut b = GrammarBuilder::new();
    let name = b.rule_id("NAME").unwrap();
    let pair = b.named(
        "Pair",
        RuleNode::Sequence(ratpeg::RecordClass {
            name: "Pair",
            fields: vec![
                ratpeg::Field { name: "a", rule: name, hidden: false },
                ratpeg::Field { name: "b", rule: name, hidden: false },
            ],
        }),
    );
    let g = b.build().unwrap();
    let parser = Parser::new(&g, "foo bar", ParserConfig::default());
    let first = parser.parse(pair, true).unwrap();
    let parser2 = Parser::new(&g, "foo bar", ParserConfig::default());
    let second = parser2.parse(pair, true).unwrap();
    assert_eq!(first, second);
}

/// Ordered choice: the first matching alternative wins even when a
/// later one would also match.
#[test]
fn ordered_choice_prefers_first_match() {
    let mut b = GrammarBuilder::new();
    let foo = b.push(literal("foo"));
    let foobar = b.push(literal("foobar"));
    let choice = b.named("Choice", RuleNode::Choice(vec![foo, foobar]));
    let g = b.build().unwrap();
    let parser = Parser::new(&g, "foobar", ParserConfig::default());
    let node = parser.parse_partial(choice).unwrap();
    assert_eq!(node.0.as_str(), Some("foo"));
    assert_eq!(node.1, 3);
}

/// Greediness of `+`/`*`: repetition consumes as much as possible.
#[test]
fn repetition_is_greedy() {
    let mut b = GrammarBuilder::new();
    let digit = b.push(RuleNode::Regex {
        pattern: regex::Regex::new(r"[0-9]").unwrap(),
        converter: Rc::new(|s: &str| Node::Str(Rc::from(s))),
        raw: false,
    });
    let digits_rule = b.named("Digits", RuleNode::Repeat { item: digit, min: 0, separator: None });
    let g = b.build().unwrap();
    let parser = Parser::new(&g, "12345x", ParserConfig::default());
    let (node, consumed) = parser.parse_partial(digits_rule).unwrap();
    assert_eq!(consumed, 5);
    match node {
        Node::List(vs) => assert_eq!(vs.len(), 5),
        other => panic!("expected List, got {other:?}"),
    }
}
