//! Ready-made rules (SPEC_FULL.md §3 "Built-in rules"), ported from
//! `examples/original_source/src/parsival/helper_rules.py`'s `SPACE`,
//! `NO_LF_SPACE`, `NEWLINE`, `NO_SPACE`, `ENDMARKER`, plus `NAME` and
//! `STRING` token rules used throughout
//! `examples/original_source/src/parsival/peg_grammar.py`.
//!
//! Every [`crate::arena::GrammarBuilder`] registers these once, under
//! fixed names, so any grammar can reference them by name without
//! redefining them. Unlike the Python originals (each a one-field
//! dataclass wrapping a regex/literal/lookahead), these are plain
//! rules that yield their matched text directly -- the wrapping
//! record added no information a caller couldn't get from the
//! sub-rule itself.

use std::rc::Rc;

use regex::Regex;

use crate::arena::GrammarBuilder;
use crate::node::Node;
use crate::rule::RuleNode;

pub const SPACE: &str = "SPACE";
pub const NO_LF_SPACE: &str = "NO_LF_SPACE";
pub const NEWLINE: &str = "NEWLINE";
pub const NO_SPACE: &str = "NO_SPACE";
pub const ENDMARKER: &str = "ENDMARKER";
pub const NAME: &str = "NAME";
pub const STRING: &str = "STRING";
pub const INDENT: &str = "INDENT";
pub const DEDENT: &str = "DEDENT";

fn text_converter() -> Rc<dyn Fn(&str) -> Node> {
    Rc::new(|s: &str| Node::Str(Rc::from(s)))
}

fn regex_rule(pattern: &str, raw: bool) -> RuleNode {
    RuleNode::Regex {
        pattern: Regex::new(pattern).expect("builtin pattern is valid"),
        converter: text_converter(),
        raw,
    }
}

/// Register the built-in rules into `builder`, called once from
/// [`GrammarBuilder::new`].
pub(crate) fn register(builder: &mut GrammarBuilder) {
    // A required run of whitespace. Whitespace-sensitive: must not have
    // whitespace skipped out from under it before it runs.
    builder.named(SPACE, regex_rule(r"\s+", true));
    // A required run of whitespace excluding newlines.
    builder.named(NO_LF_SPACE, regex_rule(r"[^\S\n]+", true));
    // A single newline character.
    builder.named(NEWLINE, RuleNode::Literal(vec!["\n".to_string()]));
    // Assert there is no whitespace here, between two other rules.
    let space_id = builder.rule_id(SPACE).expect("SPACE just registered");
    builder.named(NO_SPACE, RuleNode::Not(space_id));
    // Assert position at the end of the input.
    builder.named(ENDMARKER, regex_rule(r"\z", false));
    // An identifier.
    builder.named(NAME, regex_rule(r"[A-Za-z_][A-Za-z0-9_]*", false));
    // A single- or double-quoted string literal, with backslash escapes.
    builder.named(
        STRING,
        regex_rule(r#"'([^'\\]|\\.)*'|"([^"\\]|\\.)*""#, false),
    );
    // INDENT/DEDENT have no backing token rule: there is no indentation
    // tracking in this engine (SPEC_FULL.md §9 Open Question), so a
    // grammar source that references them compiles but can never match
    // one at parse time. Registered as always-failing (`Not` over an
    // always-succeeding `Empty`) purely so the grammar compiler accepts
    // the bare uppercase reference instead of rejecting it as unknown.
    let always = builder.push(RuleNode::Empty);
    builder.named(INDENT, RuleNode::Not(always));
    let always = builder.push(RuleNode::Empty);
    builder.named(DEDENT, RuleNode::Not(always));
}
