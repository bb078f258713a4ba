//! The rule algebra (spec.md §3 "Rule").
//!
//! Rather than the dynamic, runtime-evaluated type annotations
//! `examples/original_source/src/parsival/__init__.py` uses (`_Regex`/
//! `_Not`/dataclass annotations), rules here are a concrete tagged sum,
//! arena-allocated and referenced by index so that cyclic (mutually
//! and self-recursive) grammars need no unsafe aliasing.

use std::rc::Rc;

use crate::node::Node;

/// Index into a [`crate::arena::Grammar`]'s rule arena.
pub type RuleId = usize;

/// `Regex[converter, pattern, flags]`'s converter: applied to the matched
/// text to produce the rule's value.
pub type Converter = Rc<dyn Fn(&str) -> Node>;

/// One field of a [`RuleNode::Sequence`].
#[derive(Clone)]
pub struct Field {
    pub name: &'static str,
    pub rule: RuleId,
    /// Hidden fields must match but their value is dropped from the
    /// returned [`Node::Record`] (spec.md §3 "Record class").
    pub hidden: bool,
}

/// The ordered field list a sequence rule is bound to (spec.md §3
/// "Record class").
#[derive(Clone)]
pub struct RecordClass {
    pub name: &'static str,
    pub fields: Vec<Field>,
}

/// A node in the rule algebra (spec.md §3 "Rule").
pub enum RuleNode {
    /// Ordered alternatives of literal strings; first that matches wins.
    /// `Literal[v]` is the single-value case; `Literal[v1, .., vn]` is
    /// the multi-value synonym from spec.md §6.
    Literal(Vec<String>),
    /// `Regex[converter, pattern, flags]`. `raw` marks the
    /// whitespace-sensitive builtins (`SPACE`, `NO_LF_SPACE`) that must
    /// not have whitespace skipped before they are tried (spec.md §4.1).
    Regex {
        pattern: regex::Regex,
        converter: Converter,
        raw: bool,
    },
    /// Ordered choice. First successful alternative wins; a committed
    /// failure in one alternative aborts the whole choice.
    Choice(Vec<RuleId>),
    /// A named, ordered sequence of sub-rules bound to a record class.
    Sequence(RecordClass),
    /// Zero-or-more (`min == 0`) or one-or-more (`min == 1`) repetition,
    /// optionally interleaved with a separator rule.
    Repeat {
        item: RuleId,
        min: usize,
        separator: Option<RuleId>,
    },
    /// `r` or nothing; always succeeds.
    Optional(RuleId),
    /// Negative lookahead: succeeds iff `r` fails; never consumes.
    Not(RuleId),
    /// Positive lookahead: succeeds iff `r` succeeds; never consumes;
    /// yields `r`'s value.
    Lookahead(RuleId),
    /// Zero-width marker inside a `Sequence`; converts later failures in
    /// the same sequence into committed failures.
    Commit,
    /// Syntactic sugar for `Choice` over an enumerated constant set's
    /// string values; the matched value is returned as the enum tag.
    EnumChoice(&'static str, Vec<(&'static str, &'static str)>),
    /// Zero-width, always-succeeds rule that captures the current
    /// position (spec.md §9 Open Question; see SPEC_FULL.md §3).
    Here,
    /// Always succeeds, consumes nothing, yields [`Node::None_`]. Used to
    /// lower `Optional` and to stand in for grammar-dialect `NONE`.
    Empty,
}
