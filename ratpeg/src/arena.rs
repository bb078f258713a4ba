//! Arena allocation for rule nodes (spec.md §9 "Cyclic rule graphs":
//! "Arena-allocate rule nodes and refer to sibling rules by index").

use rustc_hash::FxHashMap;

use crate::config::ParserConfig;
use crate::driver::Parser;
use crate::error::Error;
use crate::node::Node;
use crate::rule::{Converter, RuleId, RuleNode};

/// A fully built, immutable grammar: an arena of [`RuleNode`]s plus the
/// name table used to resolve `Ref`-by-name during construction and for
/// diagnostics afterwards.
pub struct Grammar {
    pub(crate) nodes: Vec<RuleNode>,
    pub(crate) names: FxHashMap<String, RuleId>,
}

impl Grammar {
    pub fn rule(&self, id: RuleId) -> &RuleNode {
        &self.nodes[id]
    }

    pub fn rule_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a rule previously registered under `name`, e.g. a builtin
    /// or a named grammar rule.
    pub fn rule_named(&self, name: &str) -> Option<RuleId> {
        self.names.get(name).copied()
    }

    /// Parse `text` against `start`, requiring every byte to be
    /// consumed (spec.md §6's `parse(text, start_rule,
    /// raise_on_unconsumed=true)`). Constructs and discards a fresh
    /// [`Parser`] per call.
    pub fn parse(&self, text: &str, start: RuleId, config: ParserConfig) -> Result<Node, Error> {
        Parser::new(self, text, config).parse(start, true)
    }

    /// Parse as much of a leading prefix of `text` against `start` as
    /// matches, never failing on unconsumed trailing input. Returns the
    /// value and the offset parsing stopped at.
    pub fn parse_partial(
        &self,
        text: &str,
        start: RuleId,
        config: ParserConfig,
    ) -> Result<(Node, usize), Error> {
        Parser::new(self, text, config).parse_partial(start)
    }
}

/// Builds a [`Grammar`], supporting forward references: [`declare`] reserves
/// a slot before the rule it names has a body, so mutually and
/// self-recursive rules can refer to each other by [`RuleId`] before either
/// is [`define`]d.
///
/// [`declare`]: GrammarBuilder::declare
/// [`define`]: GrammarBuilder::define
pub struct GrammarBuilder {
    nodes: Vec<Option<RuleNode>>,
    names: FxHashMap<String, RuleId>,
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarBuilder {
    /// A fresh builder, pre-loaded with the built-in rules
    /// (`SPACE`, `NAME`, `STRING`, ...; see [`crate::builtins`]) under
    /// their fixed names.
    pub fn new() -> Self {
        let mut builder = GrammarBuilder {
            nodes: Vec::new(),
            names: FxHashMap::default(),
        };
        crate::builtins::register(&mut builder);
        builder
    }

    /// Reserve a slot for a rule that will be named `name`, returning the
    /// id other rules can reference immediately.
    pub fn declare(&mut self, name: &str) -> RuleId {
        let id = self.nodes.len();
        self.nodes.push(None);
        self.names.insert(name.to_owned(), id);
        id
    }

    /// Reserve an anonymous slot (used for synthetic sub-rules emitted by
    /// the grammar compiler, e.g. parenthesized groups).
    pub fn reserve(&mut self) -> RuleId {
        let id = self.nodes.len();
        self.nodes.push(None);
        id
    }

    /// Fill in a previously reserved slot.
    ///
    /// # Panics
    /// Panics if `id` is out of range or already defined -- both are
    /// builder-usage bugs, not grammar-data errors.
    pub fn define(&mut self, id: RuleId, node: RuleNode) {
        let slot = self
            .nodes
            .get_mut(id)
            .unwrap_or_else(|| panic!("internal error: no such rule slot {id}"));
        if slot.is_some() {
            panic!("internal error: rule slot {id} already defined");
        }
        *slot = Some(node);
    }

    /// Declare and define an anonymous rule in one step, returning its id.
    pub fn push(&mut self, node: RuleNode) -> RuleId {
        let id = self.reserve();
        self.define(id, node);
        id
    }

    /// Declare and define a named rule in one step, returning its id.
    pub fn named(&mut self, name: &str, node: RuleNode) -> RuleId {
        let id = self.declare(name);
        self.define(id, node);
        id
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.names.get(name).copied()
    }

    // Rule authoring surface (spec.md §6): thin, named wrappers over
    // `push` for each `RuleNode` variant, so callers building grammars
    // by hand (rather than through the grammar-file compiler) don't
    // need to name the arena representation directly.

    /// `Literal[v1, .., vn]`: ordered alternatives of literal strings.
    pub fn literal<I, S>(&mut self, values: I) -> RuleId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(RuleNode::Literal(values.into_iter().map(Into::into).collect()))
    }

    /// `Regex[converter, pattern, flags]`. `pattern` may embed inline
    /// flags (e.g. `(?i)`) the way the `regex` crate supports.
    ///
    /// # Panics
    /// Panics if `pattern` does not compile -- grammar authors pass
    /// literal patterns, so a bad one is a builder-usage bug.
    pub fn regex(&mut self, pattern: &str, converter: Converter) -> RuleId {
        self.push(RuleNode::Regex {
            pattern: regex::Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid regex {pattern:?}: {e}")),
            converter,
            raw: false,
        })
    }

    /// Negative lookahead: succeeds iff `rule` fails; never consumes.
    pub fn not(&mut self, rule: RuleId) -> RuleId {
        self.push(RuleNode::Not(rule))
    }

    /// Positive lookahead: succeeds iff `rule` succeeds; never consumes.
    pub fn lookahead(&mut self, rule: RuleId) -> RuleId {
        self.push(RuleNode::Lookahead(rule))
    }

    /// Zero-width marker that converts later failures in the same
    /// sequence into committed failures.
    pub fn commit(&mut self) -> RuleId {
        self.push(RuleNode::Commit)
    }

    /// `rule` or nothing; always succeeds.
    pub fn optional(&mut self, rule: RuleId) -> RuleId {
        self.push(RuleNode::Optional(rule))
    }

    /// Ordered choice over `alts`; first successful alternative wins.
    pub fn choice<I>(&mut self, alts: I) -> RuleId
    where
        I: IntoIterator<Item = RuleId>,
    {
        self.push(RuleNode::Choice(alts.into_iter().collect()))
    }

    /// Zero-or-more (`min == 0`) or one-or-more (`min == 1`) repetition
    /// of `item`, optionally interleaved with `separator`.
    pub fn repeat(&mut self, item: RuleId, min: usize, separator: Option<RuleId>) -> RuleId {
        self.push(RuleNode::Repeat {
            item,
            min,
            separator,
        })
    }

    /// Sugar for a [`RuleNode::Choice`] over an enumerated constant
    /// set's string values, tagging the match with the enum's name.
    pub fn enum_choice<I>(&mut self, name: &'static str, variants: I) -> RuleId
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        self.push(RuleNode::EnumChoice(name, variants.into_iter().collect()))
    }

    /// Finish building. Fails with [`Error::Schema`] if any declared slot
    /// was never defined.
    pub fn build(self) -> Result<Grammar, Error> {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (id, slot) in self.nodes.into_iter().enumerate() {
            match slot {
                Some(node) => nodes.push(node),
                None => {
                    return Err(Error::Schema(format!(
                        "rule slot {id} was declared but never defined"
                    )))
                }
            }
        }
        Ok(Grammar {
            nodes,
            names: self.names,
        })
    }
}
