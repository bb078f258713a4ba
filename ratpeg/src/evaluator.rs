//! Rule dispatch (spec.md §4.2): the single-step evaluation of one
//! [`crate::rule::RuleNode`] at the cursor's current position.
//!
//! Every sub-rule mentioned here is applied via
//! [`crate::driver::Parser::apply_rule`], never evaluated directly, so
//! that nested rules still go through memoization and left-recursion
//! growth. This mirrors the original's `try_rule`
//! (`examples/original_source/src/parsival/__init__.py`), which
//! likewise recurses only through `self.apply_rule`.

use std::rc::Rc;

use crate::driver::Parser;
use crate::memo::AnswerF;
use crate::node::Node;
use crate::rule::{Converter, RecordClass, RuleId, RuleNode};
use crate::signal::Signal;

impl<'g, 'a> Parser<'g, 'a> {
    /// Evaluate `id` once, against `self.cursor`'s current position.
    /// Whitespace is skipped first, except for `Not` (which must test
    /// at the un-skipped position to compose correctly with
    /// lookahead) and raw regexes (`SPACE`, `NO_LF_SPACE` themselves,
    /// which would otherwise swallow what they're meant to measure).
    pub(crate) fn try_rule(&self, id: RuleId) -> AnswerF {
        let node = self.grammar.rule(id);

        if let RuleNode::Not(inner) = node {
            return self.eval_not(*inner);
        }
        if let RuleNode::Regex {
            raw: true,
            pattern,
            converter,
        } = node
        {
            return self.eval_regex(pattern, converter);
        }

        self.cursor.skip_whitespace();
        match node {
            RuleNode::Literal(values) => self.eval_literal(values),
            RuleNode::Regex {
                pattern, converter, ..
            } => self.eval_regex(pattern, converter),
            RuleNode::Choice(alts) => self.eval_choice(alts),
            RuleNode::Sequence(class) => self.eval_sequence(id, class),
            RuleNode::Repeat {
                item,
                min,
                separator,
            } => self.eval_repeat(*item, *min, *separator),
            RuleNode::Optional(inner) => self.eval_optional(*inner),
            RuleNode::Not(_) => unreachable!("handled above"),
            RuleNode::Lookahead(inner) => self.eval_lookahead(*inner),
            RuleNode::Commit => Ok(Node::Commit),
            RuleNode::EnumChoice(name, variants) => self.eval_enum_choice(name, variants),
            RuleNode::Here => Ok(Node::Pos(self.cursor.pos())),
            RuleNode::Empty => Ok(Node::None_),
        }
    }

    fn eval_not(&self, inner: RuleId) -> AnswerF {
        let pos = self.cursor.pos();
        let result = self.apply_rule(inner, pos);
        self.cursor.set_pos(pos);
        match result {
            Ok(_) => Err(Signal::Fail(format!(
                "expected not to match at {}",
                self.cursor.strpos(pos)
            ))),
            Err(_) => Ok(Node::None_),
        }
    }

    fn eval_regex(&self, pattern: &regex::Regex, converter: &Converter) -> AnswerF {
        let pos = self.cursor.pos();
        let text = self.cursor.text();
        match pattern.find_at(text, pos) {
            Some(m) if m.start() == pos => {
                self.cursor.set_pos(m.end());
                Ok(converter(&text[pos..m.end()]))
            }
            _ => Err(Signal::Fail(format!(
                "expected /{}/ to match at {}",
                pattern.as_str(),
                self.cursor.strpos(pos)
            ))),
        }
    }

    fn eval_literal(&self, values: &[String]) -> AnswerF {
        let pos = self.cursor.pos();
        let text = self.cursor.remaining();
        for v in values {
            if text.starts_with(v.as_str()) {
                self.cursor.set_pos(pos + v.len());
                return Ok(Node::Str(Rc::from(v.as_str())));
            }
        }
        Err(Signal::Fail(format!(
            "expected one of {:?} at {}",
            values,
            self.cursor.strpos(pos)
        )))
    }

    /// Ordered choice. A committed failure stops trying further
    /// alternatives and is demoted to an ordinary failure for whatever
    /// lies outside this choice (spec.md §7): the demotion happens
    /// here, at the boundary that already "spent" the commit's
    /// effect, not one level further up.
    fn eval_choice(&self, alts: &[RuleId]) -> AnswerF {
        let pos = self.cursor.pos();
        let mut last_err = None;
        for &alt in alts {
            self.cursor.set_pos(pos);
            match self.apply_rule(alt, pos) {
                Ok(value) => return Ok(value),
                Err(sig) if sig.is_committed() => {
                    self.cursor.set_pos(pos);
                    return Err(sig.demote());
                }
                Err(sig) => last_err = Some(sig),
            }
        }
        self.cursor.set_pos(pos);
        Err(last_err.unwrap_or_else(|| {
            Signal::Fail(format!(
                "expected one of {} alternatives at {}",
                alts.len(),
                self.cursor.strpos(pos)
            ))
        }))
    }

    fn eval_sequence(&self, id: RuleId, class: &RecordClass) -> AnswerF {
        let fields = self.fields.get_or_insert(id, &class.fields);
        let mut committed = false;
        let mut out = Vec::with_capacity(fields.len());
        for field in fields.iter() {
            if matches!(self.grammar.rule(field.rule), RuleNode::Commit) {
                committed = true;
                continue;
            }
            let pos = self.cursor.pos();
            match self.apply_rule(field.rule, pos) {
                Ok(value) => {
                    if !field.hidden {
                        out.push((field.name, value));
                    }
                }
                Err(sig) => {
                    return Err(if committed { sig.promote() } else { sig });
                }
            }
        }
        Ok(Node::Record {
            class: class.name,
            fields: out,
        })
    }

    /// Greedy repetition (spec.md §4.2). With a separator, matching it
    /// obligates another element: if the separator just matched and
    /// the next element then fails, that is a hard failure of the
    /// whole repeat rather than a clean stop, so that e.g. `items ←
    /// atom.','+` rejects a dangling trailing comma instead of quietly
    /// accepting it. Without a separator, or when the separator itself
    /// fails to match, the loop ends cleanly and the elements matched
    /// so far stand.
    fn eval_repeat(&self, item: RuleId, min: usize, separator: Option<RuleId>) -> AnswerF {
        let mut values = Vec::new();
        let mut separator_pending = false;
        loop {
            let before_item = self.cursor.pos();
            match self.apply_rule(item, before_item) {
                Ok(value) => values.push(value),
                Err(e) => {
                    self.cursor.set_pos(before_item);
                    if separator_pending {
                        return Err(e);
                    }
                    break;
                }
            }
            separator_pending = false;
            match separator {
                None => continue,
                Some(sep) => {
                    let before_sep = self.cursor.pos();
                    match self.apply_rule(sep, before_sep) {
                        Ok(_) => separator_pending = true,
                        Err(_) => {
                            self.cursor.set_pos(before_sep);
                            break;
                        }
                    }
                }
            }
        }
        if values.len() < min {
            return Err(Signal::Fail(format!(
                "failed to match at least {min} of rule {item} at {}",
                self.cursor.strpos(self.cursor.pos())
            )));
        }
        Ok(Node::List(values))
    }

    fn eval_optional(&self, inner: RuleId) -> AnswerF {
        let pos = self.cursor.pos();
        match self.apply_rule(inner, pos) {
            Ok(value) => Ok(value),
            Err(_) => {
                self.cursor.set_pos(pos);
                Ok(Node::None_)
            }
        }
    }

    fn eval_lookahead(&self, inner: RuleId) -> AnswerF {
        let pos = self.cursor.pos();
        let result = self.apply_rule(inner, pos);
        self.cursor.set_pos(pos);
        result
    }

    fn eval_enum_choice(&self, name: &'static str, variants: &[(&'static str, &'static str)]) -> AnswerF {
        let pos = self.cursor.pos();
        let text = self.cursor.remaining();
        for (variant, literal) in variants {
            if text.starts_with(literal) {
                self.cursor.set_pos(pos + literal.len());
                return Ok(Node::Enum { name, variant });
            }
        }
        Err(Signal::Fail(format!(
            "expected one of enum {name} at {}",
            self.cursor.strpos(pos)
        )))
    }
}
