//! The packrat driver with left recursion (spec.md §4.3), ported from
//! `examples/original_source/src/parsival/__init__.py`'s `apply_rule`,
//! `recall`, `setup_lr`, `lr_answer`, and `grow_lr` -- the full
//! Warth/Douglass/Millstein PEPM'08 algorithm, including the `Head`/
//! `involved`/`eval` bookkeeping needed for *indirect* left recursion
//! (not just a single directly-recursive call).

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::arena::Grammar;
use crate::config::ParserConfig;
use crate::cursor::Cursor;
use crate::error::Error;
use crate::introspect::FieldCache;
use crate::memo::{AnswerF, Head, MemoAns, MemoEntry, MemoState};
use crate::node::Node;
use crate::rule::RuleId;
use crate::signal::Signal;

/// Owns the cursor, memo table, LR stack, and heads map for one parse.
/// Not safe for concurrent use from multiple threads; multiple `Parser`s
/// may run concurrently on disjoint inputs (spec.md §5).
pub struct Parser<'g, 'a> {
    pub(crate) grammar: &'g Grammar,
    pub(crate) cursor: Cursor<'a>,
    memo: MemoState,
    pub(crate) fields: FieldCache,
    config: ParserConfig,
    depth: Cell<usize>,
    depth_exceeded: Cell<bool>,
}

impl<'g, 'a> Parser<'g, 'a> {
    pub fn new(grammar: &'g Grammar, text: &'a str, config: ParserConfig) -> Self {
        Parser {
            grammar,
            cursor: Cursor::new(text),
            memo: MemoState::new(config.memo_capacity_hint),
            fields: FieldCache::new(),
            config,
            depth: Cell::new(0),
            depth_exceeded: Cell::new(false),
        }
    }

    pub fn parse(&self, start: RuleId, raise_on_unconsumed: bool) -> Result<Node, Error> {
        self.cursor.set_pos(0);
        match self.apply_rule(start, 0) {
            Ok(value) => {
                if raise_on_unconsumed && self.cursor.pos() < self.cursor.len() {
                    let remaining = self.cursor.remaining().to_owned();
                    return Err(Error::UnconsumedInput(remaining));
                }
                Ok(value)
            }
            Err(signal) => Err(self.to_public_error(signal)),
        }
    }

    pub fn parse_partial(&self, start: RuleId) -> Result<(Node, usize), Error> {
        self.cursor.set_pos(0);
        match self.apply_rule(start, 0) {
            Ok(value) => Ok((value, self.cursor.pos())),
            Err(signal) => Err(self.to_public_error(signal)),
        }
    }

    fn to_public_error(&self, signal: Signal) -> Error {
        if self.depth_exceeded.get() {
            return Error::Schema(signal.message().to_owned());
        }
        let (line, col) = self.cursor.line_col(self.cursor.pos());
        Error::Syntax {
            expected: signal.message().to_owned(),
            line,
            col,
        }
    }

    /// Packrat parse with memoization and left-recursion support
    /// (`apply_rule_inner` + the raising wrapper in the original --
    /// collapsed into one `Result`-returning function here).
    pub(crate) fn apply_rule(&self, rule: RuleId, pos: usize) -> AnswerF {
        let depth = self.depth.get() + 1;
        if depth > self.config.max_depth {
            self.depth_exceeded.set(true);
            return Err(Signal::Fail(format!(
                "recursion depth exceeded (> {})",
                self.config.max_depth
            )));
        }
        self.depth.set(depth);
        let result = self.apply_rule_inner(rule, pos);
        self.depth.set(depth - 1);
        result
    }

    fn apply_rule_inner(&self, rule: RuleId, pos: usize) -> AnswerF {
        trace!(rule, pos, "apply_rule");
        match self.recall(rule, pos) {
            None => {
                let lr = self.memo.push_lr(rule);
                let entry = Rc::new(MemoEntry {
                    ans: std::cell::RefCell::new(MemoAns::Lr(lr.clone())),
                    pos: Cell::new(pos),
                });
                self.memo.insert(rule, pos, entry.clone());

                self.cursor.set_pos(pos);
                let ans = self.try_rule(rule);
                self.memo.pop_lr();
                entry.pos.set(self.cursor.pos());

                let head_opt = lr.head.borrow().clone();
                match head_opt {
                    Some(_) => {
                        debug!(rule, pos, "left recursion detected, growing seed");
                        *lr.seed.borrow_mut() = ans;
                        self.lr_answer(rule, pos, &entry)
                    }
                    None => {
                        *entry.ans.borrow_mut() = MemoAns::Done(ans.clone());
                        ans
                    }
                }
            }
            Some(entry) => {
                self.cursor.set_pos(entry.pos.get());
                let lr = match &*entry.ans.borrow() {
                    MemoAns::Lr(lr) => Some(lr.clone()),
                    MemoAns::Done(_) => None,
                };
                match lr {
                    Some(lr) => {
                        self.setup_lr(rule, &lr);
                        lr.seed.borrow().clone()
                    }
                    None => match &*entry.ans.borrow() {
                        MemoAns::Done(ans) => ans.clone(),
                        MemoAns::Lr(_) => unreachable!(),
                    },
                }
            }
        }
    }

    fn recall(&self, rule: RuleId, pos: usize) -> Option<Rc<MemoEntry>> {
        let m = self.memo.get(rule, pos);
        let head = match self.memo.head_at(pos) {
            None => return m,
            Some(head) => head,
        };
        if m.is_none() && rule != head.rule && !head.involved.borrow().contains(&rule) {
            return Some(Rc::new(MemoEntry {
                ans: std::cell::RefCell::new(MemoAns::Done(Err(Signal::Fail(
                    "invalid parser state 2".into(),
                )))),
                pos: Cell::new(pos),
            }));
        }
        if head.eval.borrow_mut().remove(&rule) {
            self.cursor.set_pos(pos);
            let ans = self.try_rule(rule);
            let entry = m.unwrap_or_else(|| {
                Rc::new(MemoEntry {
                    ans: std::cell::RefCell::new(MemoAns::Done(Err(Signal::Fail(
                        "invalid parser state 3".into(),
                    )))),
                    pos: Cell::new(0),
                })
            });
            *entry.ans.borrow_mut() = MemoAns::Done(ans);
            entry.pos.set(self.cursor.pos());
            return Some(entry);
        }
        m
    }

    fn setup_lr(&self, rule: RuleId, lr: &Rc<crate::memo::LrMarker>) {
        if lr.head.borrow().is_none() {
            *lr.head.borrow_mut() = Some(MemoState::new_head(rule));
        }
        let head = lr.head.borrow().clone().expect("just set above");
        let mut stack = self.lr_stack_above(lr);
        while let Some(frame) = stack {
            let already = frame
                .head
                .borrow()
                .as_ref()
                .map_or(false, |h| Rc::ptr_eq(h, &head));
            if already {
                break;
            }
            *frame.head.borrow_mut() = Some(head.clone());
            head.involved.borrow_mut().insert(frame.rule);
            stack = frame.next.clone();
        }
    }

    /// The live LR stack, as seen from the top (matches the original
    /// walking `self.lr_stack` directly; `lr` itself is always already
    /// somewhere in that stack by the time `setup_lr` runs).
    fn lr_stack_above(&self, _lr: &Rc<crate::memo::LrMarker>) -> Option<Rc<crate::memo::LrMarker>> {
        self.memo.lr_stack_top()
    }

    fn lr_answer(&self, rule: RuleId, pos: usize, m: &Rc<MemoEntry>) -> AnswerF {
        let lr = match &*m.ans.borrow() {
            MemoAns::Lr(lr) => lr.clone(),
            MemoAns::Done(_) => panic!("internal error: lr_answer on a finished entry"),
        };
        let head = lr
            .head
            .borrow()
            .clone()
            .expect("internal error: lr_answer before head is set");
        if head.rule != rule {
            return lr.seed.borrow().clone();
        }
        let seed = lr.seed.borrow().clone();
        *m.ans.borrow_mut() = MemoAns::Done(seed.clone());
        match seed {
            Err(_) => seed,
            Ok(_) => self.grow_lr(rule, pos, m, &head),
        }
    }

    fn grow_lr(&self, rule: RuleId, pos: usize, m: &Rc<MemoEntry>, head: &Rc<Head>) -> AnswerF {
        self.memo.set_head_at(pos, head.clone());
        loop {
            self.cursor.set_pos(pos);
            let involved = head.involved.borrow().clone();
            *head.eval.borrow_mut() = involved;
            let ans = self.try_rule(rule);
            if ans.is_err() || self.cursor.pos() <= m.pos.get() {
                break;
            }
            *m.ans.borrow_mut() = MemoAns::Done(ans);
            m.pos.set(self.cursor.pos());
        }
        debug!(rule, pos, end = m.pos.get(), "left recursion growth stopped");
        self.memo.clear_head_at(pos);
        self.cursor.set_pos(m.pos.get());
        match &*m.ans.borrow() {
            MemoAns::Done(ans) => ans.clone(),
            MemoAns::Lr(_) => unreachable!("internal error: grow_lr left an Lr marker installed"),
        }
    }
}
