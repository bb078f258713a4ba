//! Memoization and left-recursion bookkeeping (spec.md §3, §4.3).
//!
//! Ported from the Warth/Douglass/Millstein algorithm as implemented in
//! `examples/original_source/src/parsival/__init__.py` (`MemoEntry`,
//! `LR`, `Head`), kept as close to that shape as a statically typed,
//! ownership-checked rewrite allows: the Python's mutable dataclasses
//! become `Rc`-shared structs with `RefCell`/`Cell` fields, and an
//! `rustc_hash::FxHashMap` replaces the Python's `defaultdict`.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::node::Node;
use crate::rule::RuleId;
use crate::signal::Signal;

pub type AnswerF = Result<Node, Signal>;

/// Per-position descriptor tracking which rules participate in an active
/// left-recursion cycle (spec.md §3 "Head").
pub struct Head {
    pub rule: RuleId,
    pub involved: RefCell<FxHashSet<RuleId>>,
    pub eval: RefCell<FxHashSet<RuleId>>,
}

impl Head {
    fn new(rule: RuleId) -> Rc<Head> {
        Rc::new(Head {
            rule,
            involved: RefCell::new(HashSet::default()),
            eval: RefCell::new(HashSet::default()),
        })
    }
}

/// An in-progress left-recursive invocation. Doubles as both the memo
/// entry's "still growing" marker and a frame of the LR invocation
/// stack -- `next` links to the previous top of stack, exactly as the
/// original's `LR.next` does.
pub struct LrMarker {
    pub seed: RefCell<AnswerF>,
    pub rule: RuleId,
    pub head: RefCell<Option<Rc<Head>>>,
    pub next: Option<Rc<LrMarker>>,
}

/// Either a finished parse result, or a marker for a left-recursive
/// invocation still being grown.
pub enum MemoAns {
    Lr(Rc<LrMarker>),
    Done(AnswerF),
}

/// Keyed by `(rule, start_pos)` (spec.md §3 "Memo entry").
pub struct MemoEntry {
    pub ans: RefCell<MemoAns>,
    /// The cursor position at which this entry's parse ended.
    pub pos: Cell<usize>,
}

/// The full memo table plus the LR invocation stack and per-position
/// heads map for one [`crate::driver::Parser`] run.
pub struct MemoState {
    table: RefCell<FxHashMap<(RuleId, usize), Rc<MemoEntry>>>,
    heads: RefCell<FxHashMap<usize, Rc<Head>>>,
    lr_stack: RefCell<Option<Rc<LrMarker>>>,
}

impl MemoState {
    /// `capacity_hint` pre-sizes the `(rule, pos)` memo table
    /// (`ParserConfig::memo_capacity_hint`) to avoid rehashing during
    /// the early growth of a parse; the heads map and LR stack start
    /// empty regardless, since neither scales with input size the way
    /// the memo table does.
    pub fn new(capacity_hint: usize) -> Self {
        MemoState {
            table: RefCell::new(FxHashMap::with_capacity_and_hasher(
                capacity_hint,
                Default::default(),
            )),
            heads: RefCell::new(FxHashMap::default()),
            lr_stack: RefCell::new(None),
        }
    }

    pub fn get(&self, rule: RuleId, pos: usize) -> Option<Rc<MemoEntry>> {
        self.table.borrow().get(&(rule, pos)).cloned()
    }

    pub fn insert(&self, rule: RuleId, pos: usize, entry: Rc<MemoEntry>) {
        self.table.borrow_mut().insert((rule, pos), entry);
    }

    pub fn head_at(&self, pos: usize) -> Option<Rc<Head>> {
        self.heads.borrow().get(&pos).cloned()
    }

    pub fn set_head_at(&self, pos: usize, head: Rc<Head>) {
        self.heads.borrow_mut().insert(pos, head);
    }

    pub fn clear_head_at(&self, pos: usize) {
        self.heads.borrow_mut().remove(&pos);
    }

    pub fn push_lr(&self, rule: RuleId) -> Rc<LrMarker> {
        let next = self.lr_stack.borrow().clone();
        let marker = Rc::new(LrMarker {
            seed: RefCell::new(Err(Signal::Fail("invalid parser state 1".into()))),
            rule,
            head: RefCell::new(None),
            next,
        });
        *self.lr_stack.borrow_mut() = Some(marker.clone());
        marker
    }

    pub fn pop_lr(&self) {
        let next = self
            .lr_stack
            .borrow()
            .as_ref()
            .expect("internal error: LR stack underflow")
            .next
            .clone();
        *self.lr_stack.borrow_mut() = next;
    }

    pub fn lr_stack_top(&self) -> Option<Rc<LrMarker>> {
        self.lr_stack.borrow().clone()
    }

    pub fn new_head(rule: RuleId) -> Rc<Head> {
        Head::new(rule)
    }
}
