//! Rule introspection (spec.md §4.4).
//!
//! A [`crate::rule::RecordClass`]'s field list is already ordered and
//! built once, at grammar-construction time -- there is no reflection
//! step the way the original's `get_annotations` (backed by
//! `typing.get_type_hints`) needs one. What this module caches is the
//! cheap-clone handle the evaluator dispatches through, mirroring the
//! original's per-class `annotations_cache`: first access to a given
//! `Sequence` rule clones an `Rc<[Field]>` into the cache, every later
//! dispatch on that rule clones the `Rc` instead of the underlying
//! `Vec<Field>`.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::rule::{Field, RuleId};

#[derive(Default)]
pub struct FieldCache {
    cache: RefCell<FxHashMap<RuleId, Rc<[Field]>>>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the cached field list for `id`, populating it from
    /// `fields` on first access.
    pub fn get_or_insert(&self, id: RuleId, fields: &[Field]) -> Rc<[Field]> {
        let mut cache = self.cache.borrow_mut();
        cache
            .entry(id)
            .or_insert_with(|| Rc::from(fields.to_vec()))
            .clone()
    }
}
