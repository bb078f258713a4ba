//! Error taxonomy (spec.md §7).

/// The user-visible outcome of a [`crate::driver::Parser`] call.
///
/// `ParseFailure` and `CommittedFailure` are deliberately *not* variants
/// here -- per spec.md §7 they are ordinary in-flight signals caught by
/// every choice/optional/repetition, never surfaced to the caller. See
/// [`crate::driver::Signal`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An outermost rule failed to parse: `expected` names what was
    /// looked for, `line`/`col` are 1-indexed.
    #[error("expected {expected} at line {line} col {col}")]
    Syntax {
        expected: String,
        line: usize,
        col: usize,
    },
    /// The parse succeeded but did not consume all input and
    /// `raise_on_unconsumed` was set.
    #[error("data remains after parse: {0:?}")]
    UnconsumedInput(String),
    /// The rule graph itself is malformed: a bad quantifier, an
    /// undefined rule slot, a reference to a rule that doesn't exist.
    /// Always fatal; never backtracked.
    #[error("malformed rule graph: {0}")]
    Schema(String),
}
