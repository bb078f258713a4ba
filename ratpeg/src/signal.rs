//! The two in-flight failure signals (spec.md §7).
//!
//! `ParseFailure`/`CommittedFailure` never escape the engine as such --
//! they are this `Signal`, threaded through `Result<Node, Signal>` inside
//! [`crate::evaluator`] and [`crate::driver`], and converted to the
//! public [`crate::Error`] only by the outermost `apply_rule` call.

#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// An alternative did not match. Caught by the enclosing
    /// choice/optional/repetition.
    Fail(String),
    /// A `ParseFailure` raised after a `Commit` marker was passed inside
    /// the current sequence. Propagates through exactly one enclosing
    /// `Choice` (which must not try its remaining alternatives), then is
    /// reclassified as an ordinary `Fail` going further outward.
    CommitFail(String),
}

impl Signal {
    pub fn message(&self) -> &str {
        match self {
            Signal::Fail(m) | Signal::CommitFail(m) => m,
        }
    }

    /// Reclassify a committed failure as an ordinary one, for
    /// propagation past the choice boundary that already consumed its
    /// "stop trying alternatives" effect.
    pub fn demote(self) -> Signal {
        match self {
            Signal::CommitFail(m) => Signal::Fail(m),
            other => other,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Signal::CommitFail(_))
    }

    /// Turn an ordinary failure into a committed one, once a `Commit`
    /// marker has been passed inside the enclosing sequence.
    pub fn promote(self) -> Signal {
        match self {
            Signal::Fail(m) => Signal::CommitFail(m),
            other => other,
        }
    }
}
