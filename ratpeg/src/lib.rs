//! A packrat PEG parsing engine with full Warth/Douglass/Millstein
//! left-recursion support (direct and indirect), built around a
//! runtime rule graph rather than a combinator tree: a [`Grammar`] is
//! data, assembled once via [`GrammarBuilder`] and then driven
//! repeatedly by [`Parser`].
//!
//! ```text
//! let mut b = GrammarBuilder::new();
//! let digit = b.push(RuleNode::Regex { .. });
//! let expr = b.declare("expr");
//! b.define(expr, RuleNode::Choice(vec![ .. ]));
//! let grammar = b.build()?;
//! let parser = Parser::new(&grammar, "1 + 2", ParserConfig::default());
//! let tree = parser.parse(expr, true)?;
//! ```

mod arena;
mod builtins;
mod config;
mod cursor;
mod driver;
mod error;
mod evaluator;
mod introspect;
mod memo;
mod node;
mod rule;
mod signal;

pub use crate::arena::{Grammar, GrammarBuilder};
pub use crate::config::ParserConfig;
pub use crate::driver::Parser;
pub use crate::error::Error;
pub use crate::node::Node;
pub use crate::rule::{Converter, Field, RecordClass, RuleId, RuleNode};

pub mod builtin_rules {
    //! Names of the rules every [`crate::GrammarBuilder`] pre-registers;
    //! look them up with [`crate::Grammar::rule_named`].
    pub use crate::builtins::{
        DEDENT, ENDMARKER, INDENT, NAME, NEWLINE, NO_LF_SPACE, NO_SPACE, SPACE, STRING,
    };
}
