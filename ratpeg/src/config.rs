//! Parser configuration (SPEC_FULL.md §9 "Recursion depth").

/// Tunables for a single [`crate::driver::Parser`] run.
#[derive(Debug, Clone, Copy)]
pub struct ParserConfig {
    /// Maximum depth of nested `apply_rule` invocations before the
    /// parser gives up with [`crate::Error::Schema`] instead of blowing
    /// the native stack. Ordinary grammars (arithmetic towers, deeply
    /// nested parens) clear this comfortably; it exists as a guard
    /// rail, not a semantic limit.
    pub max_depth: usize,
    /// Initial capacity for the `(rule, pos)` memo table
    /// (`MemoState::new`), sized to the input length times the rule
    /// count when known, to avoid rehashing while a parse is still
    /// filling the table in.
    pub memo_capacity_hint: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_depth: 4096,
            memo_capacity_hint: 256,
        }
    }
}
