//! The grammar-dialect AST (spec.md §4.5), produced by [`crate::frontend`].
//!
//! Grounded in `examples/original_source/src/parsival/peg_grammar.py`
//! (the dialect's own grammar, written in itself) but collapsed from
//! that file's per-alternative dataclass-union encoding (`Item_1`,
//! `Item_2`, …) into ordinary Rust sum types, since this is a static
//! rewrite and doesn't need the original's runtime type-tag dance.

#[derive(Debug, Clone)]
pub struct GrammarFile {
    pub metas: Vec<Meta>,
    pub rules: Vec<RuleDecl>,
}

#[derive(Debug, Clone)]
pub struct Meta {
    pub name: String,
    pub value: Option<MetaValue>,
}

#[derive(Debug, Clone)]
pub enum MetaValue {
    Name(String),
    Str(String),
}

#[derive(Debug, Clone)]
pub struct RuleDecl {
    pub name: String,
    pub type_annotation: Option<TypeAnnotation>,
    pub alts: Vec<Alt>,
}

/// `[Type]` or `[Type*]` -- carried through from the source but not
/// otherwise interpreted by `middle`/`backend` (it documents the
/// produced node's shape; the node's actual shape is derived from the
/// alternatives themselves, matching the original where the
/// annotation is likewise unused by `gram_to_py.py`'s lowering).
#[derive(Debug, Clone)]
pub struct TypeAnnotation {
    pub type_name: String,
    pub list: bool,
}

#[derive(Debug, Clone)]
pub struct Alt {
    pub items: Vec<NamedItem>,
}

#[derive(Debug, Clone)]
pub struct NamedItem {
    pub name: Option<String>,
    pub item: Item,
}

#[derive(Debug, Clone)]
pub enum Item {
    Plain(Plain),
    Quantified { node: Plain, quantifier: Quantifier },
    Separated { node: Plain, sep: Plain },
    /// `[...]`: a bracketed optional group of alternatives.
    Bracket(Vec<Alt>),
    /// `&atom` / `!atom`; binds only to a `Plain`, not a quantified item,
    /// matching `LookaheadOrCut`'s `atom: Plain` in the original.
    Lookahead { positive: bool, atom: Plain },
    /// `~`
    Cut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Optional,
    Star,
    Plus,
}

#[derive(Debug, Clone)]
pub enum Plain {
    /// `(...)`: a parenthesized group of alternatives.
    Group(Vec<Alt>),
    /// `r"..."`: a regex pattern.
    Regex(String),
    /// `"..."` / `'...'`: a literal string.
    Str(String),
    /// A bare identifier: a rule reference, a built-in token name, or
    /// `NONE`.
    Name(String),
}
