//! Lowering from the grammar-dialect AST to an emission plan, ported
//! from `scripts/grammar_generator/gram_to_py.py`'s `process_rule` /
//! `process_item` / `make_annotation`.
//!
//! The Python keeps a module-level `rule_classes: dict[str, str]`
//! mapping grammar rule names to emitted class names. SPEC_FULL.md §9
//! (the "Mutable global state" design note) calls for passing that
//! table explicitly instead; here it is [`NameTable`], threaded
//! through every lowering call as `&mut NameTable` rather than kept as
//! a free-floating global.

use rustc_hash::FxHashSet;

use crate::syntax::{Alt, GrammarFile, Item, NamedItem, Plain, Quantifier};

#[derive(Debug, thiserror::Error)]
pub enum LowerError {
    #[error("duplicate rule name {0:?}")]
    DuplicateRule(String),
    #[error("{0:?} is not a known built-in token rule")]
    UnknownBuiltin(String),
}

/// One rule that will be declared and defined in the emitted program,
/// in the order it should be `b.declare(..)`-d (declaration order
/// doesn't matter for correctness, since every reference resolves by
/// name at runtime, but preserving source order keeps generated code
/// readable).
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub shape: Shape,
}

#[derive(Debug, Clone)]
pub enum Shape {
    /// Every alternative is a single item: collapses to a direct
    /// choice over those items, no sub-classes.
    Union(Vec<RuleExpr>),
    /// One or more alternatives have more than one item, or there's
    /// more than one alternative that isn't a single bare item: each
    /// alternative becomes its own numbered sequence sub-rule
    /// (`Name_1`, `Name_2`, ...), unioned together. A single
    /// multi-item alternative collapses directly to one `Sequence`
    /// under `name` with no numbering.
    Sequence(Vec<FieldSpec>),
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub expr: RuleExpr,
    pub hidden: bool,
}

/// How to obtain the [`ratpeg::RuleId`](../ratpeg/rule/type.RuleId.html)
/// for one sub-position. `Ref` resolves by name at the emitted
/// program's runtime (via `GrammarBuilder::rule_id`), which covers
/// both this program's own entries and ratpeg's built-in rules
/// uniformly, since both live in the same name table.
#[derive(Debug, Clone)]
pub enum RuleExpr {
    Ref(String),
    Literal(String),
    Regex(String),
    Commit,
    Empty,
    Here,
    Optional(Box<RuleExpr>),
    Lookahead { positive: bool, inner: Box<RuleExpr> },
    Repeat {
        item: Box<RuleExpr>,
        min: usize,
        separator: Option<Box<RuleExpr>>,
    },
}

/// The explicit replacement for `gram_to_py.py`'s module-level
/// `rule_classes` dict.
#[derive(Default)]
pub struct NameTable {
    declared: FxHashSet<String>,
    anon_counter: usize,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn reserve(&mut self, name: &str) -> Result<(), LowerError> {
        if !self.declared.insert(name.to_string()) {
            return Err(LowerError::DuplicateRule(name.to_string()));
        }
        Ok(())
    }

    fn fresh(&mut self, base: &str) -> String {
        loop {
            self.anon_counter += 1;
            let candidate = format!("{base}_{}", self.anon_counter);
            if self.declared.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

const KNOWN_BUILTINS: &[&str] = &[
    "SPACE",
    "NO_LF_SPACE",
    "NEWLINE",
    "NO_SPACE",
    "ENDMARKER",
    "NAME",
    "STRING",
    "INDENT",
    "DEDENT",
];

pub struct Lowered {
    pub entries: Vec<Entry>,
    pub start: String,
}

pub fn lower(file: &GrammarFile) -> Result<Lowered, LowerError> {
    let mut names = NameTable::new();
    let mut entries = Vec::new();
    let start = file
        .rules
        .first()
        .map(|r| r.name.clone())
        .expect("frontend rejects empty rule lists");
    for rule in &file.rules {
        names.reserve(&rule.name)?;
    }
    for rule in &file.rules {
        process_rule(&rule.name, &rule.alts, &mut names, &mut entries)?;
    }
    Ok(Lowered { entries, start })
}

fn camel(name: &str) -> String {
    let mut out = String::new();
    let mut upper_next = true;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn alt_is_single_plain(alt: &Alt) -> bool {
    alt.items.len() == 1 && matches!(alt.items[0].item, Item::Plain(_))
}

/// Port of `process_rule`: decide whether `alts` collapses to a
/// `Union` of plain items, or needs per-alternative `Sequence`
/// sub-rules.
fn process_rule(
    rule_name: &str,
    alts: &[Alt],
    names: &mut NameTable,
    entries: &mut Vec<Entry>,
) -> Result<(), LowerError> {
    if alts.len() > 1 && alts.iter().all(alt_is_single_plain) {
        let mut options = Vec::with_capacity(alts.len());
        for alt in alts {
            let Item::Plain(plain) = &alt.items[0].item else {
                unreachable!("checked by alt_is_single_plain")
            };
            options.push(make_annotation(rule_name, plain, names, entries)?);
        }
        entries.push(Entry {
            name: rule_name.to_string(),
            shape: Shape::Union(options),
        });
        return Ok(());
    }
    if alts.len() > 1 {
        let mut options = Vec::with_capacity(alts.len());
        for (i, alt) in alts.iter().enumerate() {
            let sub_name = format!("{rule_name}_{}", i + 1);
            names.reserve(&sub_name)?;
            process_sequence(&sub_name, alt, names, entries)?;
            options.push(RuleExpr::Ref(sub_name));
        }
        entries.push(Entry {
            name: rule_name.to_string(),
            shape: Shape::Union(options),
        });
        return Ok(());
    }
    process_sequence(rule_name, &alts[0], names, entries)
}

fn process_sequence(
    name: &str,
    alt: &Alt,
    names: &mut NameTable,
    entries: &mut Vec<Entry>,
) -> Result<(), LowerError> {
    let mut fields = Vec::with_capacity(alt.items.len());
    for (i, item) in alt.items.iter().enumerate() {
        fields.push(process_item(name, i + 1, item, names, entries)?);
    }
    entries.push(Entry {
        name: name.to_string(),
        shape: Shape::Sequence(fields),
    });
    Ok(())
}

/// Port of `process_item`: a `Commit`-typed field is never hidden by
/// name, only by what it evaluates to (the evaluator drops it
/// unconditionally); everything else is hidden unless the grammar
/// supplied an explicit `name=`.
fn process_item(
    enclosing: &str,
    index: usize,
    named: &NamedItem,
    names: &mut NameTable,
    entries: &mut Vec<Entry>,
) -> Result<FieldSpec, LowerError> {
    let field_name = named
        .name
        .clone()
        .unwrap_or_else(|| format!("item_{index}"));
    // Anonymous fields are visible by default, same as the generator's
    // raw output; `--postprocess` (see `crate::postprocess`) is the step
    // that privatizes them, as a textual rewrite over the rendered
    // source rather than a decision made here.
    let hidden = false;
    let expr = make_item_annotation(enclosing, &field_name, &named.item, names, entries)?;
    Ok(FieldSpec {
        name: field_name,
        expr,
        hidden,
    })
}

fn make_item_annotation(
    enclosing: &str,
    field_name: &str,
    item: &Item,
    names: &mut NameTable,
    entries: &mut Vec<Entry>,
) -> Result<RuleExpr, LowerError> {
    match item {
        Item::Cut => Ok(RuleExpr::Commit),
        Item::Lookahead { positive, atom } => {
            let inner = make_annotation(&format!("{enclosing}_{field_name}"), atom, names, entries)?;
            Ok(RuleExpr::Lookahead {
                positive: *positive,
                inner: Box::new(inner),
            })
        }
        Item::Bracket(alts) => {
            let sub_name = names.fresh(&camel(enclosing));
            process_rule(&sub_name, alts, names, entries)?;
            Ok(RuleExpr::Optional(Box::new(RuleExpr::Ref(sub_name))))
        }
        Item::Quantified { node, quantifier } => {
            let base = format!("{enclosing}_{field_name}");
            let item_expr = make_annotation(&base, node, names, entries)?;
            Ok(match quantifier {
                Quantifier::Optional => RuleExpr::Optional(Box::new(item_expr)),
                Quantifier::Star => RuleExpr::Repeat {
                    item: Box::new(item_expr),
                    min: 0,
                    separator: None,
                },
                Quantifier::Plus => RuleExpr::Repeat {
                    item: Box::new(item_expr),
                    min: 1,
                    separator: None,
                },
            })
        }
        Item::Separated { node, sep } => {
            let base = format!("{enclosing}_{field_name}");
            let sep_expr = make_annotation(&format!("{base}_sep"), sep, names, entries)?;
            let node_expr = make_annotation(&format!("{base}_node"), node, names, entries)?;
            Ok(RuleExpr::Repeat {
                item: Box::new(node_expr),
                min: 1,
                separator: Some(Box::new(sep_expr)),
            })
        }
        Item::Plain(plain) => make_annotation(&format!("{enclosing}_{field_name}"), plain, names, entries),
    }
}

/// Port of `make_annotation`'s `Plain_*` cases: a parenthesized group
/// either folds into a plain `Union` (when every alternative is a
/// single item) or becomes its own auxiliary top-level rule; a regex
/// or string literal is inlined directly; a bare name resolves to a
/// grammar rule, a built-in token, `NONE` (the `Empty` rule), or
/// `HERE` (the `Here` pseudo-rule).
fn make_annotation(
    synthetic_base: &str,
    plain: &Plain,
    names: &mut NameTable,
    entries: &mut Vec<Entry>,
) -> Result<RuleExpr, LowerError> {
    match plain {
        Plain::Group(alts) => {
            if alts.len() > 1 && alts.iter().all(alt_is_single_plain) {
                let mut options = Vec::with_capacity(alts.len());
                for alt in alts {
                    let Item::Plain(p) = &alt.items[0].item else {
                        unreachable!()
                    };
                    options.push(make_annotation(synthetic_base, p, names, entries)?);
                }
                // A pure union of plains with no sequence shape needs
                // no name of its own; materialize it as an anonymous
                // auxiliary rule so it still has a `RuleId` to refer
                // to from the enclosing field.
                let sub_name = names.fresh(&camel(synthetic_base));
                entries.push(Entry {
                    name: sub_name.clone(),
                    shape: Shape::Union(options),
                });
                return Ok(RuleExpr::Ref(sub_name));
            }
            let sub_name = names.fresh(&camel(synthetic_base));
            process_rule(&sub_name, alts, names, entries)?;
            Ok(RuleExpr::Ref(sub_name))
        }
        Plain::Regex(pattern) => Ok(RuleExpr::Regex(pattern.clone())),
        Plain::Str(s) => Ok(RuleExpr::Literal(s.clone())),
        Plain::Name(name) => {
            if name == "NONE" {
                return Ok(RuleExpr::Empty);
            }
            if name == "HERE" {
                return Ok(RuleExpr::Here);
            }
            if name.chars().all(|c| c.is_ascii_uppercase() || c == '_') {
                if KNOWN_BUILTINS.contains(&name.as_str()) {
                    return Ok(RuleExpr::Ref(name.clone()));
                }
                return Err(LowerError::UnknownBuiltin(name.clone()));
            }
            Ok(RuleExpr::Ref(name.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend;

    fn lower_src(src: &str) -> Lowered {
        let file = frontend::parse(src).unwrap();
        lower(&file).unwrap()
    }

    #[test]
    fn single_plain_alternatives_collapse_to_a_union() {
        let lowered = lower_src("Expr: Num | Str\n");
        assert_eq!(lowered.entries.len(), 1);
        match &lowered.entries[0].shape {
            Shape::Union(opts) => assert_eq!(opts.len(), 2),
            other => panic!("expected Union, got {other:?}"),
        }
    }

    #[test]
    fn multi_item_alternatives_become_numbered_sequences() {
        let lowered = lower_src("Expr: left=Expr '+' right=Num\n     | Num\n");
        let names: Vec<_> = lowered.entries.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"Expr_1"));
        assert!(names.contains(&"Expr"));
        let top = lowered.entries.iter().find(|e| e.name == "Expr").unwrap();
        match &top.shape {
            Shape::Union(opts) => assert_eq!(opts.len(), 2),
            other => panic!("expected Union, got {other:?}"),
        }
    }

    #[test]
    fn single_multi_item_alternative_collapses_to_one_sequence() {
        let lowered = lower_src("Pair: a=NAME b=NAME\n");
        assert_eq!(lowered.entries.len(), 1);
        match &lowered.entries[0].shape {
            Shape::Sequence(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].name, "a");
                assert!(!fields[0].hidden);
            }
            other => panic!("expected Sequence, got {other:?}"),
        }
    }

    #[test]
    fn commit_lowers_to_a_commit_expr() {
        let lowered = lower_src("Paren: '(' ~ NAME ')'\n");
        let top = &lowered.entries[0];
        match &top.shape {
            Shape::Sequence(fields) => {
                assert!(matches!(fields[1].expr, RuleExpr::Commit));
            }
            other => panic!("expected Sequence, got {other:?}"),
        }
    }

    #[test]
    fn unknown_uppercase_name_is_rejected() {
        let file = frontend::parse("Foo: NOT_A_BUILTIN\n").unwrap();
        assert!(matches!(lower(&file), Err(LowerError::UnknownBuiltin(_))));
    }

    #[test]
    fn duplicate_rule_name_is_rejected() {
        let file = frontend::parse("Foo: NAME\nFoo: STRING\n").unwrap();
        assert!(matches!(lower(&file), Err(LowerError::DuplicateRule(_))));
    }

    #[test]
    fn none_and_here_lower_to_their_pseudo_rules() {
        let lowered = lower_src("Foo: a=NONE b=HERE\n");
        match &lowered.entries[0].shape {
            Shape::Sequence(fields) => {
                assert!(matches!(fields[0].expr, RuleExpr::Empty));
                assert!(matches!(fields[1].expr, RuleExpr::Here));
            }
            other => panic!("expected Sequence, got {other:?}"),
        }
    }
}
