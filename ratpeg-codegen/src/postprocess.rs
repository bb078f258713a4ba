//! Post-processing passes over already-rendered source text, ported
//! from `scripts/grammar_generator/postprocess.py` and
//! `custom_indent.py`. Both operate on the generated text itself
//! rather than the lowering IR, same as the originals.

use regex::Regex;

/// `--postprocess`: anonymous (`item_N`) fields are rendered visible by
/// [`crate::backend::render`] (matching the generator's raw,
/// un-postprocessed output); this rewrites their `hidden: false` to
/// `hidden: true`, dropping their matched value from the returned
/// `Node::Record` the way the original's `InitVar` rewrite did.
///
/// `render`'s output is `proc_macro2::TokenStream::to_string()` text,
/// which spaces every token (`name : "item_1" , rule : __r3 , hidden :
/// false`), not the compact form a hand-written `Field { .. }` literal
/// would use -- the pattern matches that spacing.
pub fn privatize_anonymous_fields(src: &str) -> String {
    let pattern = Regex::new(
        r#"(?P<prefix>name\s*:\s*"item_\d+"\s*,\s*rule\s*:\s*\w+\s*,\s*hidden\s*:\s*)false"#,
    )
    .expect("valid pattern");
    pattern
        .replace_all(src, |caps: &regex::Captures| format!("{}true", &caps["prefix"]))
        .into_owned()
}

/// `--indent EXPR`: the original substitutes a custom indentation-rule
/// expression into the generated preamble, hooking into `parsival`'s
/// `INDENT`/`DEDENT` handling. This engine has no indentation
/// machinery (SPEC_FULL.md §9 Open Question: out of scope), so there
/// is nothing for the expression to hook into -- it is recorded as a
/// doc comment on the generated module for parity with the CLI
/// surface, not wired into parsing.
pub fn annotate_custom_indent(src: &str, expr: &str) -> String {
    format!("// custom indentation rule (not applied; this engine has no indentation machinery): {expr}\n{src}")
}
