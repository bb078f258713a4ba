//! End-to-end tests of the public `compile` entry point, including
//! both post-processing passes (spec.md §6).

use ratpeg_codegen::{compile, CompileError, CompileOptions};

const ARITH: &str = "\
Expr: left=Expr '+' right=Num\n     | Num\nNum: r\"[0-9]+\"\n";

#[test]
fn compiles_a_left_recursive_grammar() {
    let out = compile(ARITH, &CompileOptions::default()).unwrap();
    assert!(out.contains("pub fn build"));
    assert!(out.contains("pub const START : & str = \"Expr\""));
    assert!(out.contains("hidden : false"));
}

#[test]
fn postprocess_privatizes_anonymous_fields() {
    let plain = compile(ARITH, &CompileOptions::default()).unwrap();
    assert!(plain.contains(r#"name : "item_2""#), "the '+' field should be anonymous");

    let options = CompileOptions {
        postprocess: true,
        indent_expr: None,
    };
    let out = compile(ARITH, &options).unwrap();
    // The anonymous '+' field (item_2 in Expr_1) must now be hidden;
    // the user-named `left`/`right` fields are untouched.
    assert!(out.contains("hidden : true"));
    assert!(out.contains(r#"name : "left""#));
}

#[test]
fn indent_option_annotates_without_changing_semantics() {
    let plain = compile(ARITH, &CompileOptions::default()).unwrap();
    let options = CompileOptions {
        postprocess: false,
        indent_expr: Some("INDENT_BY_COLUMN".to_string()),
    };
    let annotated = compile(ARITH, &options).unwrap();
    assert!(annotated.starts_with("// custom indentation rule"));
    assert!(annotated.ends_with(&plain[plain.len() - 20..]));
}

#[test]
fn unknown_builtin_reference_is_a_lower_error() {
    let err = compile("Foo: NOT_REAL\n", &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::Lower(_)));
}

#[test]
fn malformed_source_is_a_frontend_error() {
    let err = compile("Foo NAME\n", &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::Frontend(_)));
}

/// A Rust transcription, in the dialect's own `.rpg` syntax, of
/// `examples/original_source/src/parsival/peg_grammar.py` -- the
/// dialect describing itself. `INDENT`/`DEDENT`-delimited continuation
/// blocks are written with the leading-`|` convention instead (see
/// `frontend.rs`'s own doc comment), and literal punctuation that
/// doubles as dialect syntax (`(`, `)`, `[`, `]`, `.`, `+`, `=`, `:`,
/// `&`, `!`, `~`, `@`) is quoted so it is matched as character data
/// rather than parsed as dialect syntax.
const SELF_HOSTING_GRAMMAR: &str = "\
@start Start

RegexLiteral: marker='r' NO_SPACE pattern=STRING
Grouped: '(' ~ alts=Alts ')'
Plain: Grouped
     | RegexLiteral
     | NAME
     | STRING
Item: '[' ~ alts=Alts ']'
    | sep=Plain '.' node=Plain '+'
    | node=Plain quantifier=('?' | '*' | '+')
    | Plain
LookaheadOrCut: kind='&' ~ atom=Plain
     | kind='!' ~ atom=Plain
     | kind='~'
NamedItem: name=NAME '=' ~ item=Item
     | item=Item
     | item=LookaheadOrCut
Alt: items=NamedItem+ ending='$'?
Alts: alts='|'.Alt+
Type: '[' type=NAME pointer='*'? ']'
RuleName: name=NAME type=Type?
MetaTuple: '@' meta_name=NAME meta_value=(NAME | STRING)
Rule: rulename=RuleName ':' alts=Alts
Grammar: metas=MetaTuple* rules=Rule+
Start: grammar=Grammar ENDMARKER
";

#[test]
fn self_hosting_grammar_compiles_and_emits_valid_rust() {
    let plain = compile(SELF_HOSTING_GRAMMAR, &CompileOptions::default())
        .expect("the dialect's own grammar must compile through frontend -> middle -> backend");
    assert!(plain.contains("pub fn build"));
    assert!(plain.contains("pub const START : & str = \"Start\""));
    syn::parse_str::<syn::File>(&plain)
        .expect("generated source must be syntactically valid Rust (syn::parse_str)");

    let postprocessed = compile(
        SELF_HOSTING_GRAMMAR,
        &CompileOptions {
            postprocess: true,
            indent_expr: None,
        },
    )
    .expect("postprocessing the self-hosting grammar must not break compilation");
    syn::parse_str::<syn::File>(&postprocessed)
        .expect("postprocessed source must still be syntactically valid Rust");
}
