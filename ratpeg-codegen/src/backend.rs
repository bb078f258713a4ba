//! Renders a [`crate::middle::Lowered`] emission plan as Rust source
//! text, using `proc_macro2`/`quote`, even though the shape being
//! rendered here (a `ratpeg::GrammarBuilder` call sequence) is
//! entirely different from a combinator-expression tree.
//!
//! There is no `prettyplease`-style re-formatting pass in this
//! corpus's dependency set (spec.md §4.5), so the emitted text is
//! written as-is; running it through `rustfmt` is left to the caller,
//! same as any other generated-code convention in this corpus.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::middle::{Entry, Lowered, RuleExpr, Shape};

struct Counter(usize);

impl Counter {
    fn next(&mut self) -> proc_macro2::Ident {
        self.0 += 1;
        format_ident!("__r{}", self.0)
    }
}

/// Appends the statements needed to construct `expr`'s `RuleId` to
/// `stmts`, and returns the identifier holding it.
fn render_expr(expr: &RuleExpr, counter: &mut Counter, stmts: &mut Vec<TokenStream>) -> proc_macro2::Ident {
    match expr {
        RuleExpr::Ref(name) => {
            let id = counter.next();
            stmts.push(quote! {
                let #id = b.rule_id(#name).expect("referenced rule was declared");
            });
            id
        }
        RuleExpr::Literal(s) => {
            let id = counter.next();
            stmts.push(quote! {
                let #id = b.push(::ratpeg::RuleNode::Literal(vec![#s.to_string()]));
            });
            id
        }
        RuleExpr::Regex(pattern) => {
            let id = counter.next();
            stmts.push(quote! {
                let #id = b.push(::ratpeg::RuleNode::Regex {
                    pattern: ::regex::Regex::new(#pattern).expect("codegen-emitted pattern is valid"),
                    converter: ::std::rc::Rc::new(|s: &str| ::ratpeg::Node::Str(::std::rc::Rc::from(s))),
                    raw: false,
                });
            });
            id
        }
        RuleExpr::Commit => {
            let id = counter.next();
            stmts.push(quote! { let #id = b.push(::ratpeg::RuleNode::Commit); });
            id
        }
        RuleExpr::Empty => {
            let id = counter.next();
            stmts.push(quote! { let #id = b.push(::ratpeg::RuleNode::Empty); });
            id
        }
        RuleExpr::Here => {
            let id = counter.next();
            stmts.push(quote! { let #id = b.push(::ratpeg::RuleNode::Here); });
            id
        }
        RuleExpr::Optional(inner) => {
            let inner_id = render_expr(inner, counter, stmts);
            let id = counter.next();
            stmts.push(quote! { let #id = b.push(::ratpeg::RuleNode::Optional(#inner_id)); });
            id
        }
        RuleExpr::Lookahead { positive, inner } => {
            let inner_id = render_expr(inner, counter, stmts);
            let id = counter.next();
            let variant = if *positive {
                quote! { Lookahead }
            } else {
                quote! { Not }
            };
            stmts.push(quote! { let #id = b.push(::ratpeg::RuleNode::#variant(#inner_id)); });
            id
        }
        RuleExpr::Repeat { item, min, separator } => {
            let item_id = render_expr(item, counter, stmts);
            let sep_tok = match separator {
                Some(sep) => {
                    let sep_id = render_expr(sep, counter, stmts);
                    quote! { Some(#sep_id) }
                }
                None => quote! { None },
            };
            let id = counter.next();
            stmts.push(quote! {
                let #id = b.push(::ratpeg::RuleNode::Repeat {
                    item: #item_id,
                    min: #min,
                    separator: #sep_tok,
                });
            });
            id
        }
    }
}

fn render_entry(entry: &Entry, counter: &mut Counter) -> TokenStream {
    let mut stmts = Vec::new();
    let name = &entry.name;
    let node_expr = match &entry.shape {
        Shape::Union(options) => {
            let option_ids: Vec<_> = options
                .iter()
                .map(|opt| render_expr(opt, counter, &mut stmts))
                .collect();
            quote! { ::ratpeg::RuleNode::Choice(vec![#(#option_ids),*]) }
        }
        Shape::Sequence(fields) => {
            let field_toks: Vec<_> = fields
                .iter()
                .map(|f| {
                    let field_id = render_expr(&f.expr, counter, &mut stmts);
                    let fname = &f.name;
                    let hidden = f.hidden;
                    quote! { ::ratpeg::Field { name: #fname, rule: #field_id, hidden: #hidden } }
                })
                .collect();
            quote! {
                ::ratpeg::RuleNode::Sequence(::ratpeg::RecordClass {
                    name: #name,
                    fields: vec![#(#field_toks),*],
                })
            }
        }
    };
    quote! {
        {
            #(#stmts)*
            let __id = b.rule_id(#name).expect("declared above");
            b.define(__id, #node_expr);
        }
    }
}

/// Renders the full emission plan as a standalone Rust module: a
/// `build()` function returning a `Result<ratpeg::Grammar, ratpeg::Error>`,
/// plus a `START` constant naming the entry rule.
pub fn render(lowered: &Lowered) -> String {
    let mut counter = Counter(0);
    let declares: Vec<_> = lowered
        .entries
        .iter()
        .map(|e| {
            let name = &e.name;
            quote! { b.declare(#name); }
        })
        .collect();
    let defines: Vec<_> = lowered
        .entries
        .iter()
        .map(|e| render_entry(e, &mut counter))
        .collect();
    let start = &lowered.start;
    let module = quote! {
        pub fn build() -> ::std::result::Result<::ratpeg::Grammar, ::ratpeg::Error> {
            let mut b = ::ratpeg::GrammarBuilder::new();
            #(#declares)*
            #(#defines)*
            b.build()
        }

        pub const START: &str = #start;
    };
    module.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frontend, middle};

    fn render_src(src: &str) -> String {
        let file = frontend::parse(src).unwrap();
        let lowered = middle::lower(&file).unwrap();
        render(&lowered)
    }

    #[test]
    fn renders_a_build_function_and_start_const() {
        let out = render_src("Num: r\"[0-9]+\"\n");
        assert!(out.contains("pub fn build"));
        assert!(out.contains("GrammarBuilder :: new"));
        assert!(out.contains("pub const START : & str = \"Num\""));
    }

    #[test]
    fn every_entry_is_declared_before_any_definition() {
        let out = render_src("Expr: left=Expr '+' right=Num\n     | Num\nNum: r\"[0-9]+\"\n");
        let last_declare = out.rfind("b . declare").unwrap();
        let first_define = out.find("b . define").unwrap();
        assert!(last_declare < first_define, "all declares must precede all defines");
    }

    #[test]
    fn sub_expressions_are_always_hoisted_to_their_own_let() {
        // A Repeat's item must be a previously-bound identifier, never
        // a nested `b.push(...)` call inline in its field initializer
        // -- that pattern would double-borrow `b` in the generated code.
        let out = render_src("Foo: (NAME ',')*\n");
        assert!(out.contains("RuleNode :: Repeat"));
        assert!(!out.contains("RuleNode :: Repeat { item : b . push"));
    }
}
