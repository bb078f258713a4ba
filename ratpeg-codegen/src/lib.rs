//! Compiles a grammar file in the dialect from spec.md §4.5 into Rust
//! source that builds a `ratpeg::Grammar`. Independent of `ratpeg`'s
//! own runtime (it targets `ratpeg`'s public types in the text it
//! emits, but does not link the engine itself) -- the compiler is an
//! external adapter, not part of the engine (spec.md §4.5).

mod backend;
mod frontend;
mod middle;
mod postprocess;
mod syntax;

pub use crate::frontend::FrontendError;
pub use crate::middle::LowerError;
pub use crate::syntax::GrammarFile;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Frontend(#[from] FrontendError),
    #[error(transparent)]
    Lower(#[from] LowerError),
}

/// Options controlling the post-processing passes (spec.md §6's
/// `grammar-generate [--postprocess] [--indent EXPR]`).
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub postprocess: bool,
    pub indent_expr: Option<String>,
}

/// Compile `source` (grammar-dialect text) into a standalone Rust
/// module source string exposing `build() -> Result<ratpeg::Grammar,
/// ratpeg::Error>` and a `START` rule-name constant.
pub fn compile(source: &str, options: &CompileOptions) -> Result<String, CompileError> {
    let file = frontend::parse(source)?;
    let lowered = middle::lower(&file)?;
    let mut rendered = backend::render(&lowered);
    if options.postprocess {
        rendered = postprocess::privatize_anonymous_fields(&rendered);
    }
    if let Some(expr) = &options.indent_expr {
        rendered = postprocess::annotate_custom_indent(&rendered, expr);
    }
    Ok(rendered)
}

/// Parse only, for callers that want the AST without rendering
/// (mainly tests).
pub fn parse(source: &str) -> Result<GrammarFile, FrontendError> {
    frontend::parse(source)
}
