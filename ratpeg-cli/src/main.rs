//! `ratpeg-cli`: reads a grammar file in the dialect from spec.md §4.5
//! and emits Rust source that builds a `ratpeg::Grammar` from it
//! (spec.md §6 "CLI (adapter)").

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Compile a ratpeg grammar file into Rust source.
#[derive(Debug, Parser)]
#[command(name = "ratpeg-cli", version, about)]
struct Args {
    /// Privatize anonymous `item_N` fields (drop their value from the
    /// returned node).
    #[arg(long)]
    postprocess: bool,

    /// Record a custom indentation-rule expression in the generated
    /// module (documentary only; this engine has no indentation
    /// machinery).
    #[arg(long, value_name = "EXPR")]
    indent: Option<String>,

    /// Grammar source file, or `-` for stdin.
    infile: PathBuf,

    /// Rust source destination, or `-` for stdout.
    outfile: PathBuf,
}

fn read_input(path: &std::path::Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading grammar source from stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn write_output(path: &std::path::Path, contents: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        io::stdout()
            .write_all(contents.as_bytes())
            .context("writing generated source to stdout")
    } else {
        fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
    }
}

fn run(args: &Args) -> Result<()> {
    let source = read_input(&args.infile)?;

    let options = ratpeg_codegen::CompileOptions {
        postprocess: args.postprocess,
        indent_expr: args.indent.clone(),
    };
    let rendered = ratpeg_codegen::compile(&source, &options)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("compiling {}", args.infile.display()))?;

    write_output(&args.outfile, &rendered)?;
    tracing::debug!(infile = %args.infile.display(), outfile = %args.outfile.display(), "grammar compiled");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        tracing::error!(error = %err, "grammar compilation failed");
        return Err(err);
    }
    Ok(())
}
