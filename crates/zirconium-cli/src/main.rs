// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Zirconium command-line interface.
//!
//! This is the main entry point for the `zr` command.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use zirconium_core::prelude::{ParseResult, parse, pretty_print, render};
use zirconium_core::source_analysis::{LexerOptions, Lexer};

mod diagnostic;

use diagnostic::ParseDiagnostic;

/// Zirconium: a shell-inspired embedded scripting language
#[derive(Debug, Parser)]
#[command(name = "zr")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a source file and report diagnostics
    Check {
        /// Source file to check
        path: Utf8PathBuf,
    },

    /// Dump the token stream of a source file
    Tokens {
        /// Source file to tokenize
        path: Utf8PathBuf,

        /// Include whitespace and comment tokens
        #[arg(long)]
        trivia: bool,
    },

    /// Pretty-print the syntax tree of a source file
    Ast {
        /// Source file to parse
        path: Utf8PathBuf,
    },

    /// Re-emit a source file from its parsed tree
    Render {
        /// Source file to render
        path: Utf8PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize tracing only when RUST_LOG is explicitly set, so normal
    // runs keep stderr clean for diagnostics.
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { path } => check(&path),
        Command::Tokens { path, trivia } => tokens(&path, trivia),
        Command::Ast { path } => ast(&path),
        Command::Render { path } => render_file(&path),
    }
}

fn read_source(path: &Utf8PathBuf) -> Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {path}"))
}

/// Parses and reports diagnostics; exits non-zero when any are found.
fn check(path: &Utf8PathBuf) -> Result<()> {
    let source = read_source(path)?;
    let result = parse(&source);

    if result.is_clean() {
        tracing::debug!("parsed {path} cleanly");
        println!("{path}: ok");
        return Ok(());
    }

    report_errors(&result, path.as_str(), &source);
    std::process::exit(1);
}

fn report_errors(result: &ParseResult, path: &str, source: &str) {
    for error in &result.errors {
        let diag = ParseDiagnostic::from_node_error(error, &result.tree, path, source);
        eprintln!("{:?}", miette::Report::new(diag));
    }
    eprintln!(
        "{path}: {} error{}",
        result.errors.len(),
        if result.errors.len() == 1 { "" } else { "s" }
    );
}

/// Prints one token per line with its span and flags.
fn tokens(path: &Utf8PathBuf, trivia: bool) -> Result<()> {
    let source = read_source(path)?;
    let options = LexerOptions {
        parse_comments_as_tokens: trivia,
        parse_whitespace_as_tokens: trivia,
        ..LexerOptions::default()
    };
    for token in Lexer::with_options(&source, options) {
        let span = token.span();
        let flags = token.flags();
        if flags.is_empty() {
            println!("{:>4}..{:<4} {}", span.start(), span.end(), token.kind());
        } else {
            println!(
                "{:>4}..{:<4} {} {flags:?}",
                span.start(),
                span.end(),
                token.kind()
            );
        }
    }
    Ok(())
}

/// Pretty-prints the tree; diagnostics go to stderr but do not fail the
/// command, since the tree is most useful exactly when the parse broke.
fn ast(path: &Utf8PathBuf) -> Result<()> {
    let source = read_source(path)?;
    let result = parse(&source);
    print!("{}", pretty_print(&result.tree, &[result.root], ""));
    if !result.is_clean() {
        report_errors(&result, path.as_str(), &source);
    }
    Ok(())
}

/// Renders the parsed tree back to source text.
fn render_file(path: &Utf8PathBuf) -> Result<()> {
    let source = read_source(path)?;
    let result = parse(&source);
    if !result.is_clean() {
        report_errors(&result, path.as_str(), &source);
        std::process::exit(1);
    }
    println!("{}", render(&result.tree, result.root));
    Ok(())
}
