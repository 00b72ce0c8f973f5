//! Check command implementation.
//!
//! Runs one validation pass over a file, the same pass the language server
//! runs on every edit, and prints the result.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use blueprint_lsp_core::{
    CommandParser, Diagnostic, DiagnosticSeverity, DocumentAnalysis, Settings, Symbol, analyze,
};

pub struct CheckArgs {
    pub file: PathBuf,
    pub parser: Option<String>,
    pub json: bool,
    pub outline: bool,
}

pub fn execute(args: CheckArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let mut settings = Settings::default();
    if let Some(command) = args.parser {
        settings.parser.command = command;
    }
    let parser = CommandParser::from_settings(&settings.parser);

    let analysis = analyze(&text, &settings, &parser);
    let file = args.file.display().to_string();

    if args.json {
        let report = json_report(&file, &analysis, args.outline);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for diagnostic in &analysis.diagnostics {
            println!("{}", format_diagnostic(&file, diagnostic));
        }
        if args.outline {
            for symbol in analysis.symbols() {
                println!("{}", format_symbol(&symbol));
            }
        }
    }

    let errors = error_count(&analysis.diagnostics);
    if errors > 0 {
        bail!("{} error(s) in {}", errors, file);
    }
    Ok(())
}

/// `file:line:col: severity[code]: message`, with 1-based line and column.
fn format_diagnostic(file: &str, diagnostic: &Diagnostic) -> String {
    let start = diagnostic.range.start;
    let code = diagnostic
        .code
        .as_ref()
        .map(|code| format!("[{}]", code))
        .unwrap_or_default();
    format!(
        "{}:{}:{}: {}{}: {}",
        file,
        start.line + 1,
        start.character + 1,
        diagnostic.severity,
        code,
        diagnostic.message
    )
}

fn format_symbol(symbol: &Symbol) -> String {
    let indent = if symbol.container_name.is_some() { "  " } else { "" };
    format!(
        "{}{} ({}:{})",
        indent,
        symbol.name,
        symbol.range.start.line + 1,
        symbol.range.start.character + 1
    )
}

fn json_report(file: &str, analysis: &DocumentAnalysis, outline: bool) -> serde_json::Value {
    let mut report = serde_json::json!({
        "file": file,
        "diagnostics": analysis.diagnostics,
    });
    if outline {
        report["symbols"] = serde_json::json!(analysis.symbols());
    }
    report
}

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Error)
        .count()
}
