//! Diagnostic extraction from API Blueprint parse results.
//!
//! Every `annotation` element the parser emits becomes one diagnostic. A
//! parser failure becomes exactly one diagnostic describing the failure, so
//! a broken document never yields silence.

use crate::elements::{Annotation, ParseResult};
use crate::parser::{BlueprintParser, ParseError, ParseOptions};
use crate::position::{DocumentLines, resolve_or_start};
use crate::types::{Diagnostic, DiagnosticSeverity, Range};

/// Get diagnostics for a document.
///
/// Runs the parser and converts its annotations, or its failure, into
/// diagnostics.
///
/// # Example
///
/// ```rust,ignore
/// use blueprint_lsp_core::{CommandParser, ParseOptions, get_diagnostics};
///
/// let parser = CommandParser::new("drafter");
/// for diag in get_diagnostics("# My API\n", &ParseOptions::default(), &parser) {
///     println!("{}: {}", diag.severity, diag.message);
/// }
/// ```
pub fn get_diagnostics(
    text: &str,
    options: &ParseOptions,
    parser: &dyn BlueprintParser,
) -> Vec<Diagnostic> {
    let lines = DocumentLines::new(text);
    parse_with_diagnostics(text, &lines, options, parser).0
}

/// Parse `text` once, returning its diagnostics and, on success, the tree.
///
/// A failed parse yields the single failure diagnostic and no tree.
pub(crate) fn parse_with_diagnostics(
    text: &str,
    lines: &DocumentLines,
    options: &ParseOptions,
    parser: &dyn BlueprintParser,
) -> (Vec<Diagnostic>, Option<ParseResult>) {
    match parser.parse(text, options) {
        Ok(tree) => (extract_diagnostics(&tree, lines), Some(tree)),
        Err(err) => (vec![parse_failure_diagnostic(&err)], None),
    }
}

/// Convert every annotation in the tree, in document order.
pub fn extract_diagnostics(result: &ParseResult, lines: &DocumentLines) -> Vec<Diagnostic> {
    let diagnostics: Vec<Diagnostic> = result
        .annotations()
        .into_iter()
        .map(|annotation| annotation_to_diagnostic(annotation, lines))
        .collect();
    tracing::debug!(count = diagnostics.len(), "Extracted diagnostics");
    diagnostics
}

/// The single diagnostic reported when the parser itself fails.
pub fn parse_failure_diagnostic(err: &ParseError) -> Diagnostic {
    tracing::warn!(error = %err, "Parser failed");
    Diagnostic::new(Range::default(), DiagnosticSeverity::Error, err.to_string())
}

fn annotation_to_diagnostic(annotation: &Annotation, lines: &DocumentLines) -> Diagnostic {
    let range = resolve_or_start(annotation.source_map.as_ref(), lines).to_range();
    let diagnostic = Diagnostic::new(
        range,
        DiagnosticSeverity::from_classes(&annotation.classes),
        annotation.message.clone(),
    );

    match &annotation.code {
        Some(code) => diagnostic.with_code(code.clone()),
        None => diagnostic,
    }
}
