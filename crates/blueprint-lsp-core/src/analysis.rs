//! One validation pass over a document.
//!
//! `analyze()` parses once and keeps everything later requests need: the
//! diagnostics to publish, the parse tree for the outline, the lines of the
//! exact text that was parsed and the settings it was parsed with.

use crate::diagnostics::parse_with_diagnostics;
use crate::elements::ParseResult;
use crate::parser::{BlueprintParser, ParseOptions};
use crate::position::DocumentLines;
use crate::settings::Settings;
use crate::symbols::extract_symbols;
use crate::types::{Diagnostic, Symbol};

/// The result of validating one version of a document.
#[derive(Debug, Clone)]
pub struct DocumentAnalysis {
    /// Diagnostics to publish for this version.
    pub diagnostics: Vec<Diagnostic>,
    /// The parse tree, absent when the parser failed.
    pub tree: Option<ParseResult>,
    /// Lines of the text the tree was parsed from.
    pub lines: DocumentLines,
    /// Settings in effect for this pass.
    pub settings: Settings,
}

impl DocumentAnalysis {
    /// The document outline.
    ///
    /// Empty when the parse failed or source maps were not requested, since
    /// there is nothing to navigate to without them.
    pub fn symbols(&self) -> Vec<Symbol> {
        if !self.settings.export_sourcemap {
            return Vec::new();
        }
        match &self.tree {
            Some(tree) => extract_symbols(tree, &self.lines),
            None => Vec::new(),
        }
    }
}

/// Analyze a document, producing diagnostics and the outline source in a single parse.
///
/// # Example
///
/// ```rust,ignore
/// use blueprint_lsp_core::{CommandParser, Settings, analyze};
///
/// let settings = Settings::default();
/// let parser = CommandParser::from_settings(&settings.parser);
/// let analysis = analyze(content, &settings, &parser);
///
/// println!("Found {} diagnostics", analysis.diagnostics.len());
/// println!("Found {} symbols", analysis.symbols().len());
/// ```
pub fn analyze(text: &str, settings: &Settings, parser: &dyn BlueprintParser) -> DocumentAnalysis {
    let lines = DocumentLines::new(text);
    let options = ParseOptions::from(settings);

    let (diagnostics, tree) = parse_with_diagnostics(text, &lines, &options, parser);

    DocumentAnalysis {
        diagnostics,
        tree,
        lines,
        settings: settings.clone(),
    }
}
