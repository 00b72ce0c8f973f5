//! Transport-agnostic analysis of API Blueprint documents.
//!
//! This crate turns parser output (API Elements trees) into diagnostics and
//! a document outline, without any LSP protocol dependencies. Parsing itself
//! is delegated to an external parser through [`BlueprintParser`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   text   ┌──────────────────┐  ParseResult  ┌───────────────────┐
//! │ Document │ ───────▶ │ BlueprintParser  │ ────────────▶ │ diagnostics.rs    │
//! │  Store   │          │ (drafter, ext.)  │               │ symbols.rs        │
//! └──────────┘          └──────────────────┘               └─────────┬─────────┘
//!                                                                     │ source maps
//!                                                           ┌─────────▼─────────┐
//!                                                           │   position.rs     │
//!                                                           │ offset → line/col │
//!                                                           └───────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use blueprint_lsp_core::{CommandParser, Settings, analyze};
//!
//! let settings = Settings::default();
//! let parser = CommandParser::from_settings(&settings.parser);
//! let analysis = analyze(content, &settings, &parser);
//! println!("Diagnostics: {}", analysis.diagnostics.len());
//! println!("Symbols: {}", analysis.symbols().len());
//! ```

pub mod analysis;
pub mod diagnostics;
pub mod document;
pub mod elements;
pub mod parser;
pub mod position;
pub mod settings;
pub mod symbols;
pub mod types;

// Re-export main types and functions for convenience
pub use analysis::{DocumentAnalysis, analyze};
pub use diagnostics::{extract_diagnostics, get_diagnostics};
pub use document::{Document, DocumentState, DocumentStore};
pub use elements::{Annotation, Category, Element, ParseResult, Resource};
pub use parser::{BlueprintParser, CommandParser, ParseError, ParseOptions};
pub use position::{DocumentLines, LineReference, PositionError, SourceMap, SourceSpan, resolve};
pub use settings::Settings;
pub use symbols::extract_symbols;
pub use types::{
    Diagnostic, DiagnosticCode, DiagnosticSeverity, Position, Range, Symbol, SymbolKind,
};
