//! Conversion between blueprint-lsp-core types and tower_lsp::lsp_types.

use tower_lsp::lsp_types::{
    Diagnostic as LspDiagnostic, DiagnosticSeverity as LspSeverity, Location, NumberOrString,
    Position as LspPosition, Range as LspRange, SymbolInformation, SymbolKind as LspSymbolKind,
    Url,
};

use blueprint_lsp_core::types::{
    Diagnostic, DiagnosticCode, DiagnosticSeverity, Position, Range, Symbol, SymbolKind,
};

/// Convert a blueprint-lsp-core Position to an lsp-types Position.
pub fn position_to_lsp(pos: &Position) -> LspPosition {
    LspPosition {
        line: pos.line,
        character: pos.character,
    }
}

/// Convert a blueprint-lsp-core Range to an lsp-types Range.
pub fn range_to_lsp(range: &Range) -> LspRange {
    LspRange {
        start: position_to_lsp(&range.start),
        end: position_to_lsp(&range.end),
    }
}

pub fn severity_to_lsp(severity: &DiagnosticSeverity) -> LspSeverity {
    match severity {
        DiagnosticSeverity::Error => LspSeverity::ERROR,
        DiagnosticSeverity::Warning => LspSeverity::WARNING,
    }
}

/// Numeric codes that fit the protocol's integer stay numeric.
pub fn code_to_lsp(code: &DiagnosticCode) -> NumberOrString {
    match code {
        DiagnosticCode::Number(n) => match i32::try_from(*n) {
            Ok(n) => NumberOrString::Number(n),
            Err(_) => NumberOrString::String(n.to_string()),
        },
        DiagnosticCode::String(s) => NumberOrString::String(s.clone()),
    }
}

/// Convert a blueprint-lsp-core Diagnostic to an lsp-types Diagnostic.
pub fn diagnostic_to_lsp(diag: &Diagnostic) -> LspDiagnostic {
    LspDiagnostic {
        range: range_to_lsp(&diag.range),
        severity: Some(severity_to_lsp(&diag.severity)),
        code: diag.code.as_ref().map(code_to_lsp),
        code_description: None,
        source: diag.source.clone(),
        message: diag.message.clone(),
        related_information: None,
        tags: None,
        data: None,
    }
}

pub fn symbol_kind_to_lsp(kind: &SymbolKind) -> LspSymbolKind {
    match kind {
        SymbolKind::Package => LspSymbolKind::PACKAGE,
        SymbolKind::Property => LspSymbolKind::PROPERTY,
    }
}

/// Convert a blueprint-lsp-core Symbol to a flat lsp-types SymbolInformation.
pub fn symbol_to_lsp(symbol: &Symbol, uri: &Url) -> SymbolInformation {
    #[allow(deprecated)]
    SymbolInformation {
        name: symbol.name.clone(),
        kind: symbol_kind_to_lsp(&symbol.kind),
        tags: None,
        deprecated: None,
        location: Location {
            uri: uri.clone(),
            range: range_to_lsp(&symbol.range),
        },
        container_name: symbol.container_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_conversion() {
        let core_range = Range::new(Position::new(0, 0), Position::new(0, 10));
        let lsp_range = range_to_lsp(&core_range);
        assert_eq!(lsp_range.start.line, 0);
        assert_eq!(lsp_range.start.character, 0);
        assert_eq!(lsp_range.end.line, 0);
        assert_eq!(lsp_range.end.character, 10);
    }

    #[test]
    fn test_severity_conversion() {
        assert_eq!(
            severity_to_lsp(&DiagnosticSeverity::Error),
            LspSeverity::ERROR
        );
        assert_eq!(
            severity_to_lsp(&DiagnosticSeverity::Warning),
            LspSeverity::WARNING
        );
    }

    #[test]
    fn test_code_conversion() {
        assert_eq!(
            code_to_lsp(&DiagnosticCode::Number(6)),
            NumberOrString::Number(6)
        );
        assert_eq!(
            code_to_lsp(&DiagnosticCode::Number(i64::MAX)),
            NumberOrString::String(i64::MAX.to_string())
        );
        assert_eq!(
            code_to_lsp(&DiagnosticCode::String("E1".to_string())),
            NumberOrString::String("E1".to_string())
        );
    }

    #[test]
    fn test_diagnostic_conversion() {
        let core_diag = Diagnostic::new(
            Range::new(Position::new(2, 4), Position::new(2, 9)),
            DiagnosticSeverity::Warning,
            "empty resource group",
        )
        .with_code(DiagnosticCode::Number(6));

        let lsp_diag = diagnostic_to_lsp(&core_diag);
        assert_eq!(lsp_diag.message, "empty resource group");
        assert_eq!(lsp_diag.severity, Some(LspSeverity::WARNING));
        assert_eq!(lsp_diag.code, Some(NumberOrString::Number(6)));
        assert_eq!(lsp_diag.source.as_deref(), Some("drafter"));
        assert_eq!(lsp_diag.range.start.line, 2);
    }

    #[test]
    fn test_symbol_conversion() {
        let uri = Url::parse("file:///api.apib").unwrap();
        let symbol = Symbol::new(
            "Widget",
            SymbolKind::Property,
            Range::new(Position::new(4, 4), Position::new(4, 10)),
        )
        .with_container("Widget API");

        let info = symbol_to_lsp(&symbol, &uri);
        assert_eq!(info.name, "Widget");
        assert_eq!(info.kind, LspSymbolKind::PROPERTY);
        assert_eq!(info.location.uri, uri);
        assert_eq!(info.location.range.end.character, 10);
        assert_eq!(info.container_name.as_deref(), Some("Widget API"));
    }
}
