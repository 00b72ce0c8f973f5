//! Document symbol extraction for outline/navigation.
//!
//! The outline is flat: the API title first, then every resource of every
//! resource group, in document order.

use crate::elements::{Located, ParseResult};
use crate::position::{DocumentLines, resolve_or_start};
use crate::types::{Symbol, SymbolKind};

/// Extract the outline from a parse result.
///
/// Positions are resolved against `lines`, which must be the text the parse
/// result was produced from.
pub fn extract_symbols(result: &ParseResult, lines: &DocumentLines) -> Vec<Symbol> {
    let Some(api) = result.api() else {
        return Vec::new();
    };

    let mut symbols = Vec::new();
    let api_name = api.title.as_ref().map(|title| title.content.as_str());

    if let Some(title) = &api.title {
        symbols.push(located_symbol(title, SymbolKind::Package, lines));
    }

    for group in api.groups() {
        for resource in group.resources() {
            // An outline entry needs a name to show.
            let Some(title) = &resource.title else {
                continue;
            };
            let symbol = located_symbol(title, SymbolKind::Property, lines);
            symbols.push(match api_name {
                Some(name) => symbol.with_container(name),
                None => symbol,
            });
        }
    }

    tracing::debug!(count = symbols.len(), "Extracted symbols");
    symbols
}

fn located_symbol(title: &Located, kind: SymbolKind, lines: &DocumentLines) -> Symbol {
    let range = resolve_or_start(title.source_map.as_ref(), lines).to_range();
    Symbol::new(title.content.clone(), kind, range)
}
