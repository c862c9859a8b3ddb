//! JSON-to-domain conversions at the LSP boundary (§2 AMBIENT "peripheral
//! collaborators" — generalized from the teacher's LSP/domain model mapping
//! helpers in `lsp::models`).

use tower_lsp::lsp_types::{
    self, Location, Range, SymbolInformation, SymbolKind as LspSymbolKind, Url,
};

use crate::compiler::{SymbolInfo, SymbolKind, SymbolLocation};
use crate::document::byte_span_to_range;

pub fn domain_symbol_kind_to_lsp(kind: SymbolKind) -> LspSymbolKind {
    match kind {
        SymbolKind::Namespace => LspSymbolKind::NAMESPACE,
        SymbolKind::Class => LspSymbolKind::CLASS,
        SymbolKind::Struct => LspSymbolKind::STRUCT,
        SymbolKind::Interface => LspSymbolKind::INTERFACE,
        SymbolKind::Enum => LspSymbolKind::ENUM,
        SymbolKind::EnumMember => LspSymbolKind::ENUM_MEMBER,
        SymbolKind::Method => LspSymbolKind::METHOD,
        SymbolKind::Constructor => LspSymbolKind::CONSTRUCTOR,
        SymbolKind::Property => LspSymbolKind::PROPERTY,
        SymbolKind::Field => LspSymbolKind::FIELD,
    }
}

/// Converts a source-located symbol to an LSP `Location`. Returns `None` for
/// symbols whose location is in metadata — those are resolved through
/// `metadata::resolve_metadata` instead, which needs the backend call this
/// function deliberately does not make.
pub fn location_of_source(location: &SymbolLocation, text: &str) -> Option<Location> {
    match location {
        SymbolLocation::Source { uri, span } => {
            Some(Location::new(uri.clone(), byte_span_to_range(text, span.start, span.end)))
        }
        SymbolLocation::Metadata { .. } => None,
    }
}

#[allow(deprecated)]
pub fn symbol_information(info: &SymbolInfo, range: Range, uri: Url) -> SymbolInformation {
    // `deprecated` is on `SymbolInformation` itself (the spec's
    // `workspace/symbol` and `documentSymbol` handlers both ask for it
    // explicitly — §4.G), not a sign this should be replaced.
    SymbolInformation {
        name: info.name.clone(),
        kind: domain_symbol_kind_to_lsp(info.kind),
        tags: None,
        deprecated: None,
        location: Location::new(uri, range),
        container_name: None,
    }
}

pub fn is_metadata_uri(uri: &Url) -> bool {
    uri.scheme() == "csharp"
}

/// Parses `csharp:/metadata/projects/{P}/assemblies/{A}/symbols/{F}.cs` into
/// its components, per §6 URI schemes.
pub fn parse_metadata_uri(uri: &Url) -> Option<(String, String, String)> {
    if !is_metadata_uri(uri) {
        return None;
    }
    let segments: Vec<_> = uri.path_segments()?.collect();
    // ["metadata", "projects", P, "assemblies", A, "symbols", "F.cs"]
    if segments.len() != 7 {
        return None;
    }
    let project = segments[2].to_string();
    let assembly = segments[4].to_string();
    let full_name = segments[6].strip_suffix(".cs")?.to_string();
    Some((project, assembly, full_name))
}

pub fn empty_range() -> Range {
    Range::new(lsp_types::Position::new(0, 0), lsp_types::Position::new(0, 1))
}
