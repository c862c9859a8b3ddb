//! Domain types shared by the `CompilerBackend` contract (§4.H).

use rustc_hash::FxHashMap;
use tower_lsp::lsp_types::{TextEdit, Url};

pub type ProjectId = String;

/// A half-open byte-offset span within a document's text, as produced by
/// tree-sitter. Converted to/from LSP `Range`s at the handler boundary
/// (`document::byte_span_to_range`, `TextDocument::position_to_byte`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Identifies a symbol well enough to re-find it across solution snapshots:
/// by the project that declares it and its fully-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolId {
    pub project: ProjectId,
    pub qualified_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Namespace,
    Class,
    Struct,
    Interface,
    Enum,
    EnumMember,
    Method,
    Constructor,
    Property,
    Field,
}

/// Where a symbol's declaration lives: in a tracked source document, or in a
/// compiled assembly with no source on disk (§4.E, GLOSSARY "Metadata
/// location").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolLocation {
    Source { uri: Url, span: TextSpan },
    Metadata { assembly: String, full_name: String },
}

#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub id: SymbolId,
    pub name: String,
    /// Enclosing-type-qualified display name (e.g. `Class.M()` for a method),
    /// distinct from `id.qualified_name`'s namespace-qualified identity.
    /// This is what hover shows (§4.G `hover`).
    pub display_name: String,
    pub kind: SymbolKind,
    /// Assembly name, when the symbol's home project differs from the
    /// project doing the lookup (hover's "from assembly {A}" annotation).
    pub assembly: Option<String>,
    pub location: SymbolLocation,
    /// Byte span of just the name identifier, for occurrence-range results
    /// (`references`, `documentHighlight`) as opposed to `location`'s span,
    /// which covers the whole declaration.
    pub name_span: TextSpan,
    pub doc_comment: Option<String>,
}

/// The relation an `implementation`/code-navigation query asks for. The
/// contract in §4.H names these as distinct operations ("find
/// references/implementations/derived classes/interfaces/callers"); they
/// collapse to one parameterized lookup here because, without a real binder,
/// all of them reduce to the same name-indexed search over the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Implementations,
    DerivedClasses,
    Interfaces,
    Callers,
}

#[derive(Debug, Clone)]
pub struct CodeFix {
    pub title: String,
    pub preferred: bool,
    pub edits: FxHashMap<Url, Vec<TextEdit>>,
}

/// Result of decompiling a type into pseudo-source (§4.E).
#[derive(Debug, Clone)]
pub struct DecompileResult {
    pub source: String,
    /// Byte span of the best-matching declaration, if one was found while
    /// walking the synthesized tree. `None` means the zero-based
    /// `(0,0)-(0,1)` fallback applies (§4.E).
    pub best_match_span: Option<TextSpan>,
}
