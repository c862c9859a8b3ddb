//! The Compiler Backend Adapter contract (§4.H) — an external collaborator.
//!
//! The core (state actor, request scope, metadata cache, diagnostics
//! coalescer) is specified entirely against this trait; `TreeSitterBackend`
//! is one concrete, honestly-scoped implementation (see SPEC_FULL.md §9).

pub mod format;
pub mod model;
pub mod treesitter;

use std::path::Path;

use tower_lsp::lsp_types::{Diagnostic, TextEdit, Url};
use tower_lsp::{async_trait, jsonrpc};

use crate::error::ServerError;
pub use model::{CodeFix, DecompileResult, ProjectId, RelationKind, SymbolId, SymbolInfo, SymbolKind, SymbolLocation, TextSpan};

#[async_trait]
pub trait CompilerBackend: Send + Sync {
    /// Loads a solution from `hint` if given, else scans `cwd` for a solution
    /// file, falling back to loading every project found there (§4.G
    /// `initialize`).
    async fn load_solution(&self, hint: Option<&Path>, cwd: &Path) -> Result<(), ServerError>;

    /// All documents currently tracked, source and decompiled alike.
    async fn documents(&self) -> Vec<Url>;

    async fn project_of(&self, uri: &Url) -> Option<ProjectId>;

    async fn text(&self, uri: &Url) -> Option<String>;

    /// Replaces a document's full text (`didOpen`/`didChange`).
    async fn replace_text(&self, uri: &Url, text: String, version: i32) -> Result<(), ServerError>;

    /// Adds a new document to the best-matching project by file path, or (for
    /// metadata URIs) as a project-attached pseudo-document.
    async fn add_document(&self, uri: &Url, text: String, version: i32) -> Result<(), ServerError>;

    async fn remove_document(&self, uri: &Url);

    async fn symbol_at(&self, uri: &Url, byte_offset: usize) -> Option<SymbolInfo>;

    async fn related(&self, symbol: &SymbolId, relation: RelationKind) -> Vec<SymbolLocation>;

    async fn references(&self, symbol: &SymbolId) -> Vec<SymbolLocation>;

    /// Source declarations matching `query` (substring match against simple
    /// and qualified names), capped at `limit`.
    async fn find_declarations(&self, query: &str, limit: usize) -> Vec<SymbolInfo>;

    async fn document_symbols(&self, uri: &Url) -> Vec<SymbolInfo>;

    async fn code_fixes(&self, uri: &Url, span: TextSpan) -> Vec<CodeFix>;

    /// Applies a code action's edits, returning the post-edit text for every
    /// document it touched (used to diff back into `WorkspaceEdit`s).
    async fn apply_code_action(&self, fix: &CodeFix) -> Result<Vec<(Url, String)>, ServerError>;

    async fn rename(&self, symbol: &SymbolId, new_name: &str) -> Result<Vec<(Url, Vec<TextEdit>)>, ServerError>;

    async fn decompile(&self, assembly: &str, full_name: &str) -> DecompileResult;

    async fn format(&self, uri: &Url) -> Vec<TextEdit>;

    async fn range_format(&self, uri: &Url, span: TextSpan) -> Vec<TextEdit>;

    async fn on_type_format(&self, uri: &Url, byte_offset: usize, ch: char) -> Vec<TextEdit>;

    async fn diagnostics(&self, uri: &Url) -> Vec<Diagnostic>;

    async fn completions(&self, uri: &Url, byte_offset: usize) -> Vec<SymbolInfo>;
}

pub fn internal_error(err: impl std::fmt::Display) -> jsonrpc::Error {
    let mut e = jsonrpc::Error::internal_error();
    e.message = err.to_string().into();
    e
}
