//! `csharp/metadata`, the one non-standard JSON-RPC method (§4.G, §6),
//! registered via `tower_lsp::LspService::build(..).custom_method(..)`
//! exactly as `posit-dev-ark`'s `help_topic.rs` registers its own custom
//! request.

use serde::{Deserialize, Serialize};
use tower_lsp::jsonrpc;
use tower_lsp::lsp_types::{TextDocumentIdentifier, Url};

use crate::backend::conversions::parse_metadata_uri;
use crate::backend::CSharpBackend;
use crate::scope::ReadScope;

pub const METADATA_REQUEST: &str = "csharp/metadata";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataParams {
    pub text_document: TextDocumentIdentifier,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse {
    pub project_name: String,
    pub assembly_name: String,
    pub symbol_name: String,
    pub source: String,
}

impl CSharpBackend {
    pub async fn metadata(&self, params: MetadataParams) -> jsonrpc::Result<Option<MetadataResponse>> {
        let _scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let uri: Url = params.text_document.uri;

        let Some((project_name, assembly_name, symbol_name)) = parse_metadata_uri(&uri) else {
            return Ok(None);
        };

        let Some(source) = self.compiler.text(&uri).await else {
            return Ok(None);
        };

        Ok(Some(MetadataResponse {
            project_name,
            assembly_name,
            symbol_name,
            source,
        }))
    }
}
