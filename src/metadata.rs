//! Decompiled-metadata virtual documents. Synthesizes the stable
//! `csharp:/metadata/...` URI for a symbol whose definition lives in a
//! compiled assembly, and caches the resolution so a second lookup returns
//! the same document instead of decompiling again.

use tower_lsp::lsp_types::Url;

use crate::compiler::TextSpan;
use crate::scope::ReadScope;
use crate::state::{MetadataEntry, MetadataKey};

pub struct MetadataUri;

impl MetadataUri {
    pub fn synth(project: &str, assembly: &str, full_name: &str) -> Url {
        let path = format!("/metadata/projects/{project}/assemblies/{assembly}/symbols/{full_name}.cs");
        Url::parse(&format!("csharp:{path}")).expect("synthesized metadata path is always a valid URI")
    }
}

/// Resolves `(project, assembly, full_name)` to its metadata URI and best
/// known declaration span, decompiling and caching on first resolution;
/// a second resolution of the same key reuses the cached entry.
pub async fn resolve_metadata(
    scope: &ReadScope,
    project: &str,
    assembly: &str,
    full_name: &str,
) -> (Url, Option<TextSpan>) {
    let key = MetadataKey {
        project: project.to_string(),
        assembly: assembly.to_string(),
        full_name: full_name.to_string(),
    };

    if let Some(entry) = scope.snapshot.decompiled_metadata.get(&key) {
        return (entry.uri.clone(), entry.best_match_span);
    }

    let uri = MetadataUri::synth(project, assembly, full_name);
    let decompiled = scope.backend().decompile(assembly, full_name).await;
    let _ = scope.backend().add_document(&uri, decompiled.source.clone(), 0).await;

    scope.post_metadata_add(
        key,
        MetadataEntry {
            uri: uri.clone(),
            best_match_span: decompiled.best_match_span,
        },
    );

    (uri, decompiled.best_match_span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesizes_stable_metadata_uri() {
        let uri = MetadataUri::synth("MyApp", "System.Private.CoreLib", "System.Console");
        assert_eq!(
            uri.as_str(),
            "csharp:/metadata/projects/MyApp/assemblies/System.Private.CoreLib/symbols/System.Console.cs"
        );
    }
}
