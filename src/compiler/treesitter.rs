//! `TreeSitterBackend` — the concrete, honestly-scoped `CompilerBackend`
//! (SPEC_FULL.md §9). Parses with the real `tree-sitter-c-sharp` grammar,
//! builds a name-indexed symbol table, and surfaces tree-sitter ERROR/MISSING
//! nodes as syntax diagnostics. Semantic binding, full decompilation, and
//! analyzer-driven code fixes stay out of scope, same as the delegated
//! contract they stand in for.

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range, TextEdit, Url,
};
use tower_lsp::async_trait;
use tree_sitter::{Node, Parser, Tree};
use walkdir::WalkDir;

use crate::compiler::format::format_source;
use crate::compiler::model::{
    CodeFix, DecompileResult, ProjectId, RelationKind, SymbolId, SymbolInfo, SymbolKind, SymbolLocation, TextSpan,
};
use crate::compiler::CompilerBackend;
use crate::document::byte_span_to_range;
use crate::error::ServerError;

/// One parsed `.cs` document plus the symbols declared in it.
struct ParsedDoc {
    project: ProjectId,
    text: String,
    tree: Tree,
    symbols: Vec<SymbolInfo>,
}

/// A pseudo-project: either a directory containing a `.csproj`, or the
/// implicit fallback project when none is found (§9 "Solution loading").
struct ProjectMeta {
    root: PathBuf,
}

pub struct TreeSitterBackend {
    documents: DashMap<Url, ParsedDoc>,
    projects: DashMap<ProjectId, ProjectMeta>,
    /// `tree_sitter::Parser` is not `Sync`; one shared parser behind a mutex
    /// is simpler than one per call and parsing is never the hot path here.
    parser: Mutex<Parser>,
}

impl TreeSitterBackend {
    pub fn new() -> Self {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .expect("tree-sitter-c-sharp grammar failed to load");
        Self {
            documents: DashMap::new(),
            projects: DashMap::new(),
            parser: Mutex::new(parser),
        }
    }

    fn parse(&self, text: &str) -> Tree {
        let mut parser = self.parser.lock();
        parser.parse(text, None).expect("tree-sitter parse returned no tree")
    }

    fn project_for_path(&self, path: &Path) -> ProjectId {
        for entry in self.projects.iter() {
            if path.starts_with(&entry.value().root) {
                return entry.key().clone();
            }
        }
        "default".to_string()
    }

    fn reparse_and_index(&self, uri: &Url, project: ProjectId, text: String) {
        let tree = self.parse(&text);
        let symbols = extract_symbols(&project, uri, &tree, &text);
        self.documents.insert(
            uri.clone(),
            ParsedDoc {
                project,
                text,
                tree,
                symbols,
            },
        );
    }
}

impl Default for TreeSitterBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompilerBackend for TreeSitterBackend {
    async fn load_solution(&self, hint: Option<&Path>, cwd: &Path) -> Result<(), ServerError> {
        let scan_root = match hint {
            Some(p) if p.is_dir() => p.to_path_buf(),
            Some(p) => p
                .parent()
                .map(|d| d.to_path_buf())
                .unwrap_or_else(|| cwd.to_path_buf()),
            None => cwd.to_path_buf(),
        };

        let mut csproj_dirs = Vec::new();
        find_files(&scan_root, "csproj", &mut csproj_dirs)
            .map_err(|e| ServerError::SolutionLoad(e.to_string()))?;

        if csproj_dirs.is_empty() {
            self.projects.insert(
                "default".to_string(),
                ProjectMeta { root: scan_root.clone() },
            );
        } else {
            for csproj in &csproj_dirs {
                let dir = csproj.parent().unwrap_or(&scan_root).to_path_buf();
                let name = csproj
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("default")
                    .to_string();
                self.projects.insert(name, ProjectMeta { root: dir });
            }
        }

        let mut cs_files = Vec::new();
        find_files(&scan_root, "cs", &mut cs_files).map_err(|e| ServerError::SolutionLoad(e.to_string()))?;

        for path in cs_files {
            let text = std::fs::read_to_string(&path).map_err(|e| ServerError::SolutionLoad(e.to_string()))?;
            let uri = Url::from_file_path(&path)
                .map_err(|_| ServerError::SolutionLoad(format!("not a valid file path: {}", path.display())))?;
            let project = self.project_for_path(&path);
            self.reparse_and_index(&uri, project, text);
        }

        Ok(())
    }

    async fn documents(&self) -> Vec<Url> {
        self.documents.iter().map(|e| e.key().clone()).collect()
    }

    async fn project_of(&self, uri: &Url) -> Option<ProjectId> {
        self.documents.get(uri).map(|d| d.project.clone())
    }

    async fn text(&self, uri: &Url) -> Option<String> {
        self.documents.get(uri).map(|d| d.text.clone())
    }

    async fn replace_text(&self, uri: &Url, text: String, _version: i32) -> Result<(), ServerError> {
        let project = self
            .documents
            .get(uri)
            .map(|d| d.project.clone())
            .unwrap_or_else(|| "default".to_string());
        self.reparse_and_index(uri, project, text);
        Ok(())
    }

    async fn add_document(&self, uri: &Url, text: String, _version: i32) -> Result<(), ServerError> {
        let project = if uri.scheme() == "csharp" {
            metadata_project_from_uri(uri).unwrap_or_else(|| "default".to_string())
        } else {
            uri.to_file_path()
                .map(|p| self.project_for_path(&p))
                .unwrap_or_else(|_| "default".to_string())
        };
        self.reparse_and_index(uri, project, text);
        Ok(())
    }

    async fn remove_document(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    async fn symbol_at(&self, uri: &Url, byte_offset: usize) -> Option<SymbolInfo> {
        let doc = self.documents.get(uri)?;
        doc.symbols
            .iter()
            .filter(|s| match &s.location {
                SymbolLocation::Source { span, .. } => span.start <= byte_offset && byte_offset <= span.end,
                SymbolLocation::Metadata { .. } => false,
            })
            .min_by_key(|s| match &s.location {
                SymbolLocation::Source { span, .. } => span.end - span.start,
                SymbolLocation::Metadata { .. } => usize::MAX,
            })
            .cloned()
    }

    async fn related(&self, symbol: &SymbolId, relation: RelationKind) -> Vec<SymbolLocation> {
        // Without a semantic binder every relation degrades to "other
        // declarations/uses sharing this qualified name" — an honest
        // approximation, not a claim of real type-hierarchy analysis.
        let _ = relation;
        self.name_matches(&symbol.qualified_name, false)
    }

    async fn references(&self, symbol: &SymbolId) -> Vec<SymbolLocation> {
        self.name_matches(&symbol.qualified_name, true)
    }

    async fn find_declarations(&self, query: &str, limit: usize) -> Vec<SymbolInfo> {
        let query = query.to_lowercase();
        let mut out = Vec::new();
        for doc in self.documents.iter() {
            for sym in &doc.symbols {
                if sym.name.to_lowercase().contains(&query) || sym.id.qualified_name.to_lowercase().contains(&query) {
                    out.push(sym.clone());
                    if out.len() >= limit {
                        return out;
                    }
                }
            }
        }
        out
    }

    async fn document_symbols(&self, uri: &Url) -> Vec<SymbolInfo> {
        self.documents.get(uri).map(|d| d.symbols.clone()).unwrap_or_default()
    }

    async fn code_fixes(&self, _uri: &Url, _span: TextSpan) -> Vec<CodeFix> {
        // No analyzer corpus backs this adapter (§9) — empty is the correct,
        // spec-sanctioned degraded result, not an error.
        Vec::new()
    }

    async fn apply_code_action(&self, _fix: &CodeFix) -> Result<Vec<(Url, String)>, ServerError> {
        Ok(Vec::new())
    }

    async fn rename(&self, symbol: &SymbolId, new_name: &str) -> Result<Vec<(Url, Vec<TextEdit>)>, ServerError> {
        let mut by_doc: FxHashMap<Url, Vec<TextEdit>> = FxHashMap::default();
        for loc in self.name_matches(&symbol.qualified_name, true) {
            if let SymbolLocation::Source { uri, span } = loc {
                let text = match self.documents.get(&uri) {
                    Some(d) => d.text.clone(),
                    None => continue,
                };
                let range = byte_span_to_range(&text, span.start, span.end);
                by_doc.entry(uri).or_default().push(TextEdit::new(range, new_name.to_string()));
            }
        }
        Ok(by_doc.into_iter().collect())
    }

    async fn decompile(&self, assembly: &str, full_name: &str) -> DecompileResult {
        stub_decompile(assembly, full_name)
    }

    async fn format(&self, uri: &Url) -> Vec<TextEdit> {
        let Some(doc) = self.documents.get(uri) else {
            return Vec::new();
        };
        let formatted = format_source(&doc.text);
        if formatted == doc.text {
            return Vec::new();
        }
        let end = doc.text.lines().count().max(1) as u32;
        vec![TextEdit::new(
            Range::new(Position::new(0, 0), Position::new(end, 0)),
            formatted,
        )]
    }

    async fn range_format(&self, uri: &Url, span: TextSpan) -> Vec<TextEdit> {
        // Formatting is whole-document-deterministic here (§9); a range
        // request gets the same edit, narrowed isn't meaningfully different
        // without a token-range-aware pretty printer.
        let _ = span;
        self.format(uri).await
    }

    async fn on_type_format(&self, _uri: &Url, _byte_offset: usize, _ch: char) -> Vec<TextEdit> {
        Vec::new()
    }

    async fn diagnostics(&self, uri: &Url) -> Vec<Diagnostic> {
        let Some(doc) = self.documents.get(uri) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        collect_syntax_errors(doc.tree.root_node(), &doc.text, &mut out);
        out
    }

    async fn completions(&self, uri: &Url, byte_offset: usize) -> Vec<SymbolInfo> {
        let _ = byte_offset;
        self.documents.get(uri).map(|d| d.symbols.clone()).unwrap_or_default()
    }
}

impl TreeSitterBackend {
    fn name_matches(&self, qualified_name: &str, include_declaration: bool) -> Vec<SymbolLocation> {
        let mut out = Vec::new();
        for doc in self.documents.iter() {
            for sym in &doc.symbols {
                let is_decl = sym.id.qualified_name == qualified_name;
                if is_decl && !include_declaration {
                    continue;
                }
                // Occurrence-range result: the name identifier, not the
                // whole declaration span `sym.location` covers.
                if is_decl {
                    if let SymbolLocation::Source { uri, .. } = &sym.location {
                        out.push(SymbolLocation::Source {
                            uri: uri.clone(),
                            span: sym.name_span,
                        });
                    }
                }
            }
            if let Some(last_ident) = qualified_name.rsplit('.').next() {
                find_identifier_uses(doc.tree.root_node(), &doc.text, last_ident, doc.key(), &mut out);
            }
        }
        out
    }
}

fn find_identifier_uses(node: Node, text: &str, name: &str, uri: &Url, out: &mut Vec<SymbolLocation>) {
    if node.kind() == "identifier" {
        if let Ok(s) = node.utf8_text(text.as_bytes()) {
            if s == name {
                out.push(SymbolLocation::Source {
                    uri: uri.clone(),
                    span: TextSpan::new(node.start_byte(), node.end_byte()),
                });
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        find_identifier_uses(child, text, name, uri, out);
    }
}

fn extract_symbols(project: &ProjectId, uri: &Url, tree: &Tree, text: &str) -> Vec<SymbolInfo> {
    let mut out = Vec::new();
    let mut namespace_stack: Vec<String> = Vec::new();
    let mut type_stack: Vec<String> = Vec::new();
    walk_declarations(tree.root_node(), text, project, uri, &mut namespace_stack, &mut type_stack, &mut out);
    out
}

fn is_type_declaration(node_kind: &str) -> bool {
    matches!(
        node_kind,
        "class_declaration" | "struct_declaration" | "interface_declaration" | "enum_declaration"
    )
}

fn walk_declarations(
    node: Node,
    text: &str,
    project: &ProjectId,
    uri: &Url,
    namespace_stack: &mut Vec<String>,
    type_stack: &mut Vec<String>,
    out: &mut Vec<SymbolInfo>,
) {
    let kind = node.kind();
    let pushed_namespace = if kind == "namespace_declaration" || kind == "file_scoped_namespace_declaration" {
        if let Some(name_node) = node.child_by_field_name("name") {
            if let Ok(name) = name_node.utf8_text(text.as_bytes()) {
                namespace_stack.push(name.to_string());
                true
            } else {
                false
            }
        } else {
            false
        }
    } else {
        false
    };

    let mut pushed_type = false;

    if let Some(sym_kind) = declaration_kind(kind) {
        if let Some(name_node) = node.child_by_field_name("name") {
            if let Ok(name) = name_node.utf8_text(text.as_bytes()) {
                // Fully-qualified identity: namespace chain + enclosing type
                // chain + name, so `A.Foo` and `B.Foo` never collide (two
                // methods of the same name in different classes).
                let mut qualifier_parts: Vec<&str> = namespace_stack.iter().map(String::as_str).collect();
                qualifier_parts.extend(type_stack.iter().map(String::as_str));
                let qualified_name = if qualifier_parts.is_empty() {
                    name.to_string()
                } else {
                    format!("{}.{}", qualifier_parts.join("."), name)
                };

                // Display name for hover: enclosing type chain only (no
                // namespace), with `()` for methods/constructors (§4.G
                // `hover`, §8 scenario S2: `Class.M()`).
                let mut display_name = if type_stack.is_empty() {
                    name.to_string()
                } else {
                    format!("{}.{}", type_stack.join("."), name)
                };
                if matches!(sym_kind, SymbolKind::Method | SymbolKind::Constructor) {
                    display_name.push_str("()");
                }

                out.push(SymbolInfo {
                    id: SymbolId {
                        project: project.clone(),
                        qualified_name,
                    },
                    name: name.to_string(),
                    display_name,
                    kind: sym_kind,
                    assembly: None,
                    location: SymbolLocation::Source {
                        uri: uri.clone(),
                        span: TextSpan::new(node.start_byte(), node.end_byte()),
                    },
                    name_span: TextSpan::new(name_node.start_byte(), name_node.end_byte()),
                    doc_comment: leading_doc_comment(node, text),
                });

                if is_type_declaration(kind) {
                    type_stack.push(name.to_string());
                    pushed_type = true;
                }
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_declarations(child, text, project, uri, namespace_stack, type_stack, out);
    }

    if pushed_type {
        type_stack.pop();
    }
    if pushed_namespace {
        namespace_stack.pop();
    }
}

fn declaration_kind(node_kind: &str) -> Option<SymbolKind> {
    Some(match node_kind {
        "class_declaration" => SymbolKind::Class,
        "struct_declaration" => SymbolKind::Struct,
        "interface_declaration" => SymbolKind::Interface,
        "enum_declaration" => SymbolKind::Enum,
        "enum_member_declaration" => SymbolKind::EnumMember,
        "method_declaration" | "local_function_statement" => SymbolKind::Method,
        "constructor_declaration" => SymbolKind::Constructor,
        "property_declaration" => SymbolKind::Property,
        "field_declaration" => SymbolKind::Field,
        _ => return None,
    })
}

fn leading_doc_comment(node: Node, text: &str) -> Option<String> {
    let mut sibling = node.prev_sibling();
    let mut lines = Vec::new();
    while let Some(n) = sibling {
        if n.kind() != "comment" {
            break;
        }
        let raw = n.utf8_text(text.as_bytes()).ok()?;
        if !raw.starts_with("///") {
            break;
        }
        lines.push(raw.trim_start_matches('/').trim().to_string());
        sibling = n.prev_sibling();
    }
    if lines.is_empty() {
        None
    } else {
        lines.reverse();
        Some(lines.join("\n"))
    }
}

fn collect_syntax_errors(node: Node, text: &str, out: &mut Vec<Diagnostic>) {
    if node.is_error() || node.is_missing() {
        let range = byte_span_to_range(text, node.start_byte(), node.end_byte());
        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            "syntax error".to_string()
        };
        out.push(Diagnostic {
            range,
            severity: Some(DiagnosticSeverity::ERROR),
            code: Some(NumberOrString::String("syntax-error".to_string())),
            code_description: None,
            source: Some("csharp-language-server".to_string()),
            message,
            related_information: None,
            tags: None,
            data: None,
        });
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_syntax_errors(child, text, out);
    }
}

/// Well-known BCL names the adapter recognizes well enough to stub a plausible
/// declaration for (§9 "Decompilation"). Anything else gets a minimal
/// placeholder — enough to exercise the metadata cache, not a real decompiler.
fn stub_decompile(assembly: &str, full_name: &str) -> DecompileResult {
    let simple_name = full_name.rsplit('.').next().unwrap_or(full_name);
    let namespace = full_name.rsplit_once('.').map(|(ns, _)| ns);

    let kind_keyword = match simple_name {
        "Exception" | "ArgumentException" | "ArgumentNullException" | "InvalidOperationException" => "class",
        "IDisposable" | "IEnumerable" | "IEnumerator" | "IComparable" => "interface",
        _ if simple_name.starts_with('I') && simple_name.chars().nth(1).is_some_and(|c| c.is_uppercase()) => {
            "interface"
        }
        _ => "class",
    };

    let mut source = String::new();
    source.push_str(&format!("// decompiled from {assembly}\n"));
    if let Some(ns) = namespace {
        source.push_str(&format!("namespace {ns}\n{{\n"));
    }
    let indent = if namespace.is_some() { "    " } else { "" };
    let decl_line = format!("{indent}public {kind_keyword} {simple_name}\n{indent}{{\n{indent}}}\n");
    let decl_start = source.len() + indent.len() + "public ".len();
    source.push_str(&decl_line);
    if namespace.is_some() {
        source.push_str("}\n");
    }
    let decl_end = decl_start + format!("{kind_keyword} {simple_name}").len();

    DecompileResult {
        source,
        best_match_span: Some(TextSpan::new(decl_start, decl_end)),
    }
}

fn metadata_project_from_uri(uri: &Url) -> Option<ProjectId> {
    // csharp:/metadata/projects/{P}/assemblies/{A}/symbols/{FullName}.cs
    let segments: Vec<_> = uri.path_segments()?.collect();
    let idx = segments.iter().position(|s| *s == "projects")?;
    segments.get(idx + 1).map(|s| s.to_string())
}

fn find_files(root: &Path, ext: &str, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if !root.exists() {
        return Ok(());
    }
    if root.is_file() {
        if root.extension().and_then(|e| e.to_str()) == Some(ext) {
            out.push(root.to_path_buf());
        }
        return Ok(());
    }
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !matches!(e.file_name().to_str(), Some("bin") | Some("obj")))
    {
        let entry = entry.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        if entry.file_type().is_file() && entry.path().extension().and_then(|e| e.to_str()) == Some(ext) {
            out.push(entry.path().to_path_buf());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::fs;

    #[tokio::test]
    async fn extracts_class_and_method_symbols() {
        let backend = TreeSitterBackend::new();
        let uri = Url::parse("file:///Widget.cs").unwrap();
        backend
            .add_document(
                &uri,
                indoc! {"
                    namespace Acme {
                        public class Widget {
                            public void Spin() {}
                        }
                    }
                "}
                .to_string(),
                0,
            )
            .await
            .unwrap();
        let symbols = backend.document_symbols(&uri).await;
        assert!(symbols.iter().any(|s| s.name == "Widget" && s.kind == SymbolKind::Class));
        assert!(symbols.iter().any(|s| s.name == "Spin" && s.kind == SymbolKind::Method));
        assert!(symbols.iter().any(|s| s.id.qualified_name == "Acme.Widget"));
    }

    /// §4.G `hover`/§8 scenario S2: hovering `M` in `class Class { void M() {} }`
    /// must show `Class.M()`, and same-named methods on different enclosing
    /// types must not collide in `SymbolId` (§8 property implied by `rename`/
    /// `references` operating per-symbol, not per-name).
    #[tokio::test]
    async fn methods_are_qualified_by_enclosing_type_not_just_namespace() {
        let backend = TreeSitterBackend::new();
        let uri = Url::parse("file:///Classes.cs").unwrap();
        backend
            .add_document(
                &uri,
                indoc! {"
                    class A {
                        void Foo() {}
                    }
                    class B {
                        void Foo() {}
                    }
                "}
                .to_string(),
                0,
            )
            .await
            .unwrap();

        let symbols = backend.document_symbols(&uri).await;
        let a_foo = symbols.iter().find(|s| s.id.qualified_name == "A.Foo").expect("A.Foo present");
        let b_foo = symbols.iter().find(|s| s.id.qualified_name == "B.Foo").expect("B.Foo present");
        assert_ne!(a_foo.id, b_foo.id, "methods of the same name on different types must have distinct identity");
        assert_eq!(a_foo.display_name, "A.Foo()");
        assert_eq!(b_foo.display_name, "B.Foo()");

        let class = symbols.iter().find(|s| s.name == "A" && s.kind == SymbolKind::Class).unwrap();
        assert_eq!(class.id.qualified_name, "A", "a top-level type's own qualified name must not double up its own name");
        assert_eq!(class.display_name, "A");
    }

    /// §4.G `references`/`documentHighlight`: the declaration occurrence must
    /// be the name identifier's span, not the whole declaration body.
    #[tokio::test]
    async fn declaration_occurrence_span_is_the_name_identifier_not_the_whole_body() {
        let backend = TreeSitterBackend::new();
        let uri = Url::parse("file:///Widget.cs").unwrap();
        let text = indoc! {"
            class Widget {
                void Spin() {}
            }
        "};
        backend.add_document(&uri, text.to_string(), 0).await.unwrap();

        let symbol = backend
            .document_symbols(&uri)
            .await
            .into_iter()
            .find(|s| s.name == "Widget")
            .unwrap();
        let refs = backend.references(&symbol.id).await;
        let SymbolLocation::Source { span, .. } = refs
            .iter()
            .find(|loc| matches!(loc, SymbolLocation::Source { span, .. } if &text[span.start..span.end] == "Widget"))
            .expect("declaration occurrence present")
        else {
            unreachable!()
        };
        assert_eq!(&text[span.start..span.end], "Widget", "must be the identifier, not the surrounding class body");
        assert!(span.end - span.start < text.len(), "must be narrower than the whole declaration");
    }

    /// §4.G `initialize`: scans the solution-path hint for project files,
    /// one pseudo-project per `.csproj`, and skips `bin`/`obj` build output.
    #[tokio::test]
    async fn load_solution_discovers_one_project_per_csproj_and_skips_build_output() {
        let root = tempfile::tempdir().unwrap();

        let app_dir = root.path().join("App");
        fs::create_dir_all(&app_dir).unwrap();
        fs::write(app_dir.join("App.csproj"), "<Project Sdk=\"Microsoft.NET.Sdk\" />").unwrap();
        fs::write(
            app_dir.join("Program.cs"),
            indoc! {"
                class Program {
                    static void Main() {}
                }
            "},
        )
        .unwrap();

        let lib_dir = root.path().join("Lib");
        fs::create_dir_all(&lib_dir).unwrap();
        fs::write(lib_dir.join("Lib.csproj"), "<Project Sdk=\"Microsoft.NET.Sdk\" />").unwrap();
        fs::write(
            lib_dir.join("Widget.cs"),
            indoc! {"
                namespace Acme {
                    public class Widget {}
                }
            "},
        )
        .unwrap();

        let build_output_dir = lib_dir.join("bin").join("Debug");
        fs::create_dir_all(&build_output_dir).unwrap();
        fs::write(build_output_dir.join("Stale.cs"), "class Stale {}").unwrap();

        let backend = TreeSitterBackend::new();
        backend.load_solution(None, root.path()).await.unwrap();

        let documents = backend.documents().await;
        assert_eq!(documents.len(), 2, "only Program.cs and Widget.cs should be indexed, not the bin/ copy");

        let program_uri = Url::from_file_path(app_dir.join("Program.cs")).unwrap();
        let widget_uri = Url::from_file_path(lib_dir.join("Widget.cs")).unwrap();
        assert_eq!(backend.project_of(&program_uri).await, Some("App".to_string()));
        assert_eq!(backend.project_of(&widget_uri).await, Some("Lib".to_string()));

        let declarations = backend.find_declarations("Widget", 20).await;
        assert!(declarations.iter().any(|s| s.id.qualified_name == "Acme.Widget"));
    }

    #[tokio::test]
    async fn syntax_error_surfaces_as_diagnostic() {
        let backend = TreeSitterBackend::new();
        let uri = Url::parse("file:///Broken.cs").unwrap();
        backend
            .add_document(&uri, "public class {".to_string(), 0)
            .await
            .unwrap();
        let diags = backend.diagnostics(&uri).await;
        assert!(!diags.is_empty());
    }

    #[tokio::test]
    async fn decompile_stub_is_deterministic_and_well_formed() {
        let backend = TreeSitterBackend::new();
        let result = backend.decompile("System.Private.CoreLib", "System.ArgumentException").await;
        assert!(result.source.contains("class ArgumentException"));
        assert!(result.best_match_span.is_some());
        let second = backend.decompile("System.Private.CoreLib", "System.ArgumentException").await;
        assert_eq!(result.source, second.source);
    }
}
