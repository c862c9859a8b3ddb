//! The public LSP contract, expressed against the request-scope types in
//! `scope` and the state actor in `state`: one method per request, each
//! delegating into a read or write scope.

use std::collections::HashMap;

use tower_lsp::jsonrpc::{self, Result as LspResult};
use tower_lsp::lsp_types::request::{GotoImplementationParams, GotoImplementationResponse};
use tower_lsp::lsp_types::*;
use tower_lsp::{async_trait, LanguageServer};

use crate::backend::conversions::{domain_symbol_kind_to_lsp, empty_range, location_of_source};
use crate::backend::CSharpBackend;
use crate::compiler::{RelationKind, SymbolLocation};
use crate::document::byte_span_to_range;
use crate::metadata::resolve_metadata;
use crate::scope::{ReadScope, WriteScope};
use crate::state::StateEvent;

#[async_trait]
impl LanguageServer for CSharpBackend {
    async fn initialize(&self, params: InitializeParams) -> jsonrpc::Result<InitializeResult> {
        let ticket = WriteScope::begin(&self.state);
        let scope = ticket.into_scope(self.compiler.clone()).await;

        scope.post(StateEvent::ClientCapabilityChange(params.capabilities.clone()));

        let hint = scope.snapshot.options.solution_path.clone();
        let cwd = root_dir_from_params(&params).unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."))
        });

        let load_result = self.compiler.load_solution(hint.as_deref(), &cwd).await;
        scope.emit_solution_change();
        scope.finish();

        if let Err(err) = load_result {
            tracing::error!(error = %err, "failed to load solution during initialize");
            return Err(err.into());
        }

        crate::diagnostics::spawn(self.state.clone());

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "csharp-language-server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                        include_text: Some(true),
                    })),
                    ..Default::default()
                })),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                rename_provider: Some(OneOf::Left(true)),
                definition_provider: Some(OneOf::Left(true)),
                implementation_provider: Some(ImplementationProviderCapability::Simple(true)),
                references_provider: Some(OneOf::Left(true)),
                document_highlight_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                document_formatting_provider: Some(OneOf::Left(true)),
                document_range_formatting_provider: Some(OneOf::Left(true)),
                document_on_type_formatting_provider: Some(DocumentOnTypeFormattingOptions {
                    first_trigger_character: ";".to_string(),
                    more_trigger_character: Some(vec!["}".to_string(), ")".to_string()]),
                }),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
                    retrigger_characters: Some(vec![",".to_string(), ")".to_string()]),
                    work_done_progress_options: Default::default(),
                }),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string(), "'".to_string()]),
                    ..Default::default()
                }),
                code_lens_provider: Some(CodeLensOptions { resolve_provider: Some(true) }),
                code_action_provider: Some(CodeActionProviderCapability::Options(CodeActionOptions {
                    resolve_provider: Some(true),
                    ..Default::default()
                })),
                ..Default::default()
            },
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "csharp-language-server initialized")
            .await;
    }

    async fn shutdown(&self) -> jsonrpc::Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let ticket = WriteScope::begin(&self.state);
        let scope = ticket.into_scope(self.compiler.clone()).await;

        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let text = params.text_document.text;

        let result = if self.compiler.project_of(&uri).await.is_some() {
            self.compiler.replace_text(&uri, text, version).await
        } else if uri.scheme() == "file" {
            self.compiler.add_document(&uri, text, version).await
        } else {
            Ok(())
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, uri = %uri, "didOpen failed to sync document");
        }

        scope.emit_solution_change();
        scope.post(StateEvent::OpenDocVersionAdd(uri.clone(), version));
        scope.post(StateEvent::PublishDiagnosticsOnDocument(uri));
        scope.finish();
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let ticket = WriteScope::begin(&self.state);
        let scope = ticket.into_scope(self.compiler.clone()).await;

        let uri = params.text_document.uri;
        let version = params.text_document.version;

        if let Some(current) = self.compiler.text(&uri).await {
            let mut doc = crate::document::TextDocument::new(uri.clone(), current, version);
            doc.apply_changes(params.content_changes, version);
            if let Err(err) = self.compiler.replace_text(&uri, doc.text(), version).await {
                tracing::warn!(error = %err, uri = %uri, "didChange failed to sync document");
            }
        }

        scope.emit_solution_change();
        scope.post(StateEvent::OpenDocVersionAdd(uri.clone(), version));
        scope.post(StateEvent::PublishDiagnosticsOnDocument(uri));
        scope.finish();
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let ticket = WriteScope::begin(&self.state);
        let scope = ticket.into_scope(self.compiler.clone()).await;

        if let Some(text) = params.text {
            let uri = params.text_document.uri;
            if self.compiler.project_of(&uri).await.is_none() {
                if let Err(err) = self.compiler.add_document(&uri, text, 0).await {
                    tracing::warn!(error = %err, uri = %uri, "didSave failed to add document");
                }
                scope.emit_solution_change();
                scope.post(StateEvent::PublishDiagnosticsOnDocument(uri));
            }
        }

        scope.finish();
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let ticket = WriteScope::begin(&self.state);
        let scope = ticket.into_scope(self.compiler.clone()).await;
        scope.post(StateEvent::OpenDocVersionRemove(params.text_document.uri));
        scope.finish();
    }

    async fn code_action(&self, params: CodeActionParams) -> LspResult<Option<CodeActionResponse>> {
        let scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let uri = params.text_document.uri;

        let Some(text) = self.compiler.text(&uri).await else {
            return Ok(None);
        };
        let doc = crate::document::TextDocument::new(uri.clone(), text, 0);
        let (start, end) = doc.range_to_chars(params.range);
        let rope = doc.rope();
        let text_span = crate::compiler::TextSpan::new(rope.char_to_byte(start), rope.char_to_byte(end));

        let fixes = scope.backend().code_fixes(&uri, text_span).await;

        let mut actions: Vec<CodeActionOrCommand> = fixes
            .iter()
            .map(|fix| {
                CodeActionOrCommand::CodeAction(CodeAction {
                    title: fix.title.clone(),
                    kind: Some(CodeActionKind::QUICKFIX),
                    is_preferred: Some(fix.preferred),
                    edit: Some(WorkspaceEdit {
                        changes: Some(fix.edits.clone().into_iter().collect()),
                        document_changes: None,
                        change_annotations: None,
                    }),
                    ..Default::default()
                })
            })
            .collect();
        actions.sort_by_key(|a| match a {
            CodeActionOrCommand::CodeAction(ca) => std::cmp::Reverse(ca.is_preferred.unwrap_or(false)),
            CodeActionOrCommand::Command(_) => std::cmp::Reverse(false),
        });

        if actions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(actions))
        }
    }

    async fn code_action_resolve(&self, params: CodeAction) -> LspResult<CodeAction> {
        // The adapter's fix list is always empty (§9), so there is nothing to
        // re-enumerate; this still honors the resolve contract by returning
        // the action unchanged rather than an error.
        Ok(params)
    }

    async fn code_lens(&self, params: CodeLensParams) -> LspResult<Option<Vec<CodeLens>>> {
        let scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let uri = params.text_document.uri;
        let Some(text) = self.compiler.text(&uri).await else {
            return Ok(None);
        };

        let symbols = scope.backend().document_symbols(&uri).await;
        let lenses = symbols
            .into_iter()
            .filter_map(|sym| match sym.location {
                SymbolLocation::Source { span, .. } => {
                    let range = byte_span_to_range(&text, span.start, span.start);
                    Some(CodeLens {
                        range,
                        command: None,
                        data: Some(serde_json::json!({
                            "documentUri": uri.to_string(),
                            "position": range.start,
                        })),
                    })
                }
                SymbolLocation::Metadata { .. } => None,
            })
            .collect();
        Ok(Some(lenses))
    }

    async fn code_lens_resolve(&self, params: CodeLens) -> LspResult<CodeLens> {
        match tokio::time::timeout(std::time::Duration::from_secs(10), self.resolve_code_lens(params)).await {
            Ok(result) => result,
            Err(_) => Err(crate::error::ServerError::Cancelled.into()),
        }
    }

    async fn completion(&self, params: CompletionParams) -> LspResult<Option<CompletionResponse>> {
        let scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let uri = params.text_document_position.text_document.uri;
        let Some(text) = self.compiler.text(&uri).await else {
            return Ok(None);
        };
        let doc = crate::document::TextDocument::new(uri.clone(), text, 0);
        let byte_offset = doc.position_to_byte(params.text_document_position.position);

        let items = scope
            .backend()
            .completions(&uri, byte_offset)
            .await
            .into_iter()
            .map(|sym| CompletionItem {
                label: sym.name,
                kind: Some(completion_item_kind(sym.kind)),
                insert_text_format: Some(InsertTextFormat::PLAIN_TEXT),
                ..Default::default()
            })
            .collect();

        Ok(Some(CompletionResponse::List(CompletionList {
            is_incomplete: false,
            items,
        })))
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> LspResult<Option<GotoDefinitionResponse>> {
        let scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let pos = params.text_document_position_params;
        let uri = pos.text_document.uri;

        let Some(text) = self.compiler.text(&uri).await else {
            return Ok(None);
        };
        let doc = crate::document::TextDocument::new(uri.clone(), text, 0);
        let byte_offset = doc.position_to_byte(pos.position);

        let Some(symbol) = scope.backend().symbol_at(&uri, byte_offset).await else {
            return Ok(None);
        };

        let location = match &symbol.location {
            SymbolLocation::Source { uri, span } => {
                let src = self.compiler.text(uri).await.unwrap_or_default();
                location_of_source(
                    &SymbolLocation::Source { uri: uri.clone(), span: *span },
                    &src,
                )
            }
            SymbolLocation::Metadata { assembly, full_name } => {
                let (meta_uri, span) =
                    resolve_metadata(&scope, &symbol.id.project, assembly, full_name).await;
                let src = self.compiler.text(&meta_uri).await.unwrap_or_default();
                let range = span
                    .map(|s| byte_span_to_range(&src, s.start, s.end))
                    .unwrap_or_else(empty_range);
                Some(Location::new(meta_uri, range))
            }
        };

        Ok(location.map(GotoDefinitionResponse::Scalar))
    }

    async fn goto_implementation(
        &self,
        params: GotoImplementationParams,
    ) -> LspResult<Option<GotoImplementationResponse>> {
        let scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let pos = params.text_document_position_params;
        let uri = pos.text_document.uri;

        let Some(text) = self.compiler.text(&uri).await else {
            return Ok(None);
        };
        let doc = crate::document::TextDocument::new(uri.clone(), text, 0);
        let byte_offset = doc.position_to_byte(pos.position);

        let Some(symbol) = scope.backend().symbol_at(&uri, byte_offset).await else {
            return Ok(None);
        };

        let locations = scope
            .backend()
            .related(&symbol.id, RelationKind::Implementations)
            .await;

        let mut out = Vec::with_capacity(locations.len());
        for loc in locations {
            match loc {
                SymbolLocation::Source { uri, span } => {
                    let src = self.compiler.text(&uri).await.unwrap_or_default();
                    out.push(Location::new(uri, byte_span_to_range(&src, span.start, span.end)));
                }
                SymbolLocation::Metadata { assembly, full_name } => {
                    let (meta_uri, span) =
                        resolve_metadata(&scope, &symbol.id.project, &assembly, &full_name).await;
                    let src = self.compiler.text(&meta_uri).await.unwrap_or_default();
                    let range = span
                        .map(|s| byte_span_to_range(&src, s.start, s.end))
                        .unwrap_or_else(empty_range);
                    out.push(Location::new(meta_uri, range));
                }
            }
        }

        if out.is_empty() {
            Ok(None)
        } else {
            Ok(Some(GotoImplementationResponse::Array(out)))
        }
    }

    async fn document_highlight(&self, params: DocumentHighlightParams) -> LspResult<Option<Vec<DocumentHighlight>>> {
        let scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let pos = params.text_document_position_params;
        let uri = pos.text_document.uri;

        let Some(text) = self.compiler.text(&uri).await else {
            return Ok(None);
        };
        let doc = crate::document::TextDocument::new(uri.clone(), text.clone(), 0);
        let byte_offset = doc.position_to_byte(pos.position);

        let Some(symbol) = scope.backend().symbol_at(&uri, byte_offset).await else {
            return Ok(None);
        };
        if symbol.kind == crate::compiler::SymbolKind::Namespace {
            return Ok(None);
        }

        let mut highlights = Vec::new();
        for loc in scope.backend().references(&symbol.id).await {
            if let SymbolLocation::Source { uri: ref_uri, span } = loc {
                if ref_uri == uri {
                    highlights.push(DocumentHighlight {
                        range: byte_span_to_range(&text, span.start, span.end),
                        kind: Some(DocumentHighlightKind::READ),
                    });
                }
            }
        }
        if let SymbolLocation::Source { uri: decl_uri, span } = &symbol.location {
            if *decl_uri == uri {
                highlights.push(DocumentHighlight {
                    range: byte_span_to_range(&text, span.start, span.end),
                    kind: Some(DocumentHighlightKind::READ),
                });
            }
        }

        Ok(Some(highlights))
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> LspResult<Option<DocumentSymbolResponse>> {
        let scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let uri = params.text_document.uri;
        let Some(text) = self.compiler.text(&uri).await else {
            return Ok(None);
        };

        let symbols = scope.backend().document_symbols(&uri).await;
        #[allow(deprecated)]
        let infos: Vec<SymbolInformation> = symbols
            .iter()
            .filter_map(|sym| match &sym.location {
                SymbolLocation::Source { span, .. } => Some(SymbolInformation {
                    name: sym.name.clone(),
                    kind: domain_symbol_kind_to_lsp(sym.kind),
                    tags: None,
                    deprecated: None,
                    location: Location::new(uri.clone(), byte_span_to_range(&text, span.start, span.end)),
                    container_name: None,
                }),
                SymbolLocation::Metadata { .. } => None,
            })
            .collect();

        Ok(Some(DocumentSymbolResponse::Flat(infos)))
    }

    async fn hover(&self, params: HoverParams) -> LspResult<Option<Hover>> {
        let scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let pos = params.text_document_position_params;
        let uri = pos.text_document.uri;

        let Some(text) = self.compiler.text(&uri).await else {
            return Ok(None);
        };
        let doc = crate::document::TextDocument::new(uri.clone(), text, 0);
        let byte_offset = doc.position_to_byte(pos.position);

        let Some(symbol) = scope.backend().symbol_at(&uri, byte_offset).await else {
            return Ok(None);
        };

        let mut markdown = format!("`{}`", symbol.display_name);
        if let Some(assembly) = &symbol.assembly {
            markdown.push_str(&format!(" _(from assembly {assembly})_"));
        }
        if let Some(doc_comment) = &symbol.doc_comment {
            markdown.push_str("\n\n");
            markdown.push_str(doc_comment);
        }

        Ok(Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: markdown,
            }),
            range: None,
        }))
    }

    async fn references(&self, params: ReferenceParams) -> LspResult<Option<Vec<Location>>> {
        let scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let pos = params.text_document_position;
        let uri = pos.text_document.uri;

        let Some(text) = self.compiler.text(&uri).await else {
            return Ok(None);
        };
        let doc = crate::document::TextDocument::new(uri.clone(), text, 0);
        let byte_offset = doc.position_to_byte(pos.position);

        let Some(symbol) = scope.backend().symbol_at(&uri, byte_offset).await else {
            return Ok(Some(Vec::new()));
        };

        let mut out = Vec::new();
        for loc in scope.backend().references(&symbol.id).await {
            if let SymbolLocation::Source { uri, span } = loc {
                if let Some(src) = self.compiler.text(&uri).await {
                    out.push(Location::new(uri, byte_span_to_range(&src, span.start, span.end)));
                }
            }
        }
        Ok(Some(out))
    }

    async fn rename(&self, params: RenameParams) -> LspResult<Option<WorkspaceEdit>> {
        let scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let pos = params.text_document_position;
        let uri = pos.text_document.uri;

        let Some(text) = self.compiler.text(&uri).await else {
            return Ok(None);
        };
        let doc = crate::document::TextDocument::new(uri.clone(), text, 0);
        let byte_offset = doc.position_to_byte(pos.position);

        let Some(symbol) = scope.backend().symbol_at(&uri, byte_offset).await else {
            return Ok(None);
        };

        let edits = scope
            .backend()
            .rename(&symbol.id, &params.new_name)
            .await
            .map_err(jsonrpc::Error::from)?;

        if edits.is_empty() {
            return Ok(None);
        }

        let supports_document_changes = scope
            .snapshot
            .client_capabilities
            .as_ref()
            .and_then(|c| c.workspace.as_ref())
            .and_then(|w| w.workspace_edit.as_ref())
            .and_then(|we| we.document_changes)
            .unwrap_or(false);

        if supports_document_changes {
            let document_changes = edits
                .into_iter()
                .map(|(uri, text_edits)| {
                    let version = scope.snapshot.open_doc_versions.get(&uri).copied();
                    TextDocumentEdit {
                        text_document: OptionalVersionedTextDocumentIdentifier { uri, version },
                        edits: text_edits.into_iter().map(OneOf::Left).collect(),
                    }
                })
                .collect();
            Ok(Some(WorkspaceEdit {
                changes: None,
                document_changes: Some(DocumentChanges::Edits(document_changes)),
                change_annotations: None,
            }))
        } else {
            let changes: HashMap<Url, Vec<TextEdit>> = edits.into_iter().collect();
            Ok(Some(WorkspaceEdit {
                changes: Some(changes),
                document_changes: None,
                change_annotations: None,
            }))
        }
    }

    async fn signature_help(&self, _params: SignatureHelpParams) -> LspResult<Option<SignatureHelp>> {
        // Preserved verbatim as a stub (§9 Open Questions).
        Ok(None)
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> LspResult<Option<Vec<TextEdit>>> {
        let _scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        Ok(Some(self.compiler.format(&params.text_document.uri).await))
    }

    async fn range_formatting(&self, params: DocumentRangeFormattingParams) -> LspResult<Option<Vec<TextEdit>>> {
        let _scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let uri = params.text_document.uri;
        let Some(text) = self.compiler.text(&uri).await else {
            return Ok(Some(Vec::new()));
        };
        let doc = crate::document::TextDocument::new(uri.clone(), text, 0);
        let (start, end) = doc.range_to_chars(params.range);
        let rope = doc.rope();
        let span = crate::compiler::TextSpan::new(rope.char_to_byte(start), rope.char_to_byte(end));
        Ok(Some(self.compiler.range_format(&uri, span).await))
    }

    async fn on_type_formatting(&self, params: DocumentOnTypeFormattingParams) -> LspResult<Option<Vec<TextEdit>>> {
        let _scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let uri = params.text_document_position.text_document.uri;
        let Some(text) = self.compiler.text(&uri).await else {
            return Ok(Some(Vec::new()));
        };
        let doc = crate::document::TextDocument::new(uri.clone(), text, 0);
        let byte_offset = doc.position_to_byte(params.text_document_position.position);
        let ch = params.ch.chars().next().unwrap_or(';');
        Ok(Some(self.compiler.on_type_format(&uri, byte_offset, ch).await))
    }

    async fn symbol(&self, params: WorkspaceSymbolParams) -> LspResult<Option<Vec<SymbolInformation>>> {
        let scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;
        let declarations = scope.backend().find_declarations(&params.query, 20).await;

        let mut out = Vec::with_capacity(declarations.len());
        for sym in declarations {
            if let SymbolLocation::Source { uri, span } = &sym.location {
                if let Some(text) = self.compiler.text(uri).await {
                    #[allow(deprecated)]
                    out.push(SymbolInformation {
                        name: sym.name.clone(),
                        kind: domain_symbol_kind_to_lsp(sym.kind),
                        tags: None,
                        deprecated: None,
                        location: Location::new(uri.clone(), byte_span_to_range(&text, span.start, span.end)),
                        container_name: None,
                    });
                }
            }
        }
        Ok(Some(out))
    }
}

impl CSharpBackend {
    async fn resolve_code_lens(&self, mut params: CodeLens) -> LspResult<CodeLens> {
        let scope = ReadScope::acquire(&self.state, self.compiler.clone()).await;

        let Some(data) = params.data.clone() else {
            return Ok(params);
        };
        let Some(uri_str) = data.get("documentUri").and_then(|v| v.as_str()) else {
            return Ok(params);
        };
        let Ok(uri) = Url::parse(uri_str) else {
            return Ok(params);
        };

        let byte_offset = self
            .compiler
            .text(&uri)
            .await
            .map(|text| {
                let doc = crate::document::TextDocument::new(uri.clone(), text, 0);
                doc.position_to_byte(params.range.start)
            })
            .unwrap_or(0);

        let count = if let Some(symbol) = scope.backend().symbol_at(&uri, byte_offset).await {
            scope.backend().references(&symbol.id).await.len()
        } else {
            0
        };

        params.command = Some(Command {
            title: format!("{count} Reference(s)"),
            command: "csharp.showReferences".to_string(),
            arguments: None,
        });
        Ok(params)
    }
}

fn completion_item_kind(kind: crate::compiler::SymbolKind) -> CompletionItemKind {
    use crate::compiler::SymbolKind as K;
    match kind {
        K::Namespace => CompletionItemKind::MODULE,
        K::Class => CompletionItemKind::CLASS,
        K::Struct => CompletionItemKind::STRUCT,
        K::Interface => CompletionItemKind::INTERFACE,
        K::Enum => CompletionItemKind::ENUM,
        K::EnumMember => CompletionItemKind::ENUM_MEMBER,
        K::Method => CompletionItemKind::METHOD,
        K::Constructor => CompletionItemKind::CONSTRUCTOR,
        K::Property => CompletionItemKind::PROPERTY,
        K::Field => CompletionItemKind::FIELD,
    }
}

fn root_dir_from_params(params: &InitializeParams) -> Option<std::path::PathBuf> {
    #[allow(deprecated)]
    params
        .root_uri
        .as_ref()
        .and_then(|uri| uri.to_file_path().ok())
        .or_else(|| {
            params
                .workspace_folders
                .as_ref()
                .and_then(|folders| folders.first())
                .and_then(|folder| folder.uri.to_file_path().ok())
        })
}

