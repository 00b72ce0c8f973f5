//! LSP server implementation using tower-lsp.

use std::sync::Arc;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use blueprint_lsp_core::document::DocumentStore;
use blueprint_lsp_core::{CommandParser, Settings, analyze};

use crate::capabilities::server_capabilities;
use crate::convert;

/// The API Blueprint language server.
pub struct BlueprintLanguageServer {
    /// The LSP client for sending notifications.
    client: Client,
    /// Document store for managing open documents.
    documents: Arc<RwLock<DocumentStore>>,
    /// Settings applied to the next validation pass.
    settings: Arc<RwLock<Settings>>,
}

impl BlueprintLanguageServer {
    /// Create a new language server instance.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(RwLock::new(DocumentStore::new())),
            settings: Arc::new(RwLock::new(Settings::default())),
        }
    }

    /// Replace the current settings with `value` merged over the defaults.
    ///
    /// Malformed settings are reported and the previous ones kept.
    async fn apply_settings(&self, value: &serde_json::Value) {
        match Settings::from_value(value) {
            Ok(settings) => {
                tracing::debug!(?settings, "Settings updated");
                *self.settings.write().await = settings;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring malformed settings");
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!("Ignoring malformed settings: {err}"),
                    )
                    .await;
            }
        }
    }

    /// Parse the current text of a document and publish its diagnostics.
    async fn validate(&self, uri: Url) {
        // The generation is captured before the settings are read, so a
        // settings change racing with this pass always outdates it.
        let snapshot = {
            let documents = self.documents.read().await;
            documents.get(uri.as_str()).map(|state| {
                (
                    state.document.content().to_string(),
                    state.document.version(),
                    state.generation(),
                )
            })
        };
        let Some((text, version, generation)) = snapshot else {
            return;
        };
        let settings = self.settings.read().await.clone();

        // The parser is an external process, keep it off the async workers.
        let analysis = tokio::task::spawn_blocking(move || {
            let parser = CommandParser::from_settings(&settings.parser);
            analyze(&text, &settings, &parser)
        })
        .await;

        let analysis = match analysis {
            Ok(analysis) => Arc::new(analysis),
            Err(err) => {
                tracing::error!(uri = uri.as_str(), error = %err, "Validation task failed");
                return;
            }
        };

        let diagnostics: Vec<Diagnostic> = analysis
            .diagnostics
            .iter()
            .map(convert::diagnostic_to_lsp)
            .collect();

        // Publish under the write lock: the last stored analysis is always
        // the last one published.
        let mut documents = self.documents.write().await;
        if documents.store_analysis(uri.as_str(), generation, analysis) {
            tracing::debug!(
                uri = uri.as_str(),
                ?version,
                count = diagnostics.len(),
                "Publishing diagnostics"
            );
            self.client
                .publish_diagnostics(uri, diagnostics, version)
                .await;
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for BlueprintLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(options) = params.initialization_options.as_ref() {
            self.apply_settings(options).await;
        }

        Ok(InitializeResult {
            capabilities: server_capabilities(),
            server_info: Some(ServerInfo {
                name: "blueprint-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        tracing::info!("API Blueprint language server initialized");
        self.client
            .log_message(MessageType::INFO, "API Blueprint LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        let text = params.text_document.text;
        let version = params.text_document.version;

        {
            let mut documents = self.documents.write().await;
            documents.open(uri.as_str(), text, version);
        }

        self.validate(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        let version = params.text_document.version;

        // We're using full document sync, so take the last change
        if let Some(change) = params.content_changes.into_iter().last() {
            let known = {
                let mut documents = self.documents.write().await;
                documents.change(uri.as_str(), change.text, version)
            };

            if known {
                self.validate(uri).await;
            } else {
                tracing::warn!(uri = uri.as_str(), "Change for a document that is not open");
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        let mut documents = self.documents.write().await;
        documents.close(uri.as_str());

        // Clear diagnostics for closed document
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.apply_settings(&params.settings).await;

        let uris: Vec<String> = {
            let mut documents = self.documents.write().await;
            documents.invalidate_all();
            documents.uris().map(str::to_string).collect()
        };

        for uri in uris {
            match Url::parse(&uri) {
                Ok(url) => self.validate(url).await,
                Err(err) => {
                    tracing::warn!(uri = uri.as_str(), error = %err, "Skipping unparseable URI")
                }
            }
        }
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;
        let documents = self.documents.read().await;

        let symbols = documents
            .get(uri.as_str())
            .and_then(|state| state.analysis())
            .map(|analysis| analysis.symbols())
            .unwrap_or_default();

        let lsp_symbols: Vec<SymbolInformation> = symbols
            .iter()
            .map(|symbol| convert::symbol_to_lsp(symbol, &uri))
            .collect();
        Ok(Some(DocumentSymbolResponse::Flat(lsp_symbols)))
    }
}

/// Run the LSP server over stdio.
pub async fn run_server() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(BlueprintLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
