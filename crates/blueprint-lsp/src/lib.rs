//! API Blueprint Language Server Protocol implementation.
//!
//! This crate provides the LSP server for API Blueprint documents, wrapping
//! `blueprint-lsp-core` with the tower-lsp framework.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        blueprint-lsp                           │
//! │   tower-lsp wrapper, JSON-RPC/stdio, `blueprint lsp` command   │
//! │                                                                │
//! │  ┌──────────────┐  ┌─────────────┐  ┌────────────────────────┐ │
//! │  │  server.rs   │  │ convert.rs  │  │    capabilities.rs     │ │
//! │  │LanguageServer│  │ Core → LSP  │  │ Capability negotiation │ │
//! │  └──────┬───────┘  └──────┬──────┘  └────────────────────────┘ │
//! │         │                 │                                    │
//! │         └─────────────────┴─────────────────┐                  │
//! │                                             │                  │
//! │  ┌──────────────────────────────────────────▼───────────────┐  │
//! │  │                   blueprint-lsp-core                      │  │
//! │  │   (parser adapter, diagnostics, outline, positions)       │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! The LSP server is invoked via the `blueprint lsp` subcommand:
//!
//! ```bash
//! blueprint lsp
//! ```
//!
//! Or programmatically:
//!
//! ```rust,ignore
//! blueprint_lsp::run_server().await;
//! ```

pub mod capabilities;
pub mod convert;
pub mod server;

pub use server::run_server;
