//! Command implementations for the blueprint CLI
//!
//! Each command module handles the CLI interface and delegates to
//! blueprint-lsp-core / blueprint-lsp for the actual work.

pub mod check;
pub mod lsp;
