//! Journal API - HTTP service for journal entries with LLM-backed analysis.
//!
//! This crate provides:
//! - SQLite-backed journal entry storage (CRUD + list + clear)
//! - A chat-completion provider abstraction with schema-constrained output
//! - An analysis pipeline (prompt assembly, one strict-schema call, validation)
//! - The REST surface tying the two together
//!
//! ## Architecture
//!
//! ```text
//! Client → routes → EntryStore (SQLite)
//!                 → Analyzer → Provider (chat completions, strict JSON schema)
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod provider;
pub mod routes;
pub mod store;

pub use analysis::{AnalysisError, AnalysisResult, Analyzer, Sentiment};
pub use provider::{ChatRequest, ChatResponse, Message, OpenAIProvider, Provider, ProviderError};
pub use routes::AppState;
pub use store::{Entry, EntryCreate, EntryStore, EntryUpdate};

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use journal_common::config::Config;

/// Build the service router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::entry_routes(state).layer(cors)
}

/// Build application state from configuration.
pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let store = EntryStore::new(&config.storage.db_path)?;
    let analyzer = Arc::new(Analyzer::from_config(&config.llm));
    Ok(AppState::new(store, analyzer))
}

/// Start the journal API server.
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let state = build_state(config)?;
    let router = build_router(state);

    tracing::info!("Starting journal API on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
