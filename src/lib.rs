//! # Dexload - PokeAPI to SQLite ingestion
//!
//! Pulls a fixed range of Pokémon from PokeAPI and stores them in a
//! normalized SQLite database, together with the types and moves they
//! reference.
//!
//! Dexload provides:
//! - A blocking HTTP client that follows the type/move URLs returned by the API
//! - A run-scoped reference cache so shared types and moves are fetched once
//! - An upsert-by-delete store with explicit, per-Pokémon commit sessions
//! - A small reporting layer over the finished store

pub mod model;
pub mod api;
pub mod cache;
pub mod storage;
pub mod ingest;
pub mod report;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use model::{PokemonInfo, TypeInfo, MoveInfo};
pub use api::{Fetch, HttpClient, ResourceClient};
pub use cache::ReferenceCache;
pub use storage::{SqliteStore, Session};
pub use ingest::{Ingestor, IngestStats, MissingPolicy};

/// Result type alias for Dexload operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Dexload operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Malformed resource at {locator}: {reason}")]
    Malformed { locator: String, reason: String },

    #[error("{kind} not found: {locator}")]
    NotFound { kind: &'static str, locator: String },

    #[error("Transient failure fetching {locator}: {reason}")]
    Transient { locator: String, reason: String },

    #[error("Reference resolved but missing from cache: {0}")]
    UnresolvedReference(String),

    #[error("Invalid schema script: {0}")]
    InvalidScript(String),
}
