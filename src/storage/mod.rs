//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - pokemon(pokemonID, name, weight)
//! - typeInfo(typeID, name)
//! - moveInfo(moveID, name, accuracy)
//! - pokemonType(pokemonID, typeID)
//! - pokemonMove(pokemonID, moveID)

pub mod schema;
pub mod session;
pub mod sqlite;

pub use schema::{Table, SCHEMA_SQL};
pub use session::Session;
pub use sqlite::{SqliteStore, StoredPokemon, DbStats};
