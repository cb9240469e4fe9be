//! Remote API layer - read-only access to PokeAPI
//!
//! The orchestrator only sees the `ResourceClient` trait. Every fetch
//! returns a `Fetch` so callers have to branch on a missing resource
//! instead of letting it flow into the write path.

pub mod http;

use crate::Result;
use crate::model::{MoveInfo, PokemonInfo, TypeInfo};

pub use http::{ClientOptions, HttpClient, DEFAULT_BASE_URL};

/// Outcome of a single remote read
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    /// Success response with a decodable body
    Resolved(T),
    /// Any non-success status
    NotFound,
    /// The request never produced a response (connect, timeout, body read)
    TransientError(String),
}

impl<T> Fetch<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetch<U> {
        match self {
            Fetch::Resolved(v) => Fetch::Resolved(f(v)),
            Fetch::NotFound => Fetch::NotFound,
            Fetch::TransientError(e) => Fetch::TransientError(e),
        }
    }
}

/// Source of Pokémon, type and move records.
///
/// `Err` is reserved for responses that arrived but could not be decoded.
pub trait ResourceClient {
    /// Fetch a Pokémon by its numeric id
    fn fetch_pokemon(&self, id: i64) -> Result<Fetch<PokemonInfo>>;

    /// Dereference a type URL taken from a Pokémon body
    fn fetch_type(&self, url: &str) -> Result<Fetch<TypeInfo>>;

    /// Dereference a move URL taken from a Pokémon body
    fn fetch_move(&self, url: &str) -> Result<Fetch<MoveInfo>>;
}
