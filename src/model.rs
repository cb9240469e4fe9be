//! Record types - transient values produced by the API client
//!
//! Three kinds of resources flow through an ingestion run:
//! - `Pokemon`: the top-level record, carries references to types and moves
//! - `Type`: shared by many Pokémon
//! - `Move`: shared by many Pokémon

use serde::{Deserialize, Serialize};

/// Kinds of remote resource the pipeline knows how to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Pokemon,
    Type,
    Move,
}

impl ResourceKind {
    /// Get the string representation of the resource kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pokemon => "pokemon",
            ResourceKind::Type => "type",
            ResourceKind::Move => "move",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A Pokémon as returned by `/pokemon/{id}`.
///
/// Reference lists keep their upstream order. A reference whose nested
/// `url` is missing is kept as `None` so malformed upstream data stays
/// visible to the orchestrator instead of being dropped here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonInfo {
    /// The id that was requested
    pub id: i64,
    pub name: Option<String>,
    pub weight: Option<i64>,
    /// `types[].type.url`
    pub type_refs: Vec<Option<String>>,
    /// `moves[].move.url`
    pub move_refs: Vec<Option<String>>,
}

/// A Pokémon type (grass, poison, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub id: i64,
    pub name: Option<String>,
}

/// A move. Status moves have no accuracy upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveInfo {
    pub id: i64,
    pub name: Option<String>,
    pub accuracy: Option<i64>,
}

struct OrNone<'a, T>(&'a Option<T>);

impl<T: std::fmt::Display> std::fmt::Display for OrNone<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "None"),
        }
    }
}

impl std::fmt::Display for PokemonInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, types: {}, moves: {}",
            self.id,
            OrNone(&self.name),
            OrNone(&self.weight),
            self.type_refs.len(),
            self.move_refs.len()
        )
    }
}

impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.id, OrNone(&self.name))
    }
}

impl std::fmt::Display for MoveInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.id, OrNone(&self.name), OrNone(&self.accuracy))
    }
}
