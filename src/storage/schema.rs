//! Database schema definitions
//!
//! The store is provisioned by `create-db` from a script file before any
//! ingestion runs. The canonical script ships in `sql/schema.sql`.

/// Canonical schema script
pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Tables the pipeline writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Pokemon,
    TypeInfo,
    MoveInfo,
    PokemonType,
    PokemonMove,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Pokemon => "pokemon",
            Table::TypeInfo => "typeInfo",
            Table::MoveInfo => "moveInfo",
            Table::PokemonType => "pokemonType",
            Table::PokemonMove => "pokemonMove",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
