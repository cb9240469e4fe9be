//! Write sessions
//!
//! A session is either closed, where every write is its own transaction,
//! or open, where writes pile up in one transaction until `commit`.
//! An open session that is dropped without a commit is rolled back.

use rusqlite::{params, Connection, Transaction};

use crate::Result;
use crate::model::{MoveInfo, PokemonInfo, TypeInfo};

/// Unit of work over the store
pub enum Session<'conn> {
    /// Autocommit: each write commits on its own
    Closed(&'conn mut Connection),
    /// Writes accumulate until `commit`
    Open(Transaction<'conn>),
}

impl<'conn> Session<'conn> {
    pub fn is_open(&self) -> bool {
        matches!(self, Session::Open(_))
    }

    /// Make every write since the session was opened durable.
    ///
    /// Closed sessions have nothing pending.
    pub fn commit(self) -> Result<()> {
        if let Session::Open(tx) = self {
            tx.commit()?;
        }
        Ok(())
    }

    /// Discard pending writes
    pub fn rollback(self) -> Result<()> {
        if let Session::Open(tx) = self {
            tx.rollback()?;
        }
        Ok(())
    }

    fn write<F>(&mut self, op: F) -> Result<()>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<()>,
    {
        match self {
            Session::Open(tx) => op(&**tx)?,
            Session::Closed(conn) => {
                let tx = conn.transaction()?;
                op(&tx)?;
                tx.commit()?;
            }
        }
        Ok(())
    }

    // ========== Entity Upserts ==========

    pub fn upsert_pokemon(&mut self, pokemon: &PokemonInfo) -> Result<()> {
        self.write(|conn| {
            conn.execute("DELETE FROM pokemon WHERE pokemonID = ?1", [pokemon.id])?;
            conn.execute(
                "INSERT INTO pokemon (pokemonID, name, weight) VALUES (?1, ?2, ?3)",
                params![pokemon.id, pokemon.name, pokemon.weight],
            )?;
            Ok(())
        })
    }

    pub fn upsert_type(&mut self, type_info: &TypeInfo) -> Result<()> {
        self.write(|conn| {
            conn.execute("DELETE FROM typeInfo WHERE typeID = ?1", [type_info.id])?;
            conn.execute(
                "INSERT INTO typeInfo (typeID, name) VALUES (?1, ?2)",
                params![type_info.id, type_info.name],
            )?;
            Ok(())
        })
    }

    pub fn upsert_move(&mut self, move_info: &MoveInfo) -> Result<()> {
        self.write(|conn| {
            conn.execute("DELETE FROM moveInfo WHERE moveID = ?1", [move_info.id])?;
            conn.execute(
                "INSERT INTO moveInfo (moveID, name, accuracy) VALUES (?1, ?2, ?3)",
                params![move_info.id, move_info.name, move_info.accuracy],
            )?;
            Ok(())
        })
    }

    // ========== Link Rows ==========

    pub fn link_pokemon_type(&mut self, pokemon_id: i64, type_id: i64) -> Result<()> {
        self.write(|conn| {
            conn.execute(
                "DELETE FROM pokemonType WHERE pokemonID = ?1 AND typeID = ?2",
                [pokemon_id, type_id],
            )?;
            conn.execute(
                "INSERT INTO pokemonType (pokemonID, typeID) VALUES (?1, ?2)",
                [pokemon_id, type_id],
            )?;
            Ok(())
        })
    }

    pub fn link_pokemon_move(&mut self, pokemon_id: i64, move_id: i64) -> Result<()> {
        self.write(|conn| {
            conn.execute(
                "DELETE FROM pokemonMove WHERE pokemonID = ?1 AND moveID = ?2",
                [pokemon_id, move_id],
            )?;
            conn.execute(
                "INSERT INTO pokemonMove (pokemonID, moveID) VALUES (?1, ?2)",
                [pokemon_id, move_id],
            )?;
            Ok(())
        })
    }
}
