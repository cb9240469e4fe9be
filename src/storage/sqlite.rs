//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, OptionalExtension};
use crate::{Result, Error};
use crate::model::{MoveInfo, PokemonInfo, TypeInfo};
use super::schema::Table;
use super::session::Session;

/// SQLite-backed store for Pokémon, types, moves and their links
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist).
    ///
    /// Tables are not created here; run `bootstrap` or `create-db` first.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Execute a schema script
    pub fn bootstrap(&self, script: &str) -> Result<()> {
        self.conn.execute_batch(script)?;
        Ok(())
    }

    /// Execute a schema script read from a `.sql` file
    pub fn bootstrap_from_file(&self, script_path: &Path) -> Result<()> {
        if script_path.extension().and_then(|e| e.to_str()) != Some("sql") {
            return Err(Error::InvalidScript(format!(
                "{} must be a .sql file",
                script_path.display()
            )));
        }
        let script = std::fs::read_to_string(script_path)?;
        self.bootstrap(&script)
    }

    /// Read-only access for the reporting layer
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Sessions ==========

    /// Begin a unit of work. Nothing written through it is visible to
    /// other connections until `Session::commit`.
    pub fn open_session(&mut self) -> Result<Session<'_>> {
        Ok(Session::Open(self.conn.transaction()?))
    }

    /// A closed session: every write commits on its own
    pub fn autocommit(&mut self) -> Session<'_> {
        Session::Closed(&mut self.conn)
    }

    // ========== Standalone Writes ==========

    pub fn upsert_pokemon(&mut self, pokemon: &PokemonInfo) -> Result<()> {
        self.autocommit().upsert_pokemon(pokemon)
    }

    pub fn upsert_type(&mut self, type_info: &TypeInfo) -> Result<()> {
        self.autocommit().upsert_type(type_info)
    }

    pub fn upsert_move(&mut self, move_info: &MoveInfo) -> Result<()> {
        self.autocommit().upsert_move(move_info)
    }

    pub fn link_pokemon_type(&mut self, pokemon_id: i64, type_id: i64) -> Result<()> {
        self.autocommit().link_pokemon_type(pokemon_id, type_id)
    }

    pub fn link_pokemon_move(&mut self, pokemon_id: i64, move_id: i64) -> Result<()> {
        self.autocommit().link_pokemon_move(pokemon_id, move_id)
    }

    // ========== Reads ==========

    /// Get a stored Pokémon row by id
    pub fn get_pokemon(&self, id: i64) -> Result<Option<StoredPokemon>> {
        self.conn
            .query_row(
                "SELECT pokemonID, name, weight FROM pokemon WHERE pokemonID = ?1",
                [id],
                |row| {
                    Ok(StoredPokemon {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        weight: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a stored type by id
    pub fn get_type(&self, id: i64) -> Result<Option<TypeInfo>> {
        self.conn
            .query_row(
                "SELECT typeID, name FROM typeInfo WHERE typeID = ?1",
                [id],
                |row| Ok(TypeInfo { id: row.get(0)?, name: row.get(1)? }),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a stored move by id
    pub fn get_move(&self, id: i64) -> Result<Option<MoveInfo>> {
        self.conn
            .query_row(
                "SELECT moveID, name, accuracy FROM moveInfo WHERE moveID = ?1",
                [id],
                |row| {
                    Ok(MoveInfo {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        accuracy: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Type ids linked to a Pokémon, ascending
    pub fn type_ids_for(&self, pokemon_id: i64) -> Result<Vec<i64>> {
        self.linked_ids(
            "SELECT typeID FROM pokemonType WHERE pokemonID = ?1 ORDER BY typeID",
            pokemon_id,
        )
    }

    /// Move ids linked to a Pokémon, ascending
    pub fn move_ids_for(&self, pokemon_id: i64) -> Result<Vec<i64>> {
        self.linked_ids(
            "SELECT moveID FROM pokemonMove WHERE pokemonID = ?1 ORDER BY moveID",
            pokemon_id,
        )
    }

    fn linked_ids(&self, sql: &str, pokemon_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(sql)?;
        let ids = stmt
            .query_map([pokemon_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// Count rows in one of the pipeline's tables
    pub fn count_rows(&self, table: Table) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.as_str());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            pokemon: self.count_rows(Table::Pokemon)?,
            types: self.count_rows(Table::TypeInfo)?,
            moves: self.count_rows(Table::MoveInfo)?,
            type_links: self.count_rows(Table::PokemonType)?,
            move_links: self.count_rows(Table::PokemonMove)?,
        })
    }
}

/// A row of the `pokemon` table
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPokemon {
    pub id: i64,
    pub name: Option<String>,
    pub weight: Option<i64>,
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub pokemon: usize,
    pub types: usize,
    pub moves: usize,
    pub type_links: usize,
    pub move_links: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SCHEMA_SQL;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.bootstrap(SCHEMA_SQL).unwrap();
        store
    }

    fn pokemon(id: i64, name: &str, weight: i64) -> PokemonInfo {
        PokemonInfo {
            id,
            name: Some(name.to_string()),
            weight: Some(weight),
            type_refs: vec![],
            move_refs: vec![],
        }
    }

    #[test]
    fn test_upsert_pokemon_second_write_wins() {
        let mut store = store();

        store.upsert_pokemon(&pokemon(1, "bulbasaur", 69)).unwrap();
        store.upsert_pokemon(&pokemon(1, "bulbasaur-renamed", 70)).unwrap();

        assert_eq!(store.count_rows(Table::Pokemon).unwrap(), 1);
        let row = store.get_pokemon(1).unwrap().unwrap();
        assert_eq!(row.name.as_deref(), Some("bulbasaur-renamed"));
        assert_eq!(row.weight, Some(70));
    }

    #[test]
    fn test_upsert_type_and_move_are_idempotent() {
        let mut store = store();

        store.upsert_type(&TypeInfo { id: 12, name: Some("grass".into()) }).unwrap();
        store.upsert_type(&TypeInfo { id: 12, name: Some("leaf".into()) }).unwrap();
        store.upsert_move(&MoveInfo { id: 13, name: Some("razor-wind".into()), accuracy: Some(100) }).unwrap();
        store.upsert_move(&MoveInfo { id: 13, name: Some("razor-wind".into()), accuracy: None }).unwrap();

        assert_eq!(store.count_rows(Table::TypeInfo).unwrap(), 1);
        assert_eq!(store.count_rows(Table::MoveInfo).unwrap(), 1);
        assert_eq!(store.get_type(12).unwrap().unwrap().name.as_deref(), Some("leaf"));
        assert_eq!(store.get_move(13).unwrap().unwrap().accuracy, None);
    }

    #[test]
    fn test_links_never_duplicate() {
        let mut store = store();

        for _ in 0..3 {
            store.link_pokemon_type(1, 12).unwrap();
            store.link_pokemon_move(1, 13).unwrap();
        }

        assert_eq!(store.count_rows(Table::PokemonType).unwrap(), 1);
        assert_eq!(store.count_rows(Table::PokemonMove).unwrap(), 1);
        assert_eq!(store.type_ids_for(1).unwrap(), vec![12]);
    }

    #[test]
    fn test_rolled_back_session_leaves_nothing() {
        let mut store = store();

        let mut session = store.open_session().unwrap();
        assert!(session.is_open());
        session.upsert_pokemon(&pokemon(4, "charmander", 85)).unwrap();
        session.link_pokemon_type(4, 10).unwrap();
        session.rollback().unwrap();

        assert!(store.get_pokemon(4).unwrap().is_none());
        assert_eq!(store.count_rows(Table::PokemonType).unwrap(), 0);
    }

    #[test]
    fn test_open_session_isolated_until_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dex.db");
        let mut store = SqliteStore::open(&path).unwrap();
        store.bootstrap(SCHEMA_SQL).unwrap();
        // Fail the second link of Pokémon 2 from inside the database
        store
            .bootstrap(
                "CREATE TRIGGER reject_type_999 BEFORE INSERT ON pokemonType \
                 WHEN NEW.typeID = 999 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let mut session = store.open_session().unwrap();
        session.upsert_pokemon(&pokemon(1, "bulbasaur", 69)).unwrap();
        session.link_pokemon_type(1, 12).unwrap();
        session.commit().unwrap();

        let reader = SqliteStore::open(&path).unwrap();

        {
            let mut session = store.open_session().unwrap();
            session.upsert_pokemon(&pokemon(2, "ivysaur", 130)).unwrap();
            session.link_pokemon_type(2, 12).unwrap();
            let err = session.link_pokemon_type(2, 999).unwrap_err();
            assert!(matches!(err, Error::Storage(_)));

            // Staged but uncommitted writes are invisible to another connection
            assert!(reader.get_pokemon(2).unwrap().is_none());
            assert!(reader.type_ids_for(2).unwrap().is_empty());
            assert!(reader.get_pokemon(1).unwrap().is_some());
        }

        // Dropped without commit: rolled back
        assert!(reader.get_pokemon(2).unwrap().is_none());
        assert_eq!(reader.type_ids_for(1).unwrap(), vec![12]);
        assert_eq!(reader.count_rows(Table::PokemonType).unwrap(), 1);
    }

    #[test]
    fn test_bootstrap_rejects_non_sql_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("schema.txt");
        std::fs::write(&script, SCHEMA_SQL).unwrap();

        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.bootstrap_from_file(&script).unwrap_err();
        assert!(matches!(err, Error::InvalidScript(_)));
    }

    #[test]
    fn test_stats_counts_every_table() {
        let mut store = store();
        store.upsert_pokemon(&pokemon(1, "bulbasaur", 69)).unwrap();
        store.upsert_type(&TypeInfo { id: 12, name: Some("grass".into()) }).unwrap();
        store.link_pokemon_type(1, 12).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.pokemon, 1);
        assert_eq!(stats.types, 1);
        assert_eq!(stats.moves, 0);
        assert_eq!(stats.type_links, 1);
        assert_eq!(stats.move_links, 0);
    }
}
