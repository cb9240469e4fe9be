//! Reporting - fixed aggregate queries over a finished store
//!
//! Read-only. Each section carries the question it answers, the column
//! names, and the rows rendered as text.

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::Result;

/// (question, SQL) pairs, printed in this order
pub const QUERIES: &[(&str, &str)] = &[
    (
        "What is the average weight of the pokemon by Pokemon type?",
        r#"
        SELECT t.name AS pokemonType, AVG(p.weight) AS averageWeight
        FROM pokemon p, typeInfo t, pokemonType pt
        WHERE p.pokemonID = pt.pokemonID AND pt.typeID = t.typeID
        GROUP BY t.typeID
        ORDER BY t.typeID
        "#,
    ),
    (
        "List the highest accuracy move by Pokemon type",
        r#"
        SELECT t.name AS pokemonType, MAX(m.accuracy) AS maxAccuracy
        FROM pokemon p, moveInfo m, pokemonMove pm, typeInfo t, pokemonType pt
        WHERE p.pokemonID = pt.pokemonID AND pt.typeID = t.typeID
          AND p.pokemonID = pm.pokemonID AND pm.moveID = m.moveID
        GROUP BY t.typeID
        ORDER BY t.typeID
        "#,
    ),
    (
        "Count the number of moves by Pokemon and order from greatest to least",
        r#"
        SELECT p.name, COUNT(*) AS count
        FROM pokemonMove pm, pokemon p
        WHERE pm.pokemonID = p.pokemonID
        GROUP BY pm.pokemonID
        ORDER BY count DESC, pm.pokemonID
        "#,
    ),
];

/// One answered question
#[derive(Debug, Clone)]
pub struct ReportSection {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn render(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "None".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Run a single query into a section
pub fn run_query(conn: &Connection, title: &str, sql: &str) -> Result<ReportSection> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([])?;
    while let Some(row) = cursor.next()? {
        let mut rendered = Vec::with_capacity(width);
        for i in 0..width {
            rendered.push(render(row.get_ref(i)?));
        }
        rows.push(rendered);
    }

    Ok(ReportSection {
        title: title.to_string(),
        columns,
        rows,
    })
}

/// Run every report query in order
pub fn run_all(conn: &Connection) -> Result<Vec<ReportSection>> {
    QUERIES
        .iter()
        .map(|(title, sql)| run_query(conn, title, sql))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MoveInfo, PokemonInfo, TypeInfo};
    use crate::storage::{SqliteStore, SCHEMA_SQL};

    fn seeded() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.bootstrap(SCHEMA_SQL).unwrap();

        let mon = |id: i64, name: &str, weight: i64| PokemonInfo {
            id,
            name: Some(name.to_string()),
            weight: Some(weight),
            type_refs: vec![],
            move_refs: vec![],
        };
        store.upsert_pokemon(&mon(1, "bulbasaur", 69)).unwrap();
        store.upsert_pokemon(&mon(2, "ivysaur", 130)).unwrap();
        store.upsert_type(&TypeInfo { id: 4, name: Some("poison".into()) }).unwrap();
        store.upsert_type(&TypeInfo { id: 12, name: Some("grass".into()) }).unwrap();
        store.upsert_move(&MoveInfo { id: 15, name: Some("cut".into()), accuracy: Some(95) }).unwrap();
        store.upsert_move(&MoveInfo { id: 45, name: Some("growl".into()), accuracy: Some(100) }).unwrap();

        store.link_pokemon_type(1, 12).unwrap();
        store.link_pokemon_type(1, 4).unwrap();
        store.link_pokemon_type(2, 12).unwrap();
        store.link_pokemon_move(1, 15).unwrap();
        store.link_pokemon_move(1, 45).unwrap();
        store.link_pokemon_move(2, 15).unwrap();
        store
    }

    #[test]
    fn test_average_weight_by_type() {
        let store = seeded();
        let (title, sql) = QUERIES[0];
        let section = run_query(store.connection(), title, sql).unwrap();

        assert_eq!(section.columns, vec!["pokemonType", "averageWeight"]);
        assert_eq!(
            section.rows,
            vec![
                vec!["poison".to_string(), "69".to_string()],
                vec!["grass".to_string(), "99.5".to_string()],
            ]
        );
    }

    #[test]
    fn test_max_accuracy_by_type() {
        let store = seeded();
        let (title, sql) = QUERIES[1];
        let section = run_query(store.connection(), title, sql).unwrap();

        assert_eq!(section.columns, vec!["pokemonType", "maxAccuracy"]);
        assert_eq!(section.rows.len(), 2);
        assert!(section.rows.iter().all(|r| r[1] == "100"));
    }

    #[test]
    fn test_move_count_descending() {
        let store = seeded();
        let sections = run_all(store.connection()).unwrap();
        assert_eq!(sections.len(), 3);

        let counts = &sections[2];
        assert_eq!(counts.columns, vec!["name", "count"]);
        assert_eq!(counts.rows[0], vec!["bulbasaur".to_string(), "2".to_string()]);
        assert_eq!(counts.rows[1], vec!["ivysaur".to_string(), "1".to_string()]);
    }
}
