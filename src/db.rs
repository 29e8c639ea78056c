use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::export::RecordSink;
use crate::matcher::EntityMatch;
use crate::records::schemas::ALL;
use crate::records::{RecordCollection, Schema};

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

/// One table per page schema (a TEXT column per field) plus the roster matches.
pub fn init_schema(conn: &Connection) -> Result<()> {
    for schema in ALL {
        let columns = schema
            .fields
            .iter()
            .map(|f| format!("{} TEXT NOT NULL", quote_ident(f.name)))
            .collect::<Vec<_>>()
            .join(", ");
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            quote_ident(schema.file_stem),
            columns
        ))?;
    }
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS entity_urls (
            name TEXT PRIMARY KEY,
            url  TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

/// Replace the stored roster matches with this run's.
pub fn save_entity_urls(conn: &Connection, matches: &[EntityMatch]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        tx.execute("DELETE FROM entity_urls", [])?;
        let mut stmt = tx.prepare("INSERT OR REPLACE INTO entity_urls (name, url) VALUES (?1, ?2)")?;
        for m in matches {
            count += stmt.execute(rusqlite::params![m.name, m.url])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_connection(connect(path)?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RecordSink for SqliteSink {
    /// Each run replaces the table's rows, like the CSV files.
    fn write(&mut self, collection: &RecordCollection) -> Result<()> {
        let schema = collection.schema;
        let table = quote_ident(schema.file_stem);
        let tx = self.conn.transaction()?;
        {
            tx.execute(&format!("DELETE FROM {}", table), [])?;
            let mut stmt = tx.prepare(&insert_sql(schema))?;
            for record in &collection.records {
                stmt.execute(rusqlite::params_from_iter(record.row()))?;
            }
        }
        tx.commit()?;
        info!("Saved {} rows to table {}", collection.records.len(), schema.file_stem);
        Ok(())
    }
}

fn insert_sql(schema: &Schema) -> String {
    let columns = schema
        .fields
        .iter()
        .map(|f| quote_ident(f.name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=schema.fields.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(schema.file_stem),
        columns,
        placeholders
    )
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchStats;
    use crate::records::schemas::PLAYER;
    use crate::records::PageRecord;

    fn player(name: &str) -> PageRecord {
        PageRecord {
            url: format!("https://a.com/p/{}", name),
            values: PLAYER
                .fields
                .iter()
                .map(|f| (f.name, format!("{} {}", name, f.name)))
                .collect(),
        }
    }

    fn sink() -> SqliteSink {
        SqliteSink::from_connection(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn insert_sql_quotes_columns() {
        let sql = insert_sql(&PLAYER);
        assert!(sql.starts_with("INSERT INTO \"player_data\" (\"Player Name\", \"Team Name\""));
        assert!(sql.ends_with("VALUES (?1, ?2, ?3, ?4, ?5, ?6)"));
    }

    #[test]
    fn records_saved_in_order() {
        let mut sink = sink();
        let collection = RecordCollection {
            schema: &PLAYER,
            records: vec![player("Root"), player("Stokes")],
            stats: BatchStats::default(),
        };
        sink.write(&collection).unwrap();

        let mut stmt = sink
            .connection()
            .prepare("SELECT \"Player Name\", \"Age\" FROM player_data ORDER BY rowid")
            .unwrap();
        let rows: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                ("Root Player Name".to_string(), "Root Age".to_string()),
                ("Stokes Player Name".to_string(), "Stokes Age".to_string()),
            ]
        );
    }

    #[test]
    fn rewrite_replaces_previous_run() {
        let mut sink = sink();
        let first = RecordCollection {
            schema: &PLAYER,
            records: vec![player("Root"), player("Stokes")],
            stats: BatchStats::default(),
        };
        sink.write(&first).unwrap();
        let second = RecordCollection {
            schema: &PLAYER,
            records: vec![player("Broad")],
            stats: BatchStats::default(),
        };
        sink.write(&second).unwrap();

        let count: i64 = sink
            .connection()
            .query_row("SELECT COUNT(*) FROM player_data", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn entity_urls_replaced_each_run() {
        let sink = sink();
        let matches = vec![
            EntityMatch {
                name: "Joe Root".into(),
                url: "https://a.com/cricketers/joe-root-303669".into(),
            },
            EntityMatch {
                name: "Ben Stokes".into(),
                url: "https://a.com/cricketers/ben-stokes-311158".into(),
            },
        ];
        assert_eq!(save_entity_urls(sink.connection(), &matches).unwrap(), 2);
        assert_eq!(save_entity_urls(sink.connection(), &matches[..1]).unwrap(), 1);

        let url: String = sink
            .connection()
            .query_row("SELECT url FROM entity_urls WHERE name = 'Joe Root'", [], |row| row.get(0))
            .unwrap();
        assert!(url.ends_with("joe-root-303669"));
    }
}
