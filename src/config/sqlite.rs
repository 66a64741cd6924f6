//! Settings stored as `(section, property, value)` rows in a SQLite table.

use super::source::{ConfigSource, Section};
use anyhow::{Context, Result};
use fancy_regex::Regex;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

const DEFAULT_TABLE: &str = "settings";

#[derive(Debug, Clone)]
pub struct SqliteSource {
    db_path: PathBuf,
    table: String,
}

impl SqliteSource {
    /// Read from the `settings` table of the database at `db_path`.
    pub fn new(db_path: &Path) -> Self {
        Self { db_path: db_path.to_path_buf(), table: DEFAULT_TABLE.to_string() }
    }

    /// Read from `table` instead. The name must be a plain SQL identifier.
    pub fn with_table(mut self, table: &str) -> Result<Self> {
        if !IDENTIFIER.is_match(table).unwrap_or(false) {
            anyhow::bail!("Invalid settings table name '{}'", table);
        }
        self.table = table.to_string();
        Ok(self)
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl ConfigSource for SqliteSource {
    fn load_section(&self, name: &str) -> Result<Option<Section>> {
        let conn = Connection::open_with_flags(&self.db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| {
                format!("Failed opening settings database: {}", self.db_path.display())
            })?;

        let sql = format!("SELECT property, value FROM {} WHERE section = ?1", self.table);
        let mut stmt = conn
            .prepare(&sql)
            .with_context(|| format!("Failed querying settings table '{}'", self.table))?;

        let rows = stmt.query_map(params![name], |row| {
            let property: String = row.get(0)?;
            let value: Option<String> = row.get(1)?;
            Ok((property, value.unwrap_or_default()))
        })?;

        let mut section = Section::new();
        for row in rows {
            let (property, value) = row?;
            section.insert(property, value);
        }

        Ok((!section.is_empty()).then_some(section))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed(path: &Path, table: &str) {
        let conn = Connection::open(path).expect("open db");
        conn.execute_batch(&format!(
            "CREATE TABLE {table} (section TEXT NOT NULL, property TEXT NOT NULL, value TEXT);
             INSERT INTO {table} VALUES ('pulse', 'interval', '0x1E');
             INSERT INTO {table} VALUES ('pulse', 'enabled', 'Y');
             INSERT INTO {table} VALUES ('pulse', 'note', NULL);"
        ))
        .expect("seed");
    }

    #[test]
    fn loads_rows_of_one_section() {
        let tmp = TempDir::new().expect("tmp");
        let db = tmp.path().join("settings.db");
        seed(&db, "settings");

        let source = SqliteSource::new(&db);
        let section = source.load_section("pulse").expect("load").expect("section");
        assert_eq!(section.len(), 3);
        assert_eq!(section.get("interval").map(String::as_str), Some("0x1E"));
        assert_eq!(section.get("note").map(String::as_str), Some(""));
        assert!(source.load_section("mail").expect("load").is_none());
    }

    #[test]
    fn custom_table_names_are_validated() {
        let tmp = TempDir::new().expect("tmp");
        let db = tmp.path().join("settings.db");
        seed(&db, "app_config");

        let source = SqliteSource::new(&db).with_table("app_config").expect("table");
        assert!(source.load_section("pulse").expect("load").is_some());
        assert!(SqliteSource::new(&db).with_table("x; DROP TABLE app_config").is_err());
    }

    #[test]
    fn missing_database_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        let source = SqliteSource::new(&tmp.path().join("absent.db"));
        assert!(source.load_section("pulse").is_err());
    }
}
