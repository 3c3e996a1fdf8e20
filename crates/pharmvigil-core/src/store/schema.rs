//! SQLite schema for the local report store.

/// Complete schema. Mirrors the column shape of the external row source:
/// a reports table keyed by id with the raw reaction text and a medicine
/// reference, and the medicine master table.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS adr_reports (
    id INTEGER PRIMARY KEY,
    reaction_description TEXT NOT NULL DEFAULT '',
    medicine_id INTEGER,
    canonical_generic TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_reports_medicine ON adr_reports(medicine_id);
CREATE INDEX IF NOT EXISTS idx_reports_created ON adr_reports(created_at);

CREATE TABLE IF NOT EXISTS medicines (
    id INTEGER PRIMARY KEY,
    brand_name TEXT NOT NULL DEFAULT '',
    generic_name TEXT NOT NULL DEFAULT ''
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "schema should be valid SQL: {:?}", result);
    }
}
