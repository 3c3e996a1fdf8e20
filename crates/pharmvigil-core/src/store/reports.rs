//! Report and medicine-master queries.

use rusqlite::params;

use super::{Database, ReportStore, StoreResult};
use crate::models::{MedicineRecord, ReportFilter};

impl Database {
    /// Insert a report row, returning its id.
    pub fn insert_report(
        &self,
        reaction_description: &str,
        medicine_id: Option<i64>,
        canonical_generic: Option<&str>,
    ) -> StoreResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO adr_reports (reaction_description, medicine_id, canonical_generic)
            VALUES (?1, ?2, ?3)
            "#,
            params![reaction_description, medicine_id, canonical_generic],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert a report row with an explicit creation timestamp (RFC 3339).
    pub fn insert_report_at(
        &self,
        reaction_description: &str,
        medicine_id: Option<i64>,
        canonical_generic: Option<&str>,
        created_at: &str,
    ) -> StoreResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO adr_reports (reaction_description, medicine_id, canonical_generic, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![reaction_description, medicine_id, canonical_generic, created_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert or replace a medicine master record.
    pub fn upsert_medicine(&self, record: &MedicineRecord) -> StoreResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO medicines (id, brand_name, generic_name)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                brand_name = excluded.brand_name,
                generic_name = excluded.generic_name
            "#,
            params![record.id, record.brand_name, record.generic_name],
        )?;
        Ok(())
    }
}

impl ReportStore for Database {
    fn reaction_texts(&self, filter: &ReportFilter) -> StoreResult<Vec<String>> {
        let mut sql = String::from("SELECT reaction_description FROM adr_reports WHERE 1=1");
        let mut args: Vec<String> = Vec::new();

        if let Some(start) = &filter.start {
            sql.push_str(" AND created_at >= ?");
            args.push(start.to_rfc3339());
        }
        if let Some(end) = &filter.end {
            sql.push_str(" AND created_at < ?");
            args.push(end.to_rfc3339());
        }
        if let Some(medicine) = &filter.medicine {
            sql.push_str(" AND canonical_generic = ?");
            args.push(medicine.clone());
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), |row| row.get(0))?;

        let mut texts = Vec::new();
        for row in rows {
            texts.push(row?);
        }
        Ok(texts)
    }

    fn report_medicine_ids(&self) -> StoreResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT medicine_id FROM adr_reports WHERE medicine_id IS NOT NULL ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    fn medicine_records(&self) -> StoreResult<Vec<MedicineRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, brand_name, generic_name FROM medicines ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(MedicineRecord {
                id: row.get(0)?,
                brand_name: row.get(1)?,
                generic_name: row.get(2)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}
