//! Responsable operations

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::{NewResponsable, Responsable};
use crate::store::ResponsableStore;

fn row_to_responsable(row: &rusqlite::Row<'_>) -> rusqlite::Result<Responsable> {
    Ok(Responsable {
        id: row.get(0)?,
        nom: row.get(1)?,
        prenom: row.get(2)?,
    })
}

impl ResponsableStore for Database {
    fn list_responsables(&self) -> Result<Vec<Responsable>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, nom, prenom FROM responsables ORDER BY id")?;
        let responsables = stmt
            .query_map([], row_to_responsable)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(responsables)
    }

    fn get_responsable(&self, id: i64) -> Result<Option<Responsable>> {
        let conn = self.conn()?;
        let responsable = conn
            .query_row(
                "SELECT id, nom, prenom FROM responsables WHERE id = ?",
                params![id],
                row_to_responsable,
            )
            .optional()?;
        Ok(responsable)
    }

    fn create_responsable(&self, responsable: &NewResponsable) -> Result<i64> {
        responsable.validate()?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO responsables (nom, prenom) VALUES (?, ?)",
            params![responsable.nom, responsable.prenom],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_responsable(&self, id: i64, responsable: &NewResponsable) -> Result<bool> {
        responsable.validate()?;
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE responsables SET nom = ?, prenom = ? WHERE id = ?",
            params![responsable.nom, responsable.prenom, id],
        )?;
        Ok(updated > 0)
    }

    /// Centres owned by the responsable keep existing with no owner
    fn delete_responsable(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM responsables WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
