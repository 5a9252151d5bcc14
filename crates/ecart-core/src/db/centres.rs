//! Centre operations

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Centre, NewCentre};
use crate::store::{CentreStore, ResponsableStore};

fn row_to_centre(row: &rusqlite::Row<'_>) -> rusqlite::Result<Centre> {
    Ok(Centre {
        id: row.get(0)?,
        name: row.get(1)?,
        responsable_id: row.get(2)?,
    })
}

impl Database {
    fn check_responsable_exists(&self, responsable_id: i64) -> Result<()> {
        if self.get_responsable(responsable_id)?.is_none() {
            return Err(Error::NotFound(format!(
                "Responsable {} not found",
                responsable_id
            )));
        }
        Ok(())
    }
}

impl CentreStore for Database {
    fn list_centres(&self) -> Result<Vec<Centre>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, responsable_id FROM centres ORDER BY id")?;
        let centres = stmt
            .query_map([], row_to_centre)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(centres)
    }

    fn get_centre(&self, id: i64) -> Result<Option<Centre>> {
        let conn = self.conn()?;
        let centre = conn
            .query_row(
                "SELECT id, name, responsable_id FROM centres WHERE id = ?",
                params![id],
                row_to_centre,
            )
            .optional()?;
        Ok(centre)
    }

    fn create_centre(&self, centre: &NewCentre) -> Result<i64> {
        centre.validate()?;
        self.check_responsable_exists(centre.responsable_id)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO centres (name, responsable_id) VALUES (?, ?)",
            params![centre.name, centre.responsable_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_centre(&self, id: i64, centre: &NewCentre) -> Result<bool> {
        centre.validate()?;
        self.check_responsable_exists(centre.responsable_id)?;

        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE centres SET name = ?, responsable_id = ? WHERE id = ?",
            params![centre.name, centre.responsable_id, id],
        )?;
        Ok(updated > 0)
    }

    fn delete_centre(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM centres WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    fn find_centre_by_name(&self, name: &str) -> Result<Option<Centre>> {
        let conn = self.conn()?;
        let centre = conn
            .query_row(
                "SELECT id, name, responsable_id FROM centres WHERE name = ? ORDER BY id LIMIT 1",
                params![name],
                row_to_centre,
            )
            .optional()?;
        Ok(centre)
    }
}
