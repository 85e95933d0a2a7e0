use anyhow::{Context, Result};
use lotto645_db::rusqlite::Connection;
use std::path::Path;
use tracing::warn;

use lotto645_db::csv_store::read_draws_lenient;
use lotto645_db::db::{fetch_draw, insert_draw};

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    /// Tours déjà en base avec d'autres numéros : la base est conservée.
    pub conflicts: u32,
}

/// Importe un CSV d'historique dans la base. Une ligne invalide annule tout
/// l'import : rien n'est écrit.
pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let draws = read_draws_lenient(path)
        .with_context(|| format!("Impossible d'importer {:?}", path))?;

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        conflicts: 0,
    };

    for draw in &draws {
        result.total_records += 1;
        if insert_draw(&tx, draw).with_context(|| format!("Erreur insertion tirage {}", draw.round))? {
            result.inserted += 1;
        } else {
            result.skipped += 1;
            if let Some(stored) = fetch_draw(&tx, draw.round)?.filter(|stored| stored != draw) {
                warn!(
                    round = draw.round,
                    stored = ?stored.numbers,
                    csv = ?draw.numbers,
                    "tirage en conflit avec la base, version enregistrée conservée"
                );
                result.conflicts += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotto645_db::db::{count_draws, migrate};
    use lotto645_db::models::Draw;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_import_counts_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("number.csv");
        std::fs::write(&path, "회차,1,2,3,4,5,6,보너스\n1,10,23,29,33,37,40,16\n2,9,13,21,25,32,42,2\n").unwrap();

        let conn = memory_db();
        let first = import_csv(&conn, &path).unwrap();
        assert_eq!(first.total_records, 2);
        assert_eq!(first.inserted, 2);

        let second = import_csv(&conn, &path).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(count_draws(&conn).unwrap(), 2);
    }

    #[test]
    fn test_import_reports_conflicting_round() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("number.csv");
        std::fs::write(&path, "1,10,23,29,33,37,40,16\n2,9,13,21,25,32,42,2\n").unwrap();

        let conn = memory_db();
        insert_draw(&conn, &Draw::new(2, [1, 2, 3, 4, 5, 6], 7).unwrap()).unwrap();

        let result = import_csv(&conn, &path).unwrap();
        assert_eq!(result.inserted, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.conflicts, 1);
        assert_eq!(fetch_draw(&conn, 2).unwrap().unwrap().numbers, [1, 2, 3, 4, 5, 6]);

        let again = import_csv(&conn, &path).unwrap();
        assert_eq!(again.skipped, 2);
        assert_eq!(again.conflicts, 1);
    }

    #[test]
    fn test_import_malformed_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("number.csv");
        std::fs::write(&path, "1,10,23,29,33,37,40,16\n2,9,13,x,25,32,42,2\n").unwrap();

        let conn = memory_db();
        assert!(import_csv(&conn, &path).is_err());
        assert_eq!(count_draws(&conn).unwrap(), 0);
    }
}
