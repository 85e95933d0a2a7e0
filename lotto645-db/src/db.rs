use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::error::HistoryError;
use crate::models::{Draw, HistoryTable};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    round   INTEGER PRIMARY KEY,
    n1      INTEGER NOT NULL,
    n2      INTEGER NOT NULL,
    n3      INTEGER NOT NULL,
    n4      INTEGER NOT NULL,
    n5      INTEGER NOT NULL,
    n6      INTEGER NOT NULL,
    bonus   INTEGER NOT NULL
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotto645.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection, HistoryError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| HistoryError::unavailable(format!("{:?}", parent), e))?;
    }
    Connection::open(path).map_err(|e| HistoryError::unavailable(format!("{:?}", path), e))
}

pub fn migrate(conn: &Connection) -> Result<(), HistoryError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool, HistoryError> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (round, n1, n2, n3, n4, n5, n6, bonus)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            draw.round,
            draw.numbers[0],
            draw.numbers[1],
            draw.numbers[2],
            draw.numbers[3],
            draw.numbers[4],
            draw.numbers[5],
            draw.bonus,
        ],
    )?;
    Ok(changed > 0)
}

fn row_to_draw(row: &rusqlite::Row<'_>) -> rusqlite::Result<(u32, [u8; 6], u8)> {
    Ok((
        row.get(0)?,
        [
            row.get::<_, u8>(1)?,
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, u8>(4)?,
            row.get::<_, u8>(5)?,
            row.get::<_, u8>(6)?,
        ],
        row.get::<_, u8>(7)?,
    ))
}

fn collect_draws(raw: Vec<(u32, [u8; 6], u8)>) -> Result<Vec<Draw>, HistoryError> {
    raw.into_iter()
        .map(|(round, numbers, bonus)| {
            Draw::new(round, numbers, bonus)
                .map_err(|e| HistoryError::malformed(u64::from(round), e.to_string()))
        })
        .collect()
}

/// Tous les tirages, par tour croissant.
pub fn fetch_all(conn: &Connection) -> Result<HistoryTable, HistoryError> {
    let mut stmt = conn.prepare(
        "SELECT round, n1, n2, n3, n4, n5, n6, bonus FROM draws ORDER BY round ASC",
    )?;
    let raw = stmt.query_map([], row_to_draw)?.collect::<Result<Vec<_>, _>>()?;
    HistoryTable::new(collect_draws(raw)?)
}

/// Les `limit` derniers tirages, du plus récent au plus ancien.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>, HistoryError> {
    let mut stmt = conn.prepare(
        "SELECT round, n1, n2, n3, n4, n5, n6, bonus FROM draws ORDER BY round DESC LIMIT ?1",
    )?;
    let raw = stmt.query_map([limit], row_to_draw)?.collect::<Result<Vec<_>, _>>()?;
    collect_draws(raw)
}

/// Le tirage enregistré pour `round`, s'il existe.
pub fn fetch_draw(conn: &Connection, round: u32) -> Result<Option<Draw>, HistoryError> {
    let raw = conn
        .query_row(
            "SELECT round, n1, n2, n3, n4, n5, n6, bonus FROM draws WHERE round = ?1",
            [round],
            row_to_draw,
        )
        .optional()?;
    Ok(collect_draws(raw.into_iter().collect())?.pop())
}

pub fn count_draws(conn: &Connection) -> Result<u32, HistoryError> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}
