use std::path::{Path, PathBuf};
use std::sync::RwLock;

use rusqlite::Connection;
use tracing::debug;

use crate::csv_store::CsvStore;
use crate::db::{fetch_all, insert_draw, migrate, open_db};
use crate::error::HistoryError;
use crate::models::{Draw, HistoryTable};

/// Source de l'historique : lecture ordonnée de tous les tirages et ajout
/// d'un tirage, refusé si le tour existe déjà.
pub trait DrawStore {
    fn load(&self) -> Result<HistoryTable, HistoryError>;
    fn append(&self, draw: &Draw) -> Result<(), HistoryError>;
    fn describe(&self) -> String;
}

impl<T: DrawStore + ?Sized> DrawStore for Box<T> {
    fn load(&self) -> Result<HistoryTable, HistoryError> {
        (**self).load()
    }

    fn append(&self, draw: &Draw) -> Result<(), HistoryError> {
        (**self).append(draw)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Historique gardé en mémoire, pour les tests et l'intégration dans un hôte
/// qui possède déjà ses tirages.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<HistoryTable>,
}

impl MemoryStore {
    pub fn new(table: HistoryTable) -> Self {
        Self { table: RwLock::new(table) }
    }
}

impl DrawStore for MemoryStore {
    fn load(&self) -> Result<HistoryTable, HistoryError> {
        self.table
            .read()
            .map(|t| t.clone())
            .map_err(|e| HistoryError::unavailable("mémoire", e))
    }

    fn append(&self, draw: &Draw) -> Result<(), HistoryError> {
        let mut table = self
            .table
            .write()
            .map_err(|e| HistoryError::unavailable("mémoire", e))?;
        table.push(*draw)
    }

    fn describe(&self) -> String {
        "mémoire".to_string()
    }
}

pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        let conn = open_db(path)?;
        migrate(&conn)?;
        Ok(Self { conn, path: Some(path.to_path_buf()) })
    }

    pub fn in_memory() -> Result<Self, HistoryError> {
        let conn = Connection::open_in_memory()?;
        migrate(&conn)?;
        Ok(Self { conn, path: None })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl DrawStore for SqliteStore {
    fn load(&self) -> Result<HistoryTable, HistoryError> {
        fetch_all(&self.conn)
    }

    fn append(&self, draw: &Draw) -> Result<(), HistoryError> {
        if insert_draw(&self.conn, draw)? {
            debug!(round = draw.round, "tirage inséré en base");
            Ok(())
        } else {
            Err(HistoryError::DuplicateRound(draw.round))
        }
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(p) => format!("SQLite {}", p.display()),
            None => "SQLite (mémoire)".to_string(),
        }
    }
}

/// Ouvre le stockage adapté à l'extension : `.csv` pour un fichier CSV,
/// une base SQLite sinon.
pub fn open_store(path: &Path) -> Result<Box<dyn DrawStore>, HistoryError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        Ok(Box::new(CsvStore::new(path)))
    } else {
        Ok(Box::new(SqliteStore::open(path)?))
    }
}
