/// Erreurs de lecture et d'écriture de l'historique.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Source absente ou illisible.
    #[error("Historique indisponible ({source_name}) : {reason}")]
    DataUnavailable { source_name: String, reason: String },
    /// Ligne impossible à convertir en tirage.
    #[error("Ligne {line} invalide : {reason}")]
    DataMalformed { line: u64, reason: String },
    #[error("Tirage invalide : {0}")]
    InvalidDraw(String),
    #[error("Le tirage {0} existe déjà")]
    DuplicateRound(u32),
    #[error("Erreur SQLite : {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Erreur CSV : {0}")]
    Csv(#[from] csv::Error),
    #[error("Erreur d'entrée/sortie : {0}")]
    Io(#[from] std::io::Error),
}

impl HistoryError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        HistoryError::DataUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(line: u64, reason: impl Into<String>) -> Self {
        HistoryError::DataMalformed {
            line,
            reason: reason.into(),
        }
    }
}
