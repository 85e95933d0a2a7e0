use lotto645_db::error::HistoryError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    History(#[from] HistoryError),
    /// Numéros fixés ou exclus incompatibles, rejetés avant tout tirage.
    #[error("Contraintes impossibles : {0}")]
    ConstraintInfeasible(String),
    #[error("Échantillonnage impossible : {0}")]
    Sampling(String),
    #[error("Configuration invalide : {0}")]
    Config(String),
}
