use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::filter::FilterLimits;

/// Signal utilisé pour générer les grilles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Strategy {
    /// Poids d'écart : les numéros en retard sur leur fréquence attendue pèsent plus.
    #[default]
    #[value(name = "gap")]
    #[serde(rename = "gap")]
    GapWeight,
    /// Rejoue les motifs de rangs de fréquence observés récemment.
    #[value(name = "rank")]
    #[serde(rename = "rank")]
    ExposureRank,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::GapWeight => write!(f, "gap"),
            Strategy::ExposureRank => write!(f, "rank"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tentatives par grille en mode poids d'écart.
    pub gap_retry_budget: usize,
    /// Tentatives par grille pour le tirage uniforme de secours.
    pub fallback_attempt_cap: usize,
    /// Nombre de tours récents pris en compte pour les motifs fréquents.
    pub pattern_window: usize,
    pub pattern_pool_cap: usize,
    /// Motifs les plus fréquents mélangés avant le parcours.
    pub shuffle_top: usize,
    pub sum_min: u32,
    pub sum_max: u32,
    pub max_per_band: usize,
    pub min_ac_index: usize,
    pub max_same_last_digit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gap_retry_budget: 5000,
            fallback_attempt_cap: 1_000_000,
            pattern_window: 100,
            pattern_pool_cap: 200,
            shuffle_top: 50,
            sum_min: 90,
            sum_max: 190,
            max_per_band: 3,
            min_ac_index: 7,
            max_same_last_digit: 2,
        }
    }
}

impl EngineConfig {
    pub fn filter_limits(&self) -> FilterLimits {
        FilterLimits {
            sum_min: self.sum_min,
            sum_max: self.sum_max,
            max_per_band: self.max_per_band,
            min_ac_index: self.min_ac_index,
            max_same_last_digit: self.max_same_last_digit,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.sum_min > self.sum_max {
            return Err(EngineError::Config(format!(
                "sum_min ({}) supérieur à sum_max ({})",
                self.sum_min, self.sum_max
            )));
        }
        if self.gap_retry_budget == 0 || self.fallback_attempt_cap == 0 {
            return Err(EngineError::Config("les budgets de tentatives doivent être positifs".to_string()));
        }
        if self.pattern_window == 0 || self.pattern_pool_cap == 0 {
            return Err(EngineError::Config("pattern_window et pattern_pool_cap doivent être positifs".to_string()));
        }
        Ok(())
    }
}

pub fn save_config(config: &EngineConfig, path: &Path) -> Result<(), EngineError> {
    let json = serde_json::to_string_pretty(config).map_err(|e| EngineError::Config(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| EngineError::Config(format!("{:?} : {}", path, e)))?;
    Ok(())
}

pub fn load_config(path: &Path) -> Result<EngineConfig, EngineError> {
    let json = std::fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{:?} : {}", path, e)))?;
    let config: EngineConfig = serde_json::from_str(&json).map_err(|e| EngineError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
