pub mod exposure_rank;
pub mod gap_weight;

use lotto645_db::models::HistoryTable;

use crate::config::{EngineConfig, Strategy};
use exposure_rank::ExposureRanks;
use gap_weight::GapWeights;

#[derive(Debug, Clone, PartialEq)]
pub enum SignalModel {
    GapWeight(GapWeights),
    ExposureRank(ExposureRanks),
}

/// État du signal figé à un instant donné : reconstruit en entier à chaque
/// rafraîchissement, jamais modifié ensuite.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSnapshot {
    pub draw_count: usize,
    pub last_round: Option<u32>,
    pub model: SignalModel,
}

impl SignalSnapshot {
    pub fn build(strategy: Strategy, history: &HistoryTable, config: &EngineConfig) -> Self {
        let model = match strategy {
            Strategy::GapWeight => SignalModel::GapWeight(GapWeights::build(history)),
            Strategy::ExposureRank => SignalModel::ExposureRank(ExposureRanks::build(
                history,
                config.pattern_window,
                config.pattern_pool_cap,
            )),
        };
        Self {
            draw_count: history.len(),
            last_round: history.last_round(),
            model,
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self.model {
            SignalModel::GapWeight(_) => Strategy::GapWeight,
            SignalModel::ExposureRank(_) => Strategy::ExposureRank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotto645_db::models::make_test_history;

    #[test]
    fn test_snapshot_strategy_matches() {
        let history = make_test_history(20);
        let config = EngineConfig::default();
        let gap = SignalSnapshot::build(Strategy::GapWeight, &history, &config);
        let rank = SignalSnapshot::build(Strategy::ExposureRank, &history, &config);
        assert_eq!(gap.strategy(), Strategy::GapWeight);
        assert_eq!(rank.strategy(), Strategy::ExposureRank);
        assert_eq!(gap.draw_count, 20);
        assert_eq!(rank.last_round, Some(20));
    }

    #[test]
    fn test_snapshot_respects_pattern_config() {
        let history = make_test_history(150);
        let config = EngineConfig { pattern_window: 10, pattern_pool_cap: 3, ..EngineConfig::default() };
        let snapshot = SignalSnapshot::build(Strategy::ExposureRank, &history, &config);
        match snapshot.model {
            SignalModel::ExposureRank(ranks) => {
                assert!(ranks.frequent_patterns().len() <= 3);
                let total: u32 = ranks.frequent_patterns().iter().map(|(_, c)| c).sum();
                assert!(total <= 10);
            }
            other => panic!("modèle inattendu : {other:?}"),
        }
    }
}
