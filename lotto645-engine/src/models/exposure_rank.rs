use std::collections::HashMap;

use lotto645_db::models::{HistoryTable, PICK_COUNT, POOL_SIZE};

const SIZE: usize = POOL_SIZE as usize;

/// Rangs (triés) occupés par les numéros gagnants d'un tour, calculés sur
/// les tours strictement antérieurs.
pub type RankPattern = [u8; PICK_COUNT];

/// Classement des numéros par fréquence cumulée (1 = le plus sorti, égalités
/// départagées par valeur croissante) et historique des motifs de rangs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposureRanks {
    counts: [u32; SIZE],
    rank_of: [u8; SIZE],
    number_at: [u8; SIZE],
    rank_history: Vec<RankPattern>,
    frequent_patterns: Vec<(RankPattern, u32)>,
}

/// Retourne (numéro → rang, rang → numéro) pour des fréquences données.
fn rank_table(counts: &[u32; SIZE]) -> ([u8; SIZE], [u8; SIZE]) {
    let mut order: Vec<u8> = (1..=POOL_SIZE).collect();
    order.sort_by(|&a, &b| {
        counts[(b - 1) as usize]
            .cmp(&counts[(a - 1) as usize])
            .then(a.cmp(&b))
    });

    let mut rank_of = [0u8; SIZE];
    let mut number_at = [0u8; SIZE];
    for (pos, &n) in order.iter().enumerate() {
        rank_of[(n - 1) as usize] = (pos + 1) as u8;
        number_at[pos] = n;
    }
    (rank_of, number_at)
}

impl ExposureRanks {
    pub fn build(history: &HistoryTable, pattern_window: usize, pool_cap: usize) -> Self {
        let mut counts = [0u32; SIZE];
        let mut rank_history = Vec::with_capacity(history.len());

        for draw in history.draws() {
            // Rangs d'avant le tour : le tirage courant n'influence pas sa propre lecture.
            let (rank_of, _) = rank_table(&counts);
            let mut pattern = draw.numbers.map(|n| rank_of[(n - 1) as usize]);
            pattern.sort_unstable();
            rank_history.push(pattern);

            for &n in &draw.numbers {
                counts[(n - 1) as usize] += 1;
            }
        }

        let (rank_of, number_at) = rank_table(&counts);
        let frequent_patterns = frequent_patterns(&rank_history, pattern_window, pool_cap);

        Self {
            counts,
            rank_of,
            number_at,
            rank_history,
            frequent_patterns,
        }
    }

    pub fn rank_of(&self, number: u8) -> Option<u8> {
        match number {
            1..=POOL_SIZE => Some(self.rank_of[(number - 1) as usize]),
            _ => None,
        }
    }

    pub fn number_at(&self, rank: u8) -> Option<u8> {
        match rank {
            1..=POOL_SIZE => Some(self.number_at[(rank - 1) as usize]),
            _ => None,
        }
    }

    pub fn frequency(&self, number: u8) -> u32 {
        match number {
            1..=POOL_SIZE => self.counts[(number - 1) as usize],
            _ => 0,
        }
    }

    pub fn rank_history(&self) -> &[RankPattern] {
        &self.rank_history
    }

    /// Motifs du pool, du plus fréquent au moins fréquent.
    pub fn frequent_patterns(&self) -> &[(RankPattern, u32)] {
        &self.frequent_patterns
    }

    /// Traduit un motif de rangs en numéros selon le classement actuel.
    pub fn translate(&self, pattern: &RankPattern) -> Option<[u8; PICK_COUNT]> {
        let mut numbers = [0u8; PICK_COUNT];
        for (slot, &rank) in numbers.iter_mut().zip(pattern.iter()) {
            *slot = self.number_at(rank)?;
        }
        numbers.sort_unstable();
        Some(numbers)
    }
}

/// Compte les motifs des `window` derniers tours ; tri par occurrences
/// décroissantes, égalités dans l'ordre de première apparition.
fn frequent_patterns(history: &[RankPattern], window: usize, cap: usize) -> Vec<(RankPattern, u32)> {
    let start = history.len().saturating_sub(window);
    let mut index: HashMap<RankPattern, usize> = HashMap::new();
    let mut tally: Vec<(RankPattern, u32)> = Vec::new();

    for pattern in &history[start..] {
        match index.get(pattern) {
            Some(&i) => tally[i].1 += 1,
            None => {
                index.insert(*pattern, tally.len());
                tally.push((*pattern, 1));
            }
        }
    }

    // sort_by est stable : l'ordre d'apparition départage les égalités.
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally.truncate(cap);
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotto645_db::models::{make_test_history, Draw};

    fn history(rows: &[[u8; 6]]) -> HistoryTable {
        let draws = rows
            .iter()
            .enumerate()
            .map(|(i, nums)| {
                let bonus = (1..=45).find(|b| !nums.contains(b)).unwrap();
                Draw::new((i + 1) as u32, *nums, bonus).unwrap()
            })
            .collect();
        HistoryTable::new(draws).unwrap()
    }

    fn assert_bijection(ranks: &ExposureRanks) {
        let mut seen = [false; 45];
        for n in 1..=45u8 {
            let r = ranks.rank_of(n).unwrap();
            assert!((1..=45).contains(&r));
            assert!(!seen[(r - 1) as usize], "rang {r} attribué deux fois");
            seen[(r - 1) as usize] = true;
            assert_eq!(ranks.number_at(r), Some(n));
        }
    }

    #[test]
    fn test_empty_history_ranks_by_value() {
        let ranks = ExposureRanks::build(&HistoryTable::default(), 100, 200);
        for n in 1..=45u8 {
            assert_eq!(ranks.rank_of(n), Some(n));
        }
        assert!(ranks.rank_history().is_empty());
        assert!(ranks.frequent_patterns().is_empty());
    }

    #[test]
    fn test_first_round_uses_empty_prior() {
        let ranks = ExposureRanks::build(&history(&[[5, 10, 15, 20, 25, 30]]), 100, 200);
        // Sans historique, rang = valeur.
        assert_eq!(ranks.rank_history()[0], [5, 10, 15, 20, 25, 30]);
        // Après le tour, les 6 numéros sortis prennent les rangs 1 à 6.
        assert_eq!(ranks.rank_of(5), Some(1));
        assert_eq!(ranks.rank_of(30), Some(6));
        assert_eq!(ranks.rank_of(1), Some(7));
        assert_bijection(&ranks);
    }

    #[test]
    fn test_rank_excludes_current_round() {
        let ranks = ExposureRanks::build(
            &history(&[[5, 10, 15, 20, 25, 30], [5, 10, 15, 20, 25, 30]]),
            100,
            200,
        );
        assert_eq!(ranks.rank_history()[1], [1, 2, 3, 4, 5, 6]);
        assert_eq!(ranks.frequency(5), 2);
    }

    #[test]
    fn test_tie_broken_by_value() {
        let ranks = ExposureRanks::build(
            &history(&[[40, 41, 42, 43, 44, 45], [1, 2, 3, 40, 41, 42]]),
            100,
            200,
        );
        // 40, 41, 42 : 2 fois ; 1, 2, 3, 43, 44, 45 : 1 fois
        assert_eq!(ranks.number_at(1), Some(40));
        assert_eq!(ranks.number_at(3), Some(42));
        assert_eq!(ranks.number_at(4), Some(1));
        assert_eq!(ranks.number_at(7), Some(43));
        assert_eq!(ranks.number_at(10), Some(4));
        // Tour 2 : 1,2,3 avaient les rangs 7,8,9 ; 40,41,42 les rangs 1,2,3.
        assert_eq!(ranks.rank_history()[1], [1, 2, 3, 7, 8, 9]);
    }

    #[test]
    fn test_bijection_on_long_history() {
        let ranks = ExposureRanks::build(&make_test_history(300), 100, 200);
        assert_bijection(&ranks);
        assert_eq!(ranks.rank_history().len(), 300);
    }

    #[test]
    fn test_frequent_patterns_order_and_window() {
        let a = [1, 2, 3, 4, 5, 6];
        let b = [7, 8, 9, 10, 11, 12];
        let c = [13, 14, 15, 16, 17, 18];
        let patterns = vec![c, c, c, a, b, b, a];
        // Fenêtre de 4 : a, b, b, a → a et b à égalité, a vu en premier.
        let top = frequent_patterns(&patterns, 4, 200);
        assert_eq!(top, vec![(a, 2), (b, 2)]);
        let top = frequent_patterns(&patterns, 100, 200);
        assert_eq!(top[0], (c, 3));
        assert_eq!(top.len(), 3);
        let top = frequent_patterns(&patterns, 100, 1);
        assert_eq!(top, vec![(c, 3)]);
    }

    #[test]
    fn test_translate_round_trip() {
        let ranks = ExposureRanks::build(&make_test_history(120), 100, 200);
        let draw = [3u8, 9, 17, 28, 35, 44];
        let mut pattern = draw.map(|n| ranks.rank_of(n).unwrap());
        pattern.sort_unstable();
        assert_eq!(ranks.translate(&pattern), Some(draw));
        assert_eq!(ranks.translate(&[0, 1, 2, 3, 4, 5]), None);
    }

    #[test]
    fn test_build_idempotent() {
        let history = make_test_history(150);
        assert_eq!(
            ExposureRanks::build(&history, 100, 200),
            ExposureRanks::build(&history, 100, 200)
        );
    }
}
