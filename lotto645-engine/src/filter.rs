//! Filtres structurels appliqués à chaque grille candidate.
//!
//! Chaque règle est un prédicat pur sur une grille triée ; une grille n'est
//! retenue que si toutes les règles du jeu de filtres passent, dans
//! n'importe quel ordre.

use std::collections::HashSet;

use lotto645_db::models::{PICK_COUNT, POOL_SIZE};

/// Grille de 6 numéros distincts, triés, dans 1..=45.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    numbers: [u8; PICK_COUNT],
    sum: u32,
    odd: usize,
}

impl Candidate {
    pub fn new(mut numbers: [u8; PICK_COUNT]) -> Option<Self> {
        numbers.sort_unstable();
        if numbers.iter().any(|&n| n < 1 || n > POOL_SIZE) {
            return None;
        }
        if numbers.windows(2).any(|w| w[0] == w[1]) {
            return None;
        }
        let sum = numbers.iter().map(|&n| n as u32).sum();
        let odd = numbers.iter().filter(|&&n| n % 2 == 1).count();
        Some(Self { numbers, sum, odd })
    }

    /// `None` si la tranche ne contient pas exactement 6 numéros valides.
    pub fn from_slice(numbers: &[u8]) -> Option<Self> {
        let arr: [u8; PICK_COUNT] = numbers.try_into().ok()?;
        Self::new(arr)
    }

    pub fn numbers(&self) -> &[u8; PICK_COUNT] {
        &self.numbers
    }

    pub fn sum(&self) -> u32 {
        self.sum
    }

    pub fn odd_count(&self) -> usize {
        self.odd
    }

    pub fn even_count(&self) -> usize {
        PICK_COUNT - self.odd
    }

    /// Format "impairs:pairs", ex. "3:3".
    pub fn odd_even(&self) -> String {
        format!("{}:{}", self.odd_count(), self.even_count())
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.binary_search(&number).is_ok()
    }
}

/// Tranche de 7 numéros : 1-7 → 1, 8-14 → 2, ..., 43-45 → 7.
pub fn band_of(number: u8) -> u8 {
    (number - 1) / 7 + 1
}

/// Indice AC : nombre d'écarts positifs distincts entre paires, moins 5.
pub fn ac_index(numbers: &[u8; PICK_COUNT]) -> usize {
    let mut diffs = HashSet::new();
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            let d = numbers[i].abs_diff(numbers[j]);
            if d > 0 {
                diffs.insert(d);
            }
        }
    }
    diffs.len().saturating_sub(PICK_COUNT - 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterLimits {
    pub sum_min: u32,
    pub sum_max: u32,
    pub max_per_band: usize,
    pub min_ac_index: usize,
    pub max_same_last_digit: usize,
}

impl Default for FilterLimits {
    fn default() -> Self {
        Self {
            sum_min: 90,
            sum_max: 190,
            max_per_band: 3,
            min_ac_index: 7,
            max_same_last_digit: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRule {
    SumRange,
    OddEvenBalance,
    BandCluster,
    AcIndex,
    TripleRun,
    LastDigitCluster,
}

impl FilterRule {
    pub fn passes(&self, candidate: &Candidate, limits: &FilterLimits) -> bool {
        let numbers = candidate.numbers();
        match self {
            FilterRule::SumRange => (limits.sum_min..=limits.sum_max).contains(&candidate.sum()),
            FilterRule::OddEvenBalance => candidate.odd_count() != 0 && candidate.odd_count() != PICK_COUNT,
            FilterRule::BandCluster => {
                let mut bands = [0usize; 8];
                for &n in numbers {
                    bands[band_of(n) as usize] += 1;
                }
                bands.iter().all(|&c| c <= limits.max_per_band)
            }
            FilterRule::AcIndex => ac_index(numbers) >= limits.min_ac_index,
            FilterRule::TripleRun => !numbers
                .iter()
                .any(|&n| candidate.contains(n + 1) && candidate.contains(n + 2)),
            FilterRule::LastDigitCluster => {
                let mut digits = [0usize; 10];
                for &n in numbers {
                    digits[(n % 10) as usize] += 1;
                }
                digits.iter().all(|&c| c <= limits.max_same_last_digit)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterRule::SumRange => "Somme",
            FilterRule::OddEvenBalance => "Impairs/pairs",
            FilterRule::BandCluster => "Tranches de 7",
            FilterRule::AcIndex => "Indice AC",
            FilterRule::TripleRun => "Suite de 3",
            FilterRule::LastDigitCluster => "Dernier chiffre",
        }
    }
}

impl std::fmt::Display for FilterRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FilterPreset {
    /// Somme, impairs/pairs, tranches de 7.
    #[default]
    Base,
    /// Somme, impairs/pairs, indice AC, suites de 3, dernier chiffre.
    Extended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    rules: Vec<FilterRule>,
    limits: FilterLimits,
}

impl FilterSet {
    pub fn base(limits: FilterLimits) -> Self {
        Self {
            rules: vec![FilterRule::SumRange, FilterRule::OddEvenBalance, FilterRule::BandCluster],
            limits,
        }
    }

    /// Jeu étendu : remplace les tranches par l'indice AC, les suites et les derniers chiffres.
    pub fn extended(limits: FilterLimits) -> Self {
        Self {
            rules: vec![
                FilterRule::SumRange,
                FilterRule::OddEvenBalance,
                FilterRule::AcIndex,
                FilterRule::TripleRun,
                FilterRule::LastDigitCluster,
            ],
            limits,
        }
    }

    pub fn from_preset(preset: FilterPreset, limits: FilterLimits) -> Self {
        match preset {
            FilterPreset::Base => Self::base(limits),
            FilterPreset::Extended => Self::extended(limits),
        }
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    pub fn accepts(&self, candidate: &Candidate) -> bool {
        self.rules.iter().all(|r| r.passes(candidate, &self.limits))
    }

    pub fn first_failure(&self, candidate: &Candidate) -> Option<FilterRule> {
        self.rules.iter().copied().find(|r| !r.passes(candidate, &self.limits))
    }

    pub fn evaluate(&self, candidate: &Candidate) -> Vec<(FilterRule, bool)> {
        self.rules
            .iter()
            .map(|&r| (r, r.passes(candidate, &self.limits)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(numbers: [u8; 6]) -> Candidate {
        Candidate::new(numbers).unwrap()
    }

    #[test]
    fn test_candidate_sorted_and_derived() {
        let c = cand([30, 1, 20, 3, 10, 2]);
        assert_eq!(c.numbers(), &[1, 2, 3, 10, 20, 30]);
        assert_eq!(c.sum(), 66);
        assert_eq!(c.odd_count(), 2);
        assert_eq!(c.odd_even(), "2:4");
    }

    #[test]
    fn test_candidate_rejects_invalid() {
        assert!(Candidate::new([1, 1, 2, 3, 4, 5]).is_none());
        assert!(Candidate::new([0, 1, 2, 3, 4, 5]).is_none());
        assert!(Candidate::new([1, 2, 3, 4, 5, 46]).is_none());
        assert!(Candidate::from_slice(&[1, 2, 3, 4, 5]).is_none());
        assert!(Candidate::from_slice(&[1, 2, 3, 4, 5, 6]).is_some());
    }

    #[test]
    fn test_band_of() {
        assert_eq!(band_of(1), 1);
        assert_eq!(band_of(7), 1);
        assert_eq!(band_of(8), 2);
        assert_eq!(band_of(42), 6);
        assert_eq!(band_of(43), 7);
        assert_eq!(band_of(45), 7);
    }

    #[test]
    fn test_sum_rule() {
        let base = FilterSet::base(FilterLimits::default());
        let c = cand([1, 2, 3, 10, 20, 30]);
        assert_eq!(c.sum(), 66);
        assert_eq!(base.first_failure(&c), Some(FilterRule::SumRange));
        assert!(!base.accepts(&c));
    }

    #[test]
    fn test_all_even_rejected() {
        let base = FilterSet::base(FilterLimits::default());
        let c = cand([2, 4, 6, 8, 10, 12]);
        assert!(!FilterRule::OddEvenBalance.passes(&c, &FilterLimits::default()));
        assert!(!base.accepts(&c));

        // Somme valide, toujours refusée.
        let c = cand([12, 18, 24, 30, 36, 40]);
        assert!(FilterRule::SumRange.passes(&c, &FilterLimits::default()));
        assert!(!base.accepts(&c));
    }

    #[test]
    fn test_all_odd_rejected() {
        let c = cand([11, 17, 23, 29, 35, 41]);
        assert!(!FilterRule::OddEvenBalance.passes(&c, &FilterLimits::default()));
    }

    #[test]
    fn test_band_cluster() {
        let limits = FilterLimits::default();
        // 15, 16, 18, 21 dans la tranche 3
        let c = cand([15, 16, 18, 21, 30, 40]);
        assert!(!FilterRule::BandCluster.passes(&c, &limits));
        let c = cand([15, 16, 18, 25, 30, 40]);
        assert!(FilterRule::BandCluster.passes(&c, &limits));
    }

    #[test]
    fn test_base_accepts_balanced() {
        let base = FilterSet::base(FilterLimits::default());
        let c = cand([3, 11, 19, 24, 33, 41]);
        assert_eq!(c.sum(), 131);
        assert!(base.accepts(&c));
    }

    #[test]
    fn test_ac_index() {
        assert_eq!(ac_index(&[1, 2, 3, 4, 5, 6]), 0);
        // écarts : 1,3,7,12,20,2,6,11,19,4,9,17,5,13,8 → 15 distincts
        assert_eq!(ac_index(&[1, 2, 4, 8, 13, 21]), 10);
    }

    #[test]
    fn test_triple_run() {
        let limits = FilterLimits::default();
        assert!(!FilterRule::TripleRun.passes(&cand([5, 6, 7, 20, 31, 44]), &limits));
        assert!(FilterRule::TripleRun.passes(&cand([5, 6, 8, 20, 31, 44]), &limits));
    }

    #[test]
    fn test_last_digit_cluster() {
        let limits = FilterLimits::default();
        assert!(!FilterRule::LastDigitCluster.passes(&cand([3, 13, 23, 30, 38, 44]), &limits));
        assert!(FilterRule::LastDigitCluster.passes(&cand([3, 13, 24, 30, 38, 45]), &limits));
    }

    #[test]
    fn test_extended_set() {
        let ext = FilterSet::extended(FilterLimits::default());
        assert!(!ext.rules().contains(&FilterRule::BandCluster));
        // 4 numéros dans la tranche 3 : refusé en base, accepté en étendu.
        let c = cand([2, 15, 17, 19, 21, 37]);
        assert!(!FilterSet::base(FilterLimits::default()).accepts(&c));
        assert!(ac_index(c.numbers()) >= 7, "ac = {}", ac_index(c.numbers()));
        assert!(ext.accepts(&c), "{:?}", ext.evaluate(&c));
    }

    #[test]
    fn test_evaluate_reports_every_rule() {
        let ext = FilterSet::from_preset(FilterPreset::Extended, FilterLimits::default());
        let report = ext.evaluate(&cand([2, 4, 6, 8, 10, 12]));
        assert_eq!(report.len(), 5);
        assert!(report.iter().any(|(r, ok)| *r == FilterRule::OddEvenBalance && !ok));
    }
}
