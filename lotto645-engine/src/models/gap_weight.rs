use lotto645_db::models::{HistoryTable, PICK_COUNT, POOL_SIZE};

/// Poids plancher : tout numéro reste tirable.
pub const WEIGHT_FLOOR: f64 = 0.1;

const SIZE: usize = POOL_SIZE as usize;

/// Poids d'écart par numéro : fréquence attendue moins fréquence observée,
/// jamais sous `WEIGHT_FLOOR`. Non normalisés.
#[derive(Debug, Clone, PartialEq)]
pub struct GapWeights {
    weights: [f64; SIZE],
    frequencies: [u32; SIZE],
    expected: f64,
}

impl GapWeights {
    pub fn build(history: &HistoryTable) -> Self {
        let mut frequencies = [0u32; SIZE];
        let mut total_slots = 0usize;
        for n in history.winning_numbers() {
            frequencies[(n - 1) as usize] += 1;
            total_slots += 1;
        }

        let total_draws = total_slots / PICK_COUNT;
        let expected = total_draws as f64 * (PICK_COUNT as f64 / POOL_SIZE as f64);

        let mut weights = [WEIGHT_FLOOR; SIZE];
        for (w, &freq) in weights.iter_mut().zip(frequencies.iter()) {
            *w = (expected - freq as f64).max(WEIGHT_FLOOR);
        }

        Self { weights, frequencies, expected }
    }

    /// Poids du numéro `number` (1-45) ; `WEIGHT_FLOOR` hors limites.
    pub fn weight(&self, number: u8) -> f64 {
        match number {
            1..=POOL_SIZE => self.weights[(number - 1) as usize],
            _ => WEIGHT_FLOOR,
        }
    }

    pub fn frequency(&self, number: u8) -> u32 {
        match number {
            1..=POOL_SIZE => self.frequencies[(number - 1) as usize],
            _ => 0,
        }
    }

    pub fn expected(&self) -> f64 {
        self.expected
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }
}
