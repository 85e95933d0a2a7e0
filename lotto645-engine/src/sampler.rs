use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use lotto645_db::models::{PICK_COUNT, POOL_SIZE};

use crate::error::EngineError;
use crate::filter::Candidate;
use crate::models::exposure_rank::RankPattern;

/// Générateur reproductible si `seed` est fourni, aléatoire sinon.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Tirage pondéré sans remise : chaque numéro choisi sort du pool.
/// Rend moins de `count` numéros si le pool s'épuise.
pub fn sample_without_replacement<R: Rng + ?Sized>(
    pool: &[(u8, f64)],
    count: usize,
    rng: &mut R,
) -> Result<Vec<u8>, EngineError> {
    let mut available: Vec<(u8, f64)> = pool.to_vec();
    let mut selected = Vec::with_capacity(count);

    while selected.len() < count && !available.is_empty() {
        let weights: Vec<f64> = available.iter().map(|(_, w)| *w).collect();
        let dist = WeightedIndex::new(&weights).map_err(|e| EngineError::Sampling(e.to_string()))?;
        let idx = dist.sample(rng);

        let (number, _) = available.remove(idx);
        selected.push(number);
    }

    Ok(selected)
}

/// Ordre de parcours des motifs : les `shuffle_top` premiers mélangés,
/// la suite dans l'ordre de fréquence.
pub fn search_sequence<R: Rng + ?Sized>(
    patterns: &[(RankPattern, u32)],
    shuffle_top: usize,
    rng: &mut R,
) -> Vec<RankPattern> {
    let mut sequence: Vec<RankPattern> = patterns.iter().map(|(p, _)| *p).collect();
    let split = shuffle_top.min(sequence.len());
    sequence[..split].shuffle(rng);
    sequence
}

/// Grille uniforme : 6 numéros distincts parmi 1..=45.
pub fn uniform_candidate<R: Rng + ?Sized>(rng: &mut R) -> Candidate {
    let mut numbers = [0u8; PICK_COUNT];
    let picks = rand::seq::index::sample(rng, POOL_SIZE as usize, PICK_COUNT);
    for (slot, idx) in numbers.iter_mut().zip(picks.into_iter()) {
        *slot = (idx + 1) as u8;
    }
    // index::sample rend des indices distincts dans 0..45 : la grille est valide.
    Candidate::new(numbers).unwrap_or_else(|| unreachable!("tirage uniforme invalide : {:?}", numbers))
}
