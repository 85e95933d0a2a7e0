//! Orchestration : rafraîchissement du signal et génération des grilles.
//!
//! Le moteur garde un unique `SignalSnapshot` derrière un `ArcSwap`. Un
//! rafraîchissement construit un nouvel instantané complet puis le publie
//! d'un bloc ; une génération charge l'instantané une seule fois et ne voit
//! donc jamais un état à moitié reconstruit.

use std::collections::BTreeSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use rand::Rng;
use tracing::{debug, info, trace, warn};

use lotto645_db::models::{Draw, PICK_COUNT, POOL_SIZE};
use lotto645_db::store::DrawStore;

use crate::config::{EngineConfig, Strategy};
use crate::error::EngineError;
use crate::filter::{Candidate, FilterSet};
use crate::models::exposure_rank::ExposureRanks;
use crate::models::gap_weight::GapWeights;
use crate::models::{SignalModel, SignalSnapshot};
use crate::sampler::{sample_without_replacement, search_sequence, uniform_candidate};

pub const GAP_LABEL: &str = "Flexible Weighted (gap weights)";
pub const RANK_LABEL: &str = "Exposure-Rank Pattern Replay";
pub const RANK_FALLBACK_LABEL: &str = "Exposure-Rank Pattern Replay + uniform fallback";

/// Nombre maximal de numéros fixés : le sixième doit rester libre.
pub const MAX_FIXED: usize = PICK_COUNT - 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub count: usize,
    pub fixed: Vec<u8>,
    pub exclude: Vec<u8>,
}

impl GenerationRequest {
    pub fn new(count: usize) -> Self {
        Self { count, ..Self::default() }
    }

    pub fn with_fixed(mut self, fixed: &[u8]) -> Self {
        self.fixed = fixed.to_vec();
        self
    }

    pub fn with_exclude(mut self, exclude: &[u8]) -> Self {
        self.exclude = exclude.to_vec();
        self
    }
}

/// Contraintes validées : ensembles disjoints, réalisables.
#[derive(Debug, Clone)]
struct Constraints {
    fixed: BTreeSet<u8>,
    exclude: BTreeSet<u8>,
}

impl Constraints {
    fn validate(request: &GenerationRequest) -> Result<Self, EngineError> {
        if request.count == 0 {
            return Err(EngineError::ConstraintInfeasible("au moins une grille doit être demandée".to_string()));
        }
        for &n in request.fixed.iter().chain(request.exclude.iter()) {
            if !(1..=POOL_SIZE).contains(&n) {
                return Err(EngineError::ConstraintInfeasible(format!("numéro {} hors limites (1-{})", n, POOL_SIZE)));
            }
        }

        let fixed: BTreeSet<u8> = request.fixed.iter().copied().collect();
        if fixed.len() != request.fixed.len() {
            return Err(EngineError::ConstraintInfeasible("numéro fixé en double".to_string()));
        }
        if fixed.len() > MAX_FIXED {
            return Err(EngineError::ConstraintInfeasible(format!(
                "{} numéros fixés, {} au maximum",
                fixed.len(),
                MAX_FIXED
            )));
        }

        let exclude: BTreeSet<u8> = request.exclude.iter().copied().collect();
        if let Some(n) = fixed.intersection(&exclude).next() {
            return Err(EngineError::ConstraintInfeasible(format!("le {} est à la fois fixé et exclu", n)));
        }

        let selectable = POOL_SIZE as usize - fixed.len() - exclude.len();
        if selectable < PICK_COUNT - fixed.len() {
            return Err(EngineError::ConstraintInfeasible(format!(
                "{} numéros exclus : impossible de compléter une grille",
                exclude.len()
            )));
        }

        Ok(Self { fixed, exclude })
    }

    fn admits(&self, candidate: &Candidate) -> bool {
        self.fixed.iter().all(|&n| candidate.contains(n))
            && !self.exclude.iter().any(|&n| candidate.contains(n))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    /// Position 1-based dans le lot.
    pub seq: usize,
    pub numbers: [u8; PICK_COUNT],
    pub sum: u32,
    /// "impairs:pairs"
    pub odd_even: String,
}

impl Game {
    fn from_candidate(seq: usize, candidate: &Candidate) -> Self {
        Self {
            seq,
            numbers: *candidate.numbers(),
            sum: candidate.sum(),
            odd_even: candidate.odd_even(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub pattern_label: String,
    pub games: Vec<Game>,
    /// Emplacements (1-based) restés vides faute de grille valide dans le budget.
    pub exhausted_slots: Vec<usize>,
}

impl GenerationResult {
    pub fn is_complete(&self) -> bool {
        self.exhausted_slots.is_empty()
    }
}

pub struct LottoEngine<S: DrawStore> {
    store: S,
    strategy: Strategy,
    config: EngineConfig,
    snapshot: ArcSwap<SignalSnapshot>,
}

impl<S: DrawStore> LottoEngine<S> {
    /// Construit le moteur et effectue un premier rafraîchissement.
    pub fn new(store: S, strategy: Strategy, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let snapshot = Self::build_snapshot(&store, strategy, &config)?;
        Ok(Self {
            store,
            strategy,
            config,
            snapshot: ArcSwap::from_pointee(snapshot),
        })
    }

    fn build_snapshot(store: &S, strategy: Strategy, config: &EngineConfig) -> Result<SignalSnapshot, EngineError> {
        let history = store.load()?;
        let snapshot = SignalSnapshot::build(strategy, &history, config);
        info!(
            strategy = %strategy,
            draws = snapshot.draw_count,
            last_round = ?snapshot.last_round,
            source = %store.describe(),
            "signal reconstruit"
        );
        Ok(snapshot)
    }

    /// Relit l'historique et remplace l'instantané. En cas d'erreur,
    /// l'instantané précédent reste en place.
    pub fn refresh(&self) -> Result<(), EngineError> {
        let snapshot = Self::build_snapshot(&self.store, self.strategy, &self.config)?;
        self.snapshot.store(Arc::new(snapshot));
        Ok(())
    }

    /// Enregistre un nouveau tirage puis rafraîchit le signal.
    pub fn record_draw(&self, draw: &Draw) -> Result<(), EngineError> {
        self.store.append(draw)?;
        self.refresh()
    }

    pub fn snapshot(&self) -> Arc<SignalSnapshot> {
        self.snapshot.load_full()
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
    ) -> Result<GenerationResult, EngineError> {
        let constraints = Constraints::validate(request)?;
        let snapshot = self.snapshot.load_full();
        let limits = self.config.filter_limits();

        let result = match &snapshot.model {
            SignalModel::GapWeight(weights) => generate_gap(
                weights,
                &constraints,
                request.count,
                &FilterSet::base(limits),
                self.config.gap_retry_budget,
                rng,
            )?,
            SignalModel::ExposureRank(ranks) => generate_rank(
                ranks,
                &constraints,
                request.count,
                &FilterSet::extended(limits),
                &self.config,
                rng,
            ),
        };

        debug!(
            label = %result.pattern_label,
            games = result.games.len(),
            exhausted = result.exhausted_slots.len(),
            "génération terminée"
        );
        Ok(result)
    }
}

fn generate_gap<R: Rng + ?Sized>(
    weights: &GapWeights,
    constraints: &Constraints,
    count: usize,
    filters: &FilterSet,
    retry_budget: usize,
    rng: &mut R,
) -> Result<GenerationResult, EngineError> {
    let pool: Vec<(u8, f64)> = (1..=POOL_SIZE)
        .filter(|n| !constraints.fixed.contains(n) && !constraints.exclude.contains(n))
        .map(|n| (n, weights.weight(n)))
        .collect();
    let needed = PICK_COUNT - constraints.fixed.len();

    let mut games = Vec::with_capacity(count);
    let mut exhausted_slots = Vec::new();

    for slot in 1..=count {
        let mut accepted = None;

        for _ in 0..retry_budget {
            let mut numbers: Vec<u8> = constraints.fixed.iter().copied().collect();
            numbers.extend(sample_without_replacement(&pool, needed, rng)?);

            let Some(candidate) = Candidate::from_slice(&numbers) else {
                continue;
            };
            match filters.first_failure(&candidate) {
                None => {
                    accepted = Some(candidate);
                    break;
                }
                Some(rule) => trace!(?numbers, %rule, "grille rejetée"),
            }
        }

        match accepted {
            Some(candidate) => games.push(Game::from_candidate(slot, &candidate)),
            None => {
                warn!(slot, retry_budget, "aucune grille valide dans le budget, emplacement ignoré");
                exhausted_slots.push(slot);
            }
        }
    }

    Ok(GenerationResult {
        pattern_label: GAP_LABEL.to_string(),
        games,
        exhausted_slots,
    })
}

fn generate_rank<R: Rng + ?Sized>(
    ranks: &ExposureRanks,
    constraints: &Constraints,
    count: usize,
    filters: &FilterSet,
    config: &EngineConfig,
    rng: &mut R,
) -> GenerationResult {
    let mut games: Vec<Game> = Vec::with_capacity(count);

    for pattern in search_sequence(ranks.frequent_patterns(), config.shuffle_top, rng) {
        if games.len() >= count {
            break;
        }
        let Some(candidate) = ranks.translate(&pattern).and_then(Candidate::new) else {
            continue;
        };
        if !constraints.admits(&candidate) || !filters.accepts(&candidate) {
            continue;
        }
        games.push(Game::from_candidate(games.len() + 1, &candidate));
    }

    if games.len() >= count {
        return GenerationResult {
            pattern_label: RANK_LABEL.to_string(),
            games,
            exhausted_slots: Vec::new(),
        };
    }

    debug!(found = games.len(), count, "motifs épuisés, tirage uniforme de secours");
    let mut exhausted_slots = Vec::new();

    while games.len() < count {
        let slot = games.len() + 1;
        let found = (0..config.fallback_attempt_cap)
            .map(|_| uniform_candidate(&mut *rng))
            .find(|c| constraints.admits(c) && filters.accepts(c));

        match found {
            Some(candidate) => games.push(Game::from_candidate(slot, &candidate)),
            None => {
                // Mêmes contraintes pour les emplacements suivants : inutile d'insister.
                warn!(
                    slot,
                    cap = config.fallback_attempt_cap,
                    "tirage de secours sans résultat, emplacements restants ignorés"
                );
                exhausted_slots.extend(slot..=count);
                break;
            }
        }
    }

    GenerationResult {
        pattern_label: RANK_FALLBACK_LABEL.to_string(),
        games,
        exhausted_slots,
    }
}
