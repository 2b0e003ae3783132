//! Randomized sequence generation.
//!
//! Draws hook + selling points + cta combinations at random and keeps only
//! structurally distinct ones. Output is capped at
//! `min(max_sequences, ceiling)` where the ceiling is the number of distinct
//! combinations the clip pool allows. Sampling stops at the cap or when the
//! attempt budget runs out, whichever comes first.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use reelmix_models::{Clip, ClipRole, CombinationSignature, Sequence, SequenceId};
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::error::{EngineError, EngineResult};

/// Result of one generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Sequences in creation order
    pub sequences: Vec<Sequence>,
    /// How many sequences the run aimed for
    pub target: usize,
    /// Distinct combinations the pool allows (saturating)
    pub ceiling: u64,
    /// Sampling attempts consumed
    pub attempts: usize,
}

impl Generation {
    /// Fewer sequences than targeted: the attempt budget ran out first.
    pub fn is_partial(&self) -> bool {
        self.sequences.len() < self.target
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// Produces distinct sequences from a clip set.
#[derive(Debug, Clone, Default)]
pub struct SequenceGenerator {
    config: GeneratorConfig,
}

impl SequenceGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate sequences using the thread-local RNG.
    pub fn generate(&self, clips: &[Clip]) -> EngineResult<Generation> {
        self.generate_with_rng(clips, &mut rand::rng())
    }

    /// Generate sequences drawing from `rng`.
    pub fn generate_with_rng<R: Rng>(
        &self,
        clips: &[Clip],
        rng: &mut R,
    ) -> EngineResult<Generation> {
        if clips.is_empty() {
            return Err(EngineError::EmptyInput("no clips to sequence"));
        }

        let hooks: Vec<&Clip> = clips.iter().filter(|c| c.is_role(ClipRole::Hook)).collect();
        let points: Vec<&Clip> = clips
            .iter()
            .filter(|c| c.is_role(ClipRole::SellingPoint))
            .collect();
        let ctas: Vec<&Clip> = clips.iter().filter(|c| c.is_role(ClipRole::Cta)).collect();

        if hooks.is_empty() {
            return Err(EngineError::MissingRole(ClipRole::Hook));
        }
        if ctas.is_empty() {
            return Err(EngineError::MissingRole(ClipRole::Cta));
        }

        let max_points = self.config.max_selling_points.min(points.len());
        let ceiling = combination_ceiling(hooks.len(), ctas.len(), points.len(), max_points);
        let target = usize::try_from(ceiling)
            .unwrap_or(usize::MAX)
            .min(self.config.max_sequences);

        debug!(
            hooks = hooks.len(),
            points = points.len(),
            ctas = ctas.len(),
            max_points,
            ceiling,
            target,
            "Starting sequence generation"
        );

        let mut seen: HashSet<CombinationSignature> = HashSet::new();
        let mut sequences = Vec::with_capacity(target);
        let mut point_order: Vec<usize> = (0..points.len()).collect();
        let mut attempts = 0;

        while sequences.len() < target && attempts < self.config.attempt_budget {
            attempts += 1;

            let hook = hooks[rng.random_range(0..hooks.len())];
            let cta = ctas[rng.random_range(0..ctas.len())];

            let count = if max_points == 0 {
                0
            } else {
                rng.random_range(1..=max_points)
            };
            point_order.shuffle(rng);
            let chosen: Vec<&Clip> = point_order[..count].iter().map(|&i| points[i]).collect();

            let signature =
                CombinationSignature::new(&hook.id, chosen.iter().map(|c| &c.id), &cta.id);
            if !seen.insert(signature) {
                continue;
            }

            let id = SequenceId(sequences.len() as u32 + 1);
            sequences.push(Sequence::from_parts(
                id,
                hook.clone(),
                chosen.into_iter().cloned().collect(),
                cta.clone(),
            ));
        }

        let generation = Generation {
            sequences,
            target,
            ceiling,
            attempts,
        };

        if generation.is_partial() {
            warn!(
                produced = generation.len(),
                target,
                attempts,
                "Attempt budget exhausted before reaching target"
            );
        } else {
            info!(produced = generation.len(), attempts, "Sequences generated");
        }

        Ok(generation)
    }
}

/// Distinct hook/points/cta combinations for a pool.
///
/// `hooks * ctas * sum(C(points, k) for k in 1..=max_points)`, where the sum
/// is 1 when `max_points` is 0 (hook directly followed by cta). Saturates at
/// `u64::MAX`.
pub fn combination_ceiling(hooks: usize, ctas: usize, points: usize, max_points: usize) -> u64 {
    let subsets = if max_points == 0 {
        1
    } else {
        (1..=max_points).fold(0u64, |acc, k| acc.saturating_add(binomial(points, k)))
    };

    (hooks as u64)
        .saturating_mul(ctas as u64)
        .saturating_mul(subsets)
}

/// Binomial coefficient `C(n, k)`, 0 when `k > n`. Saturates at `u64::MAX`.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // Exact at every step: result * (n - i) is divisible by (i + 1)
        result = result * (n - i) as u128 / (i + 1) as u128;
        if result > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    result as u64
}
