//! Genetic timetable solver. Given the same catalog, config, and seed,
//! a run is reproducible bit for bit: the controller owns the only RNG
//! and threads it through every operator call.

pub mod chromosome;
pub mod materialize;
pub mod operators;

use chromosome::Chromosome;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use ttgen_core::index::CatalogIndex;
use ttgen_core::scoring;
use ttgen_core::{Cancellation, GenerateError};
use types::{Catalog, GaConfig, GenerationResult, TerminationReason};

pub use ttgen_core::{CancelToken, NeverCancel};

#[derive(Default)]
pub struct GaSolver;

impl GaSolver {
    pub fn new() -> Self {
        Self
    }

    /// Runs one full generation cycle and returns the best timetable
    /// found, with its residual conflicts. Blocking by design; callers
    /// that need background execution schedule this call themselves.
    pub fn generate(
        &self,
        catalog: &Catalog,
        config: &GaConfig,
        cancel: &dyn Cancellation,
    ) -> Result<GenerationResult, GenerateError> {
        ttgen_core::validate_catalog(catalog)?;
        ttgen_core::validate_config(config)?;

        let idx = CatalogIndex::new(catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let mut population: Vec<Chromosome> = (0..config.population_size)
            .map(|_| Chromosome::seed(&idx, &mut rng))
            .collect();

        let mut best: Option<Chromosome> = None;
        let mut generation = 0u32;

        let status = loop {
            for c in population.iter_mut() {
                c.ensure_evaluated(&idx);
            }
            // Stable sort keeps the earlier population index on full ties.
            population.sort_by(Chromosome::cmp_rank);
            generation += 1;

            // Elitism already makes the front of the ranking monotone,
            // but the explicit best-so-far is what a cancelled run hands
            // back.
            if best
                .as_ref()
                .map_or(true, |b| population[0].cmp_rank(b).is_lt())
            {
                best = Some(population[0].clone());
            }

            let front = &population[0];
            debug!(
                generation,
                fitness = front.fitness(),
                hard = front.evaluation().map_or(0, |e| e.hard_count()),
                "generation evaluated"
            );

            let accepted = front.evaluation().is_some_and(|e| {
                e.hard_count() == 0 && e.fitness <= config.acceptance_threshold
            });
            if accepted {
                break TerminationReason::Converged;
            }
            if cancel.is_cancelled() {
                break TerminationReason::Cancelled;
            }
            if generation >= config.max_generations {
                break TerminationReason::Exhausted;
            }

            population = next_generation(&idx, &population, config, &mut rng);
        };

        let winner = best.unwrap_or_else(|| Chromosome::from_genes(Vec::new()));
        let eval = winner
            .evaluation()
            .cloned()
            .unwrap_or_else(|| scoring::evaluate(&idx, winner.genes()));

        info!(
            ?status,
            generation,
            fitness = eval.fitness,
            conflicts = eval.hard_count(),
            "generation run finished"
        );

        Ok(materialize::result(
            &idx,
            winner.genes(),
            &eval,
            status,
            generation,
            config.population_size,
        ))
    }
}

/// Builds generation g+1: elites copied unchanged, remainder bred via
/// tournament selection, crossover, and mutation. Population size is
/// invariant.
fn next_generation(
    idx: &CatalogIndex,
    ranked: &[Chromosome],
    config: &GaConfig,
    rng: &mut ChaCha8Rng,
) -> Vec<Chromosome> {
    let mut next = Vec::with_capacity(config.population_size);
    next.extend(ranked.iter().take(config.elite_count).cloned());

    while next.len() < config.population_size {
        let pa = operators::tournament(ranked.len(), config.tournament_size, rng);
        let pb = operators::tournament(ranked.len(), config.tournament_size, rng);
        let (mut c1, mut c2) = operators::crossover(idx, &ranked[pa], &ranked[pb], rng);
        operators::mutate(idx, &mut c1, config.mutation_rate, rng);
        operators::mutate(idx, &mut c2, config.mutation_rate, rng);
        next.push(c1);
        if next.len() < config.population_size {
            next.push(c2);
        }
    }
    next
}
