//! Candidate timetable: one gene per required section-hour, laid out in
//! the catalog's section order. Operators may change a gene's slot or
//! room but never its section.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;
use ttgen_core::index::{CatalogIndex, Gene};
use ttgen_core::scoring::{self, Evaluation, Occupancy};

#[derive(Clone, Debug)]
pub struct Chromosome {
    genes: Vec<Gene>,
    eval: Option<Evaluation>,
}

impl Chromosome {
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        Self { genes, eval: None }
    }

    /// Random construction: distinct uniform slots per section, rooms
    /// picked with the type/capacity preference. Never fails; an
    /// infeasible placement is left for the evaluator to penalize.
    pub fn seed(idx: &CatalogIndex, rng: &mut ChaCha8Rng) -> Self {
        let mut genes = Vec::with_capacity(idx.gene_count());
        let mut slots: Vec<usize> = (0..idx.slots.len()).collect();
        for (si, section) in idx.sections.iter().enumerate() {
            slots.shuffle(rng);
            for &slot in slots.iter().take(section.hours as usize) {
                let room = pick_room(idx, si, rng);
                genes.push(Gene {
                    section: si,
                    slot,
                    room,
                });
            }
        }
        Self { genes, eval: None }
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Cached score, present once [`ensure_evaluated`](Self::ensure_evaluated)
    /// has run since the last gene change.
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.eval.as_ref()
    }

    pub fn fitness(&self) -> f64 {
        self.eval.as_ref().map_or(f64::INFINITY, |e| e.fitness)
    }

    pub fn ensure_evaluated(&mut self, idx: &CatalogIndex) -> &Evaluation {
        let genes = &self.genes;
        self.eval
            .get_or_insert_with(|| scoring::evaluate(idx, genes))
    }

    /// Slot/room lookup over the current genes, rebuilt on demand.
    pub fn occupancy(&self, idx: &CatalogIndex) -> Occupancy {
        Occupancy::build(idx, &self.genes)
    }

    /// Replaces one gene, dropping the stale score.
    pub(crate) fn set_gene(&mut self, pos: usize, gene: Gene) {
        self.genes[pos] = gene;
        self.eval = None;
    }

    /// Ranking order by cached fitness with the evaluator's tie-breaks.
    /// Unevaluated chromosomes sort last.
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        match (&self.eval, &other.eval) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Room choice shared by seeding and mutation: uniform among rooms of
/// the right kind with enough seats; else the closest by capacity so
/// construction degrades instead of aborting.
pub(crate) fn pick_room(idx: &CatalogIndex, section: usize, rng: &mut ChaCha8Rng) -> usize {
    let s = &idx.sections[section];
    let matching: Vec<usize> = idx
        .rooms
        .iter()
        .enumerate()
        .filter(|(_, r)| r.kind == s.room_kind)
        .map(|(i, _)| i)
        .collect();
    let pool: Vec<usize> = if matching.is_empty() {
        (0..idx.rooms.len()).collect()
    } else {
        matching
    };

    let fitting: Vec<usize> = pool
        .iter()
        .copied()
        .filter(|&ri| idx.rooms[ri].capacity >= s.size)
        .collect();
    if !fitting.is_empty() {
        return fitting[rng.gen_range(0..fitting.len())];
    }
    pool.iter()
        .copied()
        .max_by_key(|&ri| (idx.rooms[ri].capacity, std::cmp::Reverse(ri)))
        .unwrap_or(0)
}
