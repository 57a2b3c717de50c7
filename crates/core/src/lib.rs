pub mod index;
pub mod scoring;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub use types::{
    Catalog, ConflictKind, ConflictRecord, GaConfig, GenerationResult, ScheduledMeeting,
    TerminationReason,
};

/// Failure to even start a generation run. Both variants are detected
/// before the evolutionary loop consumes any search budget. A spent
/// budget (`Exhausted`) or a cooperative stop (`Cancelled`) is not an
/// error; those surface as [`TerminationReason`] on a successful result.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Checks the catalog for structural impossibilities. All findings are
/// collected and reported in one message.
pub fn validate_catalog(cat: &Catalog) -> Result<(), GenerateError> {
    let mut errors: Vec<String> = Vec::new();

    if cat.timeslots.is_empty() {
        errors.push("timeslots is empty".into());
    }
    if cat.rooms.is_empty() && !cat.sections.is_empty() {
        errors.push("rooms is empty".into());
    }

    fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                errors.push(format!("duplicate {name} id: {s}"));
            }
        }
    }
    chk_unique("section", cat.sections.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("room", cat.rooms.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("timeslot", cat.timeslots.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("faculty", cat.faculty.iter().map(|x| &x.id.0), &mut errors);

    use std::collections::HashSet;
    let faculty: HashSet<_> = cat.faculty.iter().map(|f| &f.id.0).collect();
    let sections: HashSet<_> = cat.sections.iter().map(|s| &s.id.0).collect();
    let slots: HashSet<_> = cat.timeslots.iter().map(|t| &t.id.0).collect();

    let mut cells = HashSet::new();
    for t in &cat.timeslots {
        if !cells.insert((t.day, t.period)) {
            errors.push(format!(
                "timeslot {} duplicates grid cell {:?} period {}",
                t.id, t.day, t.period
            ));
        }
    }

    for s in &cat.sections {
        if !faculty.contains(&s.faculty_id.0) {
            errors.push(format!(
                "section {} references missing faculty {}",
                s.id, s.faculty_id
            ));
        }
        if s.weekly_hours == 0 {
            errors.push(format!("section {} has weekly_hours=0", s.id));
        }
        if s.weekly_hours as usize > cat.timeslots.len() {
            errors.push(format!(
                "section {} requires {} weekly hours but the grid has only {} slots",
                s.id,
                s.weekly_hours,
                cat.timeslots.len()
            ));
        }
    }

    for f in &cat.faculty {
        for slot in f.prefs.avoid_slots.iter().chain(&f.prefs.preferred_slots) {
            if !slots.contains(&slot.0) {
                errors.push(format!("faculty {} references unknown slot {}", f.id, slot));
            }
        }
    }

    for l in &cat.leaves {
        if !faculty.contains(&l.faculty_id.0) {
            errors.push(format!("leave references missing faculty {}", l.faculty_id));
        }
    }

    for slot in &cat.rules.blackout_slots {
        if !slots.contains(&slot.0) {
            errors.push(format!("blackout references unknown slot {slot}"));
        }
    }
    for (a, b) in &cat.rules.elective_pairs {
        for id in [a, b] {
            if !sections.contains(&id.0) {
                errors.push(format!("elective pair references missing section {id}"));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(GenerateError::InvalidCatalog(errors.join("; ")))
    }
}

/// Rejects out-of-range search parameters before seeding.
pub fn validate_config(cfg: &GaConfig) -> Result<(), GenerateError> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.population_size < 2 {
        errors.push("population_size must be at least 2".into());
    }
    if cfg.max_generations == 0 {
        errors.push("max_generations must be at least 1".into());
    }
    if cfg.elite_count >= cfg.population_size {
        errors.push("elite_count must be smaller than population_size".into());
    }
    if cfg.tournament_size == 0 || cfg.tournament_size > cfg.population_size {
        errors.push("tournament_size must be in 1..=population_size".into());
    }
    if !(0.0..=1.0).contains(&cfg.mutation_rate) {
        errors.push("mutation_rate must be within [0, 1]".into());
    }
    if !(cfg.acceptance_threshold >= 0.0) {
        errors.push("acceptance_threshold must be non-negative".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(GenerateError::InvalidConfig(errors.join("; ")))
    }
}

/// Cooperative stop signal. The controller polls it exactly once per
/// generation boundary, never mid-generation.
pub trait Cancellation: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl Cancellation for CancelToken {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// For callers that run without a stop signal.
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Downstream delivery failed. Kept distinct from [`GenerateError`]:
/// "could not save" is not "could not generate".
#[derive(Debug, Error)]
#[error("failed to persist timetable: {0}")]
pub struct PersistError(#[from] anyhow::Error);

/// Seam to the external persistence layer. Implementations own storage
/// concerns entirely; the engine never sees them.
pub trait TimetableSink {
    fn save_meeting(&mut self, meeting: &ScheduledMeeting) -> anyhow::Result<()>;
    fn save_conflict(&mut self, conflict: &ConflictRecord) -> anyhow::Result<()>;
}

/// Writes the materialized schedule and its residual conflicts through
/// the sink. The result itself is never mutated.
pub fn persist(result: &GenerationResult, sink: &mut dyn TimetableSink) -> Result<(), PersistError> {
    for meeting in &result.schedule {
        sink.save_meeting(meeting)?;
    }
    for conflict in &result.conflicts {
        sink.save_conflict(conflict)?;
    }
    Ok(())
}
