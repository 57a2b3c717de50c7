//! Pure scoring over one candidate timetable. Lower is better; 0.0
//! means fully feasible and fully preferred.

use crate::index::{CatalogIndex, Gene};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use types::{ConflictKind, ConflictRecord, DayOfWeek};

/// Who occupies what, rebuilt per evaluation. Ordered maps keep the
/// conflict list stable across runs with the same seed.
#[derive(Debug, Default)]
pub struct Occupancy {
    by_slot: BTreeMap<usize, Vec<usize>>,
    by_room_slot: BTreeMap<(usize, usize), Vec<usize>>,
    by_faculty_slot: BTreeMap<(usize, usize), Vec<usize>>,
    by_group_slot: BTreeMap<(usize, usize), Vec<usize>>,
    by_section_slot: BTreeMap<(usize, usize), Vec<usize>>,
}

impl Occupancy {
    pub fn build(idx: &CatalogIndex, genes: &[Gene]) -> Self {
        let mut occ = Self::default();
        for (pos, g) in genes.iter().enumerate() {
            occ.by_slot.entry(g.slot).or_default().push(pos);
            occ.by_room_slot
                .entry((g.room, g.slot))
                .or_default()
                .push(pos);
            occ.by_faculty_slot
                .entry((idx.faculty_of(g), g.slot))
                .or_default()
                .push(pos);
            if let Some(group) = idx.group_of(g) {
                occ.by_group_slot
                    .entry((group, g.slot))
                    .or_default()
                    .push(pos);
            }
            occ.by_section_slot
                .entry((g.section, g.slot))
                .or_default()
                .push(pos);
        }
        occ
    }

    /// Gene positions meeting in the given slot.
    pub fn genes_at(&self, slot: usize) -> &[usize] {
        self.by_slot.get(&slot).map_or(&[], Vec::as_slice)
    }

    /// Gene positions meeting in the given room and slot.
    pub fn genes_in(&self, room: usize, slot: usize) -> &[usize] {
        self.by_room_slot
            .get(&(room, slot))
            .map_or(&[], Vec::as_slice)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SoftScores {
    pub preference_mismatches: u32,
    pub workload_variance: f64,
    pub sync_violations: u32,
    pub consecutive_excess: u32,
    pub penalty: f64,
}

/// Full scoring outcome for one candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub fitness: f64,
    pub conflicts: Vec<ConflictRecord>,
    pub soft: SoftScores,
}

impl Evaluation {
    pub fn hard_count(&self) -> usize {
        self.conflicts.len()
    }

    pub fn soft_count(&self) -> u32 {
        self.soft.preference_mismatches + self.soft.sync_violations + self.soft.consecutive_excess
    }

    pub fn is_feasible(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Selection order: fitness, then fewer hard violations, then fewer
    /// soft violations. Callers break remaining ties by population index
    /// via stable sort.
    pub fn cmp(&self, other: &Evaluation) -> Ordering {
        self.fitness
            .total_cmp(&other.fitness)
            .then(self.hard_count().cmp(&other.hard_count()))
            .then(self.soft_count().cmp(&other.soft_count()))
    }
}

/// Scores one candidate against every hard and soft rule in the catalog.
pub fn evaluate(idx: &CatalogIndex, genes: &[Gene]) -> Evaluation {
    let occ = Occupancy::build(idx, genes);
    let mut conflicts: Vec<ConflictRecord> = Vec::new();

    let record = |kind: ConflictKind, positions: &[usize], detail: String| ConflictRecord {
        kind,
        meetings: positions.iter().map(|&p| idx.meeting(&genes[p])).collect(),
        detail,
    };

    for ((room, slot), positions) in &occ.by_room_slot {
        if positions.len() > 1 {
            conflicts.push(record(
                ConflictKind::RoomClash,
                positions,
                format!(
                    "room {} booked {} times at {}",
                    idx.room_id(*room),
                    positions.len(),
                    idx.slot_id(*slot)
                ),
            ));
        }
    }
    for ((fi, slot), positions) in &occ.by_faculty_slot {
        if positions.len() > 1 {
            conflicts.push(record(
                ConflictKind::FacultyClash,
                positions,
                format!(
                    "faculty {} assigned {} meetings at {}",
                    idx.faculty_id(*fi),
                    positions.len(),
                    idx.slot_id(*slot)
                ),
            ));
        }
    }
    for ((gi, slot), positions) in &occ.by_group_slot {
        // Same-section reuse is reported as a section clash below, not here.
        let distinct_sections = positions
            .iter()
            .any(|&p| genes[p].section != genes[positions[0]].section);
        if distinct_sections {
            conflicts.push(record(
                ConflictKind::GroupClash,
                positions,
                format!(
                    "group {} has {} meetings at {}",
                    idx.group_id(*gi),
                    positions.len(),
                    idx.slot_id(*slot)
                ),
            ));
        }
    }
    for ((si, slot), positions) in &occ.by_section_slot {
        if positions.len() > 1 {
            conflicts.push(record(
                ConflictKind::SectionClash,
                positions,
                format!(
                    "section {} meets {} times at {}",
                    idx.section_id(*si),
                    positions.len(),
                    idx.slot_id(*slot)
                ),
            ));
        }
    }

    for (pos, g) in genes.iter().enumerate() {
        let section = &idx.sections[g.section];
        let room = &idx.rooms[g.room];
        let slot = &idx.slots[g.slot];

        if room.capacity < section.size {
            conflicts.push(record(
                ConflictKind::RoomCapacity,
                &[pos],
                format!(
                    "room {} seats {} but section {} expects {}",
                    idx.room_id(g.room),
                    room.capacity,
                    idx.section_id(g.section),
                    section.size
                ),
            ));
        }
        if room.kind != section.room_kind {
            conflicts.push(record(
                ConflictKind::RoomType,
                &[pos],
                format!(
                    "section {} needs a {:?} room, {} is a {:?}",
                    idx.section_id(g.section),
                    section.room_kind,
                    idx.room_id(g.room),
                    room.kind
                ),
            ));
        }
        if slot.blacked_out {
            conflicts.push(record(
                ConflictKind::SlotBlackout,
                &[pos],
                format!("slot {} is reserved", idx.slot_id(g.slot)),
            ));
        }
        if idx.leave_days[section.faculty].contains(&slot.day) {
            conflicts.push(record(
                ConflictKind::FacultyOnLeave,
                &[pos],
                format!(
                    "faculty {} is on leave on {:?}",
                    idx.faculty_id(section.faculty),
                    slot.day
                ),
            ));
        }
    }

    let soft = soft_scores(idx, genes);
    let fitness = idx.rules.hard_penalty * conflicts.len() as f64 + soft.penalty;

    Evaluation {
        fitness,
        conflicts,
        soft,
    }
}

fn soft_scores(idx: &CatalogIndex, genes: &[Gene]) -> SoftScores {
    let weights = &idx.rules.soft_weights;

    let mut mismatches = 0u32;
    for g in genes {
        let fi = idx.faculty_of(g);
        if idx.avoid_slots[fi].contains(&g.slot) {
            mismatches += 1;
        } else if !idx.preferred_slots[fi].is_empty() && !idx.preferred_slots[fi].contains(&g.slot)
        {
            mismatches += 1;
        }
    }

    // Spread of per-faculty load around the target, in hours squared.
    let variance = if idx.faculty_count() == 0 {
        0.0
    } else {
        let mut load = vec![0u32; idx.faculty_count()];
        for g in genes {
            load[idx.faculty_of(g)] += 1;
        }
        let target = idx.target_hours();
        load.iter()
            .map(|&h| (h as f64 - target).powi(2))
            .sum::<f64>()
            / idx.faculty_count() as f64
    };

    let mut sync_violations = 0u32;
    for &(a, b) in &idx.elective_pairs {
        let slots_of = |si: usize| -> std::collections::BTreeSet<usize> {
            genes
                .iter()
                .filter(|g| g.section == si)
                .map(|g| g.slot)
                .collect()
        };
        if slots_of(a) != slots_of(b) {
            sync_violations += 1;
        }
    }

    let mut excess = 0u32;
    let mut day_periods: BTreeMap<(usize, DayOfWeek), Vec<u8>> = BTreeMap::new();
    for g in genes {
        let slot = &idx.slots[g.slot];
        day_periods
            .entry((g.section, slot.day))
            .or_default()
            .push(slot.period);
    }
    for periods in day_periods.values_mut() {
        periods.sort_unstable();
        periods.dedup();
        let mut run = 1u32;
        for w in periods.windows(2) {
            if w[1] == w[0] + 1 {
                run += 1;
            } else {
                excess += run.saturating_sub(idx.rules.max_consecutive);
                run = 1;
            }
        }
        excess += run.saturating_sub(idx.rules.max_consecutive);
    }

    let penalty = weights.preference * mismatches as f64
        + weights.balance * variance
        + weights.sync * sync_violations as f64
        + weights.consecutive * excess as f64;

    SoftScores {
        preference_mismatches: mismatches,
        workload_variance: variance,
        sync_violations,
        consecutive_excess: excess,
        penalty,
    }
}
