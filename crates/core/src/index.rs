//! Dense, index-based view of a validated [`Catalog`], built once per run.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use types::{Catalog, DayOfWeek, RoomKind, ScheduledMeeting, TimeslotId};

/// One scheduled meeting in engine form: indexes into the catalog's
/// section, timeslot, and room arrays. The owning chromosome fixes which
/// position belongs to which section, so two genes never disagree with
/// the layout in [`CatalogIndex::gene_section`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Gene {
    pub section: usize,
    pub slot: usize,
    pub room: usize,
}

#[derive(Clone, Debug)]
pub struct SectionInfo {
    pub faculty: usize,
    /// Student cohort, interned in first-appearance order.
    pub group: Option<usize>,
    pub hours: u32,
    pub room_kind: RoomKind,
    pub size: u32,
}

#[derive(Clone, Debug)]
pub struct SlotInfo {
    pub day: DayOfWeek,
    pub period: u8,
    pub blacked_out: bool,
}

#[derive(Clone, Debug)]
pub struct RoomInfo {
    pub capacity: u32,
    pub kind: RoomKind,
}

pub struct CatalogIndex {
    pub sections: Vec<SectionInfo>,
    pub slots: Vec<SlotInfo>,
    pub rooms: Vec<RoomInfo>,
    /// Per-faculty slot sets resolved from preferences.
    pub avoid_slots: Vec<HashSet<usize>>,
    pub preferred_slots: Vec<HashSet<usize>>,
    /// Days each faculty member is on leave.
    pub leave_days: Vec<HashSet<DayOfWeek>>,
    /// Elective pairs as section indexes.
    pub elective_pairs: Vec<(usize, usize)>,
    pub rules: types::InstitutionalRules,
    /// Chromosome layout: the section owning each gene position. Length
    /// equals the catalog's total weekly hours and never changes during
    /// a run.
    pub gene_section: Vec<usize>,
    /// Contiguous gene-position block per section, in catalog order.
    pub section_genes: Vec<Range<usize>>,

    section_ids: Vec<types::SectionId>,
    room_ids: Vec<types::RoomId>,
    slot_ids: Vec<TimeslotId>,
    faculty_ids: Vec<types::FacultyId>,
    group_ids: Vec<types::GroupId>,
}

impl CatalogIndex {
    pub fn new(cat: &Catalog) -> Self {
        let faculty_pos: HashMap<&str, usize> = cat
            .faculty
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id.0.as_str(), i))
            .collect();
        let section_pos: HashMap<&str, usize> = cat
            .sections
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.0.as_str(), i))
            .collect();
        let slot_pos: HashMap<&str, usize> = cat
            .timeslots
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.0.as_str(), i))
            .collect();

        let blackout: HashSet<&str> = cat
            .rules
            .blackout_slots
            .iter()
            .map(|t| t.0.as_str())
            .collect();
        let blackout_days: HashSet<DayOfWeek> = cat.rules.blackout_days.iter().copied().collect();

        let slots: Vec<SlotInfo> = cat
            .timeslots
            .iter()
            .map(|t| SlotInfo {
                day: t.day,
                period: t.period,
                blacked_out: blackout.contains(t.id.0.as_str()) || blackout_days.contains(&t.day),
            })
            .collect();

        let mut group_ids: Vec<types::GroupId> = Vec::new();
        let mut group_pos: HashMap<String, usize> = HashMap::new();
        let sections: Vec<SectionInfo> = cat
            .sections
            .iter()
            .map(|s| SectionInfo {
                faculty: faculty_pos[s.faculty_id.0.as_str()],
                group: s.group_id.as_ref().map(|g| {
                    *group_pos.entry(g.0.clone()).or_insert_with(|| {
                        group_ids.push(g.clone());
                        group_ids.len() - 1
                    })
                }),
                hours: s.weekly_hours,
                room_kind: s.room_kind,
                size: s.size,
            })
            .collect();

        let rooms: Vec<RoomInfo> = cat
            .rooms
            .iter()
            .map(|r| RoomInfo {
                capacity: r.capacity,
                kind: r.kind,
            })
            .collect();

        let resolve = |ids: &[TimeslotId]| -> HashSet<usize> {
            ids.iter().filter_map(|t| slot_pos.get(t.0.as_str())).copied().collect()
        };
        let avoid_slots: Vec<HashSet<usize>> = cat
            .faculty
            .iter()
            .map(|f| resolve(&f.prefs.avoid_slots))
            .collect();
        let preferred_slots: Vec<HashSet<usize>> = cat
            .faculty
            .iter()
            .map(|f| resolve(&f.prefs.preferred_slots))
            .collect();

        let mut leave_days: Vec<HashSet<DayOfWeek>> = vec![HashSet::new(); cat.faculty.len()];
        for leave in &cat.leaves {
            if let Some(&fi) = faculty_pos.get(leave.faculty_id.0.as_str()) {
                leave_days[fi].insert(leave.day);
            }
        }

        let elective_pairs: Vec<(usize, usize)> = cat
            .rules
            .elective_pairs
            .iter()
            .filter_map(|(a, b)| {
                Some((
                    *section_pos.get(a.0.as_str())?,
                    *section_pos.get(b.0.as_str())?,
                ))
            })
            .collect();

        let mut gene_section = Vec::with_capacity(cat.total_hours());
        let mut section_genes = Vec::with_capacity(sections.len());
        for (si, s) in sections.iter().enumerate() {
            let start = gene_section.len();
            gene_section.extend(std::iter::repeat(si).take(s.hours as usize));
            section_genes.push(start..gene_section.len());
        }

        Self {
            sections,
            slots,
            rooms,
            avoid_slots,
            preferred_slots,
            leave_days,
            elective_pairs,
            rules: cat.rules.clone(),
            gene_section,
            section_genes,
            section_ids: cat.sections.iter().map(|s| s.id.clone()).collect(),
            room_ids: cat.rooms.iter().map(|r| r.id.clone()).collect(),
            slot_ids: cat.timeslots.iter().map(|t| t.id.clone()).collect(),
            faculty_ids: cat.faculty.iter().map(|f| f.id.clone()).collect(),
            group_ids,
        }
    }

    /// Chromosome length for this catalog.
    pub fn gene_count(&self) -> usize {
        self.gene_section.len()
    }

    pub fn faculty_count(&self) -> usize {
        self.faculty_ids.len()
    }

    /// Faculty teaching the section that owns the given gene.
    pub fn faculty_of(&self, gene: &Gene) -> usize {
        self.sections[gene.section].faculty
    }

    /// Student group attending the gene's section, if one is assigned.
    pub fn group_of(&self, gene: &Gene) -> Option<usize> {
        self.sections[gene.section].group
    }

    /// Target weekly hours per faculty for the balance term: configured
    /// value, or the mean load implied by the catalog.
    pub fn target_hours(&self) -> f64 {
        if let Some(t) = self.rules.target_weekly_hours {
            return t;
        }
        if self.faculty_ids.is_empty() {
            return 0.0;
        }
        self.gene_count() as f64 / self.faculty_ids.len() as f64
    }

    /// External-surface form of a gene.
    pub fn meeting(&self, gene: &Gene) -> ScheduledMeeting {
        ScheduledMeeting {
            section_id: self.section_ids[gene.section].clone(),
            room_id: self.room_ids[gene.room].clone(),
            timeslot_id: self.slot_ids[gene.slot].clone(),
            faculty_id: self.faculty_ids[self.faculty_of(gene)].clone(),
        }
    }

    pub fn section_id(&self, si: usize) -> &types::SectionId {
        &self.section_ids[si]
    }

    pub fn room_id(&self, ri: usize) -> &types::RoomId {
        &self.room_ids[ri]
    }

    pub fn slot_id(&self, ti: usize) -> &TimeslotId {
        &self.slot_ids[ti]
    }

    pub fn faculty_id(&self, fi: usize) -> &types::FacultyId {
        &self.faculty_ids[fi]
    }

    pub fn group_id(&self, gi: usize) -> &types::GroupId {
        &self.group_ids[gi]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::*;

    fn catalog() -> Catalog {
        Catalog {
            sections: vec![
                Section {
                    id: SectionId("a".into()),
                    faculty_id: FacultyId("f1".into()),
                    group_id: Some(GroupId("cs-2".into())),
                    weekly_hours: 2,
                    room_kind: RoomKind::Lecture,
                    size: 20,
                },
                Section {
                    id: SectionId("b".into()),
                    faculty_id: FacultyId("f2".into()),
                    group_id: Some(GroupId("cs-2".into())),
                    weekly_hours: 3,
                    room_kind: RoomKind::Lab,
                    size: 25,
                },
            ],
            rooms: vec![Room {
                id: RoomId("r1".into()),
                capacity: 30,
                kind: RoomKind::Lecture,
            }],
            timeslots: vec![
                TimeSlot {
                    id: TimeslotId("mon.1".into()),
                    day: DayOfWeek::Mon,
                    period: 1,
                    duration: 1,
                },
                TimeSlot {
                    id: TimeslotId("mon.2".into()),
                    day: DayOfWeek::Mon,
                    period: 2,
                    duration: 1,
                },
                TimeSlot {
                    id: TimeslotId("fri.1".into()),
                    day: DayOfWeek::Fri,
                    period: 1,
                    duration: 1,
                },
            ],
            faculty: vec![
                Faculty {
                    id: FacultyId("f1".into()),
                    prefs: FacultyPrefs {
                        avoid_slots: vec![TimeslotId("fri.1".into())],
                        preferred_slots: vec![],
                    },
                },
                Faculty {
                    id: FacultyId("f2".into()),
                    prefs: FacultyPrefs::default(),
                },
            ],
            leaves: vec![FacultyLeave {
                faculty_id: FacultyId("f2".into()),
                day: DayOfWeek::Fri,
            }],
            rules: InstitutionalRules {
                blackout_slots: vec![TimeslotId("mon.2".into())],
                ..Default::default()
            },
        }
    }

    #[test]
    fn layout_covers_all_section_hours() {
        let idx = CatalogIndex::new(&catalog());
        assert_eq!(idx.gene_count(), 5);
        assert_eq!(idx.gene_section, vec![0, 0, 1, 1, 1]);
        assert_eq!(idx.section_genes[0], 0..2);
        assert_eq!(idx.section_genes[1], 2..5);
    }

    #[test]
    fn blackouts_and_leaves_are_resolved() {
        let idx = CatalogIndex::new(&catalog());
        assert!(!idx.slots[0].blacked_out);
        assert!(idx.slots[1].blacked_out);
        assert!(idx.avoid_slots[0].contains(&2));
        assert!(idx.leave_days[1].contains(&DayOfWeek::Fri));
    }

    #[test]
    fn shared_group_interns_to_one_index() {
        let idx = CatalogIndex::new(&catalog());
        assert_eq!(idx.sections[0].group, Some(0));
        assert_eq!(idx.sections[1].group, Some(0));
        assert_eq!(idx.group_id(0).0, "cs-2");
    }

    #[test]
    fn mean_target_when_unconfigured() {
        let idx = CatalogIndex::new(&catalog());
        assert!((idx.target_hours() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn meeting_maps_back_to_ids() {
        let idx = CatalogIndex::new(&catalog());
        let m = idx.meeting(&Gene {
            section: 1,
            slot: 2,
            room: 0,
        });
        assert_eq!(m.section_id.0, "b");
        assert_eq!(m.timeslot_id.0, "fri.1");
        assert_eq!(m.faculty_id.0, "f2");
    }
}
