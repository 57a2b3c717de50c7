use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}
id_newtype!(SectionId);
id_newtype!(FacultyId);
id_newtype!(RoomId);
id_newtype!(TimeslotId);
id_newtype!(GroupId);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    #[default]
    Lecture,
    Lab,
    Seminar,
}

/// One cell of the weekly grid: a day plus an ordinal period within that day.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: TimeslotId,
    pub day: DayOfWeek,
    pub period: u8,
    #[serde(default = "one")]
    pub duration: u32,
}

fn one() -> u32 {
    1
}

/// A course offering that needs scheduling. A section requiring
/// `weekly_hours` contact hours contributes that many meetings to every
/// candidate timetable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub faculty_id: FacultyId,
    /// Student cohort attending this section. Two sections of the same
    /// group meeting in the same slot is a hard violation.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    pub weekly_hours: u32,
    #[serde(default)]
    pub room_kind: RoomKind,
    /// Expected enrollment; rooms below this trigger a capacity violation.
    pub size: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub capacity: u32,
    #[serde(default)]
    pub kind: RoomKind,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FacultyPrefs {
    /// Slots the faculty member would rather not teach in (soft).
    #[serde(default)]
    pub avoid_slots: Vec<TimeslotId>,
    /// When non-empty, meetings outside these slots count as mismatches.
    #[serde(default)]
    pub preferred_slots: Vec<TimeslotId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Faculty {
    pub id: FacultyId,
    #[serde(default)]
    pub prefs: FacultyPrefs,
}

/// Approved leave: the faculty member teaches nothing on that day.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FacultyLeave {
    pub faculty_id: FacultyId,
    pub day: DayOfWeek,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SoftWeights {
    #[serde(default)]
    pub preference: f64,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub sync: f64,
    #[serde(default)]
    pub consecutive: f64,
}

impl Default for SoftWeights {
    fn default() -> Self {
        Self {
            preference: 1.0,
            balance: 1.0,
            sync: 1.0,
            consecutive: 1.0,
        }
    }
}

/// Institution-wide rule data, captured by value at the start of a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstitutionalRules {
    #[serde(default)]
    pub soft_weights: SoftWeights,
    /// Penalty added per hard violation. Large enough that any schedule
    /// with a hard violation ranks below every clean one.
    #[serde(default = "default_hard_penalty")]
    pub hard_penalty: f64,
    /// Longest run of back-to-back periods a section may have in one day.
    #[serde(default = "default_max_consecutive")]
    pub max_consecutive: u32,
    /// Target weekly hours per faculty for the balance term. Defaults to
    /// the mean load across all faculty in the catalog.
    #[serde(default)]
    pub target_weekly_hours: Option<f64>,
    /// Reserved slots, e.g. a lunch break.
    #[serde(default)]
    pub blackout_slots: Vec<TimeslotId>,
    /// Days with no teaching at all.
    #[serde(default)]
    pub blackout_days: Vec<DayOfWeek>,
    /// Paired elective sections that must meet in identical slots.
    #[serde(default)]
    pub elective_pairs: Vec<(SectionId, SectionId)>,
}

fn default_hard_penalty() -> f64 {
    1000.0
}

fn default_max_consecutive() -> u32 {
    3
}

impl Default for InstitutionalRules {
    fn default() -> Self {
        Self {
            soft_weights: SoftWeights::default(),
            hard_penalty: default_hard_penalty(),
            max_consecutive: default_max_consecutive(),
            target_weekly_hours: None,
            blackout_slots: Vec::new(),
            blackout_days: Vec::new(),
            elective_pairs: Vec::new(),
        }
    }
}

/// Read-only snapshot of one semester's scheduling inputs. Loaded up front
/// by the caller; the engine never reaches back to storage mid-run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Catalog {
    pub sections: Vec<Section>,
    pub rooms: Vec<Room>,
    pub timeslots: Vec<TimeSlot>,
    pub faculty: Vec<Faculty>,
    #[serde(default)]
    pub leaves: Vec<FacultyLeave>,
    #[serde(default)]
    pub rules: InstitutionalRules,
}

impl Catalog {
    /// Total required section-hours, which is also the gene count of every
    /// candidate timetable for this catalog.
    pub fn total_hours(&self) -> usize {
        self.sections.iter().map(|s| s.weekly_hours as usize).sum()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GaConfig {
    pub population_size: usize,
    pub max_generations: u32,
    pub tournament_size: usize,
    pub elite_count: usize,
    pub mutation_rate: f64,
    pub acceptance_threshold: f64,
    pub seed: u64,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            tournament_size: 3,
            elite_count: 2,
            mutation_rate: 0.05,
            acceptance_threshold: 0.0,
            seed: 0,
        }
    }
}

/// One scheduled meeting of the winning timetable.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct ScheduledMeeting {
    pub section_id: SectionId,
    pub room_id: RoomId,
    pub timeslot_id: TimeslotId,
    pub faculty_id: FacultyId,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    RoomClash,
    FacultyClash,
    GroupClash,
    SectionClash,
    RoomCapacity,
    RoomType,
    SlotBlackout,
    FacultyOnLeave,
}

/// One hard-constraint violation still present in the final timetable,
/// referencing the offending meetings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConflictRecord {
    pub kind: ConflictKind,
    pub meetings: Vec<ScheduledMeeting>,
    pub detail: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TerminationReason {
    /// Acceptance threshold met.
    Converged,
    /// Generation budget spent; best found is still returned.
    Exhausted,
    /// Cooperative stop; best found so far is returned.
    Cancelled,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerationResult {
    pub status: TerminationReason,
    pub schedule: Vec<ScheduledMeeting>,
    pub conflicts: Vec<ConflictRecord>,
    pub generations_run: u32,
    pub final_fitness: f64,
    pub stats: serde_json::Value,
}
