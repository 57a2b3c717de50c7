//! Turns the winning chromosome into the external result shape.

use ttgen_core::index::{CatalogIndex, Gene};
use ttgen_core::scoring::Evaluation;
use types::{GenerationResult, TerminationReason};

pub fn result(
    idx: &CatalogIndex,
    genes: &[Gene],
    eval: &Evaluation,
    status: TerminationReason,
    generations_run: u32,
    population_size: usize,
) -> GenerationResult {
    GenerationResult {
        status,
        schedule: genes.iter().map(|g| idx.meeting(g)).collect(),
        conflicts: eval.conflicts.clone(),
        generations_run,
        final_fitness: eval.fitness,
        stats: serde_json::json!({
            "method": "ga",
            "population": population_size,
            "hard_violations": eval.hard_count(),
            "soft_violations": eval.soft_count(),
            "workload_variance": eval.soft.workload_variance,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttgen_core::index::CatalogIndex;
    use ttgen_core::scoring;
    use types::*;

    #[test]
    fn schedule_rows_follow_gene_order() {
        let cat = Catalog {
            sections: vec![Section {
                id: SectionId("algo".into()),
                faculty_id: FacultyId("knuth".into()),
                group_id: None,
                weekly_hours: 2,
                room_kind: RoomKind::Lecture,
                size: 10,
            }],
            rooms: vec![Room {
                id: RoomId("aud1".into()),
                capacity: 80,
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
                    id: TimeslotId("wed.1".into()),
                    day: DayOfWeek::Wed,
                    period: 1,
                    duration: 1,
                },
            ],
            faculty: vec![Faculty {
                id: FacultyId("knuth".into()),
                prefs: FacultyPrefs::default(),
            }],
            leaves: vec![],
            rules: InstitutionalRules::default(),
        };
        let idx = CatalogIndex::new(&cat);
        let genes = vec![
            Gene {
                section: 0,
                slot: 0,
                room: 0,
            },
            Gene {
                section: 0,
                slot: 1,
                room: 0,
            },
        ];
        let eval = scoring::evaluate(&idx, &genes);
        let res = result(&idx, &genes, &eval, TerminationReason::Converged, 1, 50);
        assert_eq!(res.schedule.len(), 2);
        assert_eq!(res.schedule[0].timeslot_id.0, "mon.1");
        assert_eq!(res.schedule[1].timeslot_id.0, "wed.1");
        assert_eq!(res.schedule[0].faculty_id.0, "knuth");
        assert!(res.conflicts.is_empty());
        assert_eq!(res.stats["method"], "ga");
    }
}
