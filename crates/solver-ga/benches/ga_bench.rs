//! Criterion benchmarks for the genetic solver.
//!
//! Uses a synthetic mid-size catalog (20 sections, 6 faculty, a full
//! five-day grid) to measure end-to-end generation cost at a few
//! population sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use solver_ga::{GaSolver, NeverCancel};
use types::*;

fn bench_catalog() -> Catalog {
    let days = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
    ];
    let timeslots = days
        .iter()
        .flat_map(|&day| {
            (1u8..=6).map(move |period| TimeSlot {
                id: TimeslotId(format!("{day:?}.{period}").to_lowercase()),
                day,
                period,
                duration: 1,
            })
        })
        .collect();
    Catalog {
        sections: (0..20)
            .map(|i| Section {
                id: SectionId(format!("s{i}")),
                faculty_id: FacultyId(format!("f{}", i % 6)),
                group_id: Some(GroupId(format!("g{}", i % 4))),
                weekly_hours: 2 + (i % 3) as u32,
                room_kind: if i % 4 == 0 {
                    RoomKind::Lab
                } else {
                    RoomKind::Lecture
                },
                size: 20 + 5 * (i % 5) as u32,
            })
            .collect(),
        rooms: (0..8)
            .map(|i| Room {
                id: RoomId(format!("r{i}")),
                capacity: 30 + 10 * (i % 3) as u32,
                kind: if i % 4 == 0 {
                    RoomKind::Lab
                } else {
                    RoomKind::Lecture
                },
            })
            .collect(),
        timeslots,
        faculty: (0..6)
            .map(|i| Faculty {
                id: FacultyId(format!("f{i}")),
                prefs: FacultyPrefs::default(),
            })
            .collect(),
        leaves: vec![],
        rules: InstitutionalRules::default(),
    }
}

fn bench_generate(c: &mut Criterion) {
    let catalog = bench_catalog();
    let solver = GaSolver::new();
    let mut group = c.benchmark_group("ga_generate");
    for population in [20usize, 50] {
        let config = GaConfig {
            population_size: population,
            max_generations: 30,
            seed: 42,
            ..GaConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(population),
            &config,
            |b, cfg| b.iter(|| solver.generate(&catalog, cfg, &NeverCancel).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_generate);
criterion_main!(benches);
