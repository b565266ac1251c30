#![allow(clippy::pedantic)]

mod common;

use common::{recount_missing, scenario_plan, scenario_table, with_source_missing};
use rand::distr::{Bernoulli, Distribution};
use survmask::{
    CellValue, Error, MissingValue, MissingnessPlan, PlanSite, inject, inject_with_rng,
    seeded_rng,
};

#[test]
fn same_seed_yields_identical_output() {
    let table = scenario_table(200);
    let plan = scenario_plan();

    let (first, first_report) = inject(&table, &plan, 42).expect("inject");
    let (second, second_report) = inject(&table, &plan, 42).expect("inject");

    assert_eq!(first, second);
    assert_eq!(first_report, second_report);
}

#[test]
fn different_seeds_yield_different_masks() {
    let table = scenario_table(200);
    let plan = scenario_plan();

    let (first, _) = inject(&table, &plan, 42).expect("inject");
    let (second, _) = inject(&table, &plan, 7).expect("inject");

    assert_ne!(first, second);
}

#[test]
fn input_table_is_left_untouched() {
    let table = scenario_table(50);
    let before = table.clone();
    let _ = inject(&table, &MissingnessPlan::new().with_group(["x1"], 1.0), 1).expect("inject");
    assert_eq!(table, before);
}

#[test]
fn masking_only_turns_planned_predictor_cells_missing() {
    let table = scenario_table(200);
    let plan = MissingnessPlan::new()
        .with_group(["x1", "x3"], 0.5)
        .with_group(["age"], 0.3);
    let (masked, _) = inject(&table, &plan, 11).expect("inject");

    assert_eq!(masked.column_names().collect::<Vec<_>>(), common::SCENARIO_COLUMNS);
    assert_eq!(masked.row_count(), table.row_count());

    let planned = ["age", "x1", "x3"];
    for column in table.columns() {
        for (row, original) in table.rows().iter().enumerate() {
            let after = &masked.rows()[row][column.index];
            let before = &original[column.index];
            if planned.contains(&column.name.as_str()) {
                assert!(
                    after == before || *after == CellValue::Missing(MissingValue::Injected),
                    "row {row}, column {}: {before:?} became {after:?}",
                    column.name
                );
            } else {
                assert_eq!(after, before, "row {row}, column {}", column.name);
            }
        }
    }
}

#[test]
fn pre_existing_missing_cells_stay_missing() {
    let source = scenario_table(100);
    let x1 = source.column_index("x1").expect("x1");
    let x4 = source.column_index("x4").expect("x4");
    let holes = [(0, x1), (17, x1), (42, x4), (99, x4)];
    let table = with_source_missing(&source, &holes);

    let (masked, report) = inject(&table, &scenario_plan(), 42).expect("inject");

    for &(row, column) in &holes {
        assert_eq!(
            masked.cell(row, column),
            Some(&CellValue::Missing(MissingValue::Source))
        );
    }
    let x1_entry = report.entry("x1").expect("x1 entry");
    assert!(x1_entry.n_missing >= 2);
    assert_eq!(x1_entry.n_missing, recount_missing(&masked, x1));
}

#[test]
fn overlapping_groups_are_rejected() {
    let table = scenario_table(20);
    let plan = MissingnessPlan::new()
        .with_group(["x1", "x2"], 0.2)
        .with_group(["x2"], 0.4);

    match inject(&table, &plan, 42) {
        Err(Error::PlanViolation { site, details }) => {
            assert_eq!(site, PlanSite::Group { index: 1 });
            assert!(details.contains("x2"), "{details}");
        }
        other => panic!("expected plan violation, got {other:?}"),
    }
}

#[test]
fn outcome_columns_cannot_be_planned() {
    let table = scenario_table(20);
    for outcome in ["event", "time"] {
        let plan = MissingnessPlan::new()
            .with_group(["x1"], 0.2)
            .with_group([outcome], 0.5);
        match inject(&table, &plan, 42) {
            Err(Error::PlanViolation { site, details }) => {
                assert_eq!(site, PlanSite::group(1));
                assert!(details.contains("outcome"), "{details}");
            }
            other => panic!("expected plan violation for {outcome}, got {other:?}"),
        }
    }
}

#[test]
fn unknown_columns_are_rejected() {
    let table = scenario_table(20);
    let plan = MissingnessPlan::new().with_group(["x9"], 0.5);
    let err = inject(&table, &plan, 42).unwrap_err();
    assert!(
        matches!(err, Error::PlanViolation { site: PlanSite::Group { index: 0 }, .. }),
        "{err:?}"
    );
}

#[test]
fn invalid_probabilities_are_rejected() {
    let table = scenario_table(20);
    for probability in [0.0, -0.1, 1.5, f64::NAN] {
        let plan = MissingnessPlan::new().with_group(["x1"], probability);
        let err = inject(&table, &plan, 42).unwrap_err();
        assert!(matches!(err, Error::PlanViolation { .. }), "{probability}: {err:?}");
    }
}

#[test]
fn report_matches_recount_of_masked_table() {
    let table = scenario_table(200);
    let (masked, report) = inject(&table, &scenario_plan(), 3).expect("inject");

    assert_eq!(report.row_count(), 200);
    assert_eq!(report.entries().len(), masked.columns().len());
    for (column, entry) in masked.columns().iter().zip(report.entries()) {
        assert_eq!(entry.variable, column.name);
        let expected = recount_missing(&masked, column.index);
        assert_eq!(entry.n_missing, expected, "{}", column.name);
        let pct = (expected as f64 / 200.0 * 100.0 * 100.0).round() / 100.0;
        assert!((entry.pct_missing - pct).abs() < 1e-9, "{}", column.name);
    }
}

#[test]
fn scenario_with_seed_42() {
    let table = scenario_table(200);
    let plan = scenario_plan();
    let (masked, report) = inject(&table, &plan, 42).expect("inject");

    let variables: Vec<_> = report.entries().iter().map(|e| e.variable.as_str()).collect();
    assert_eq!(variables, common::SCENARIO_COLUMNS);

    for outcome in ["event", "time"] {
        let entry = report.entry(outcome).expect("outcome entry");
        assert_eq!(entry.intended_p, None);
        assert_eq!(entry.n_missing, 0);
        assert_eq!(entry.pct_missing, 0.0);
    }
    for (name, p) in [("age", 0.15), ("x1", 0.01), ("x2", 0.01), ("x3", 0.15), ("x4", 0.4)] {
        assert_eq!(report.entry(name).expect(name).intended_p, Some(p));
    }

    let (again, _) = inject(&table, &plan, 42).expect("inject");
    assert_eq!(masked, again);

    let mut csv = Vec::new();
    report.write_csv(&mut csv).expect("write report");
    let csv = String::from_utf8(csv).expect("utf8 report");
    insta::assert_snapshot!(csv.trim_end(), @r"
    variable,intended_p,n_missing,pct_missing
    event,,0,0.0
    time,,0,0.0
    age,0.15,24,12.0
    x1,0.01,2,1.0
    x2,0.01,3,1.5
    x3,0.15,16,8.0
    x4,0.4,93,46.5
    ");
}

#[test]
fn probability_one_masks_every_cell() {
    let table = scenario_table(64);
    let plan = MissingnessPlan::new().with_group(["x2", "x3"], 1.0);

    for seed in [0, 42, u64::MAX] {
        let (masked, report) = inject(&table, &plan, seed).expect("inject");
        for name in ["x2", "x3"] {
            let index = masked.column_index(name).expect(name);
            assert!(masked.column_values(index).all(CellValue::is_missing));
            let entry = report.entry(name).expect(name);
            assert_eq!(entry.n_missing, 64);
            assert_eq!(entry.pct_missing, 100.0);
        }
        assert_eq!(report.entry("x1").expect("x1").n_missing, 0);
    }
}

#[test]
fn realized_rate_tracks_probability() {
    let table = scenario_table(2000);
    let plan = MissingnessPlan::new().with_group(["x4"], 0.4);
    let (_, report) = inject(&table, &plan, 42).expect("inject");

    let pct = report.entry("x4").expect("x4").pct_missing;
    assert!((30.0..=50.0).contains(&pct), "realized {pct}%");
}

#[test]
fn seeded_injection_matches_explicit_generator() {
    let table = scenario_table(120);
    let plan = scenario_plan();

    let (seeded, _) = inject(&table, &plan, 99).expect("inject");
    let mut rng = seeded_rng(99);
    let (explicit, _) = inject_with_rng(&table, &plan, &mut rng).expect("inject");

    assert_eq!(seeded, explicit);
}

#[test]
fn trials_run_group_then_column_then_row() {
    let table = with_source_missing(&scenario_table(80), &[(5, 3)]);
    let plan = MissingnessPlan::new()
        .with_group(["x3", "x1"], 0.3)
        .with_group(["age"], 0.6);
    let (masked, _) = inject(&table, &plan, 2024).expect("inject");

    let mut rng = seeded_rng(2024);
    let mut expected = table.rows().to_vec();
    for group in plan.groups() {
        let trial = Bernoulli::new(group.probability).expect("probability");
        for name in &group.columns {
            let column = table.column_index(name).expect("column");
            for row in expected.iter_mut() {
                if trial.sample(&mut rng) && !row[column].is_missing() {
                    row[column] = CellValue::Missing(MissingValue::Injected);
                }
            }
        }
    }

    assert_eq!(masked.rows(), expected.as_slice());
}

#[test]
fn empty_table_is_malformed() {
    let table = scenario_table(0);
    let err = inject(&table, &scenario_plan(), 42).unwrap_err();
    assert!(matches!(err, Error::MalformedTable { .. }), "{err:?}");
}
