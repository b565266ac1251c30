use rand::distr::{Bernoulli, Distribution};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::dataset::RecordTable;
use crate::error::{Error, PlanSite, Result};
use crate::logger::{Level, enabled, log_debug};
use crate::plan::MissingnessPlan;
use crate::report::MissingnessReport;

/// Generator used for every seeded draw in the crate.
pub type SeededRng = Pcg32;

/// Creates the generator `inject` and `build_plan` use for `seed`.
#[must_use]
pub fn seeded_rng(seed: u64) -> SeededRng {
    Pcg32::seed_from_u64(seed)
}

/// Masks a copy of `table` according to `plan`, drawing from a generator
/// seeded with `seed`, and reports intended vs. realized missingness.
///
/// The same `(table, plan, seed)` always yields the same masked table.
///
/// # Errors
///
/// See [`inject_with_rng`].
pub fn inject(
    table: &RecordTable,
    plan: &MissingnessPlan,
    seed: u64,
) -> Result<(RecordTable, MissingnessReport)> {
    let mut rng = seeded_rng(seed);
    inject_with_rng(table, plan, &mut rng)
}

/// Like [`inject`], with a caller-supplied generator.
///
/// Draw order: groups in plan order, columns in group order, rows top to
/// bottom. Every cell of a planned column consumes exactly one trial, even
/// when it is already missing; a successful trial on a present cell replaces
/// it with an injected missing marker.
///
/// # Errors
///
/// Returns [`Error::MalformedTable`] for a table without rows and
/// [`Error::PlanViolation`] when the plan does not fit the table. Validation
/// happens before any draw, and `table` itself is never modified.
pub fn inject_with_rng<R: Rng>(
    table: &RecordTable,
    plan: &MissingnessPlan,
    rng: &mut R,
) -> Result<(RecordTable, MissingnessReport)> {
    if table.row_count() == 0 {
        return Err(Error::malformed("cannot inject missingness into a table without rows"));
    }
    let groups = plan.resolve(table)?;

    let mut masked = table.clone();
    for (index, group) in groups.iter().enumerate() {
        let trial = Bernoulli::new(group.probability)
            .map_err(|err| Error::plan(PlanSite::group(index), err.to_string()))?;
        for &column in &group.columns {
            let mut newly_masked = 0usize;
            for row in 0..masked.row_count() {
                if trial.sample(rng) && masked.mask_cell(row, column) {
                    newly_masked += 1;
                }
            }
            if enabled(Level::Debug) {
                log_debug(&format!(
                    "group {index}: masked {newly_masked} cells in '{}' (p = {})",
                    masked.columns()[column].name,
                    group.probability
                ));
            }
        }
    }

    let report = MissingnessReport::from_table(&masked, plan);
    Ok((masked, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellValue, MissingValue};
    use crate::dataset::OutcomeColumns;

    fn small_table(rows: usize) -> RecordTable {
        let names = ["event", "time", "age", "x1"]
            .into_iter()
            .map(String::from)
            .collect();
        let rows = (0..rows)
            .map(|i| {
                let i = i64::try_from(i).expect("small index");
                vec![
                    CellValue::Int(i % 2),
                    CellValue::Int(i + 1),
                    CellValue::Int(40 + i),
                    CellValue::Int(i),
                ]
            })
            .collect();
        RecordTable::new(names, rows, &OutcomeColumns::default()).expect("valid table")
    }

    #[test]
    fn empty_table_is_rejected() {
        let table = small_table(0);
        let plan = MissingnessPlan::new().with_group(["age"], 0.5);
        let err = inject(&table, &plan, 1).unwrap_err();
        assert!(matches!(err, Error::MalformedTable { .. }), "{err:?}");
    }

    #[test]
    fn empty_plan_leaves_table_untouched() {
        let table = small_table(5);
        let (masked, report) = inject(&table, &MissingnessPlan::new(), 3).expect("inject");
        assert_eq!(masked, table);
        assert!(report.entries().iter().all(|entry| entry.n_missing == 0));
    }

    #[test]
    fn trials_are_drawn_for_already_missing_cells() {
        // Masking x1 after age must see the same stream position whether or
        // not age already had missing cells.
        let complete = small_table(50);
        let mut partial = complete.clone();
        partial.mask_cell(0, 2);
        partial.mask_cell(1, 2);

        let plan = MissingnessPlan::new()
            .with_group(["age"], 0.3)
            .with_group(["x1"], 0.3);
        let (a, _) = inject(&complete, &plan, 11).expect("inject complete");
        let (b, _) = inject(&partial, &plan, 11).expect("inject partial");

        let x1_a: Vec<_> = a.column_values(3).collect();
        let x1_b: Vec<_> = b.column_values(3).collect();
        assert_eq!(x1_a, x1_b);
    }

    #[test]
    fn injected_marker_only_on_newly_masked_cells() {
        let complete = small_table(10);
        let mut rows = complete.rows().to_vec();
        rows[4][2] = CellValue::Missing(MissingValue::Source);
        let table = RecordTable::new(
            complete.column_names().map(String::from).collect(),
            rows,
            &OutcomeColumns::default(),
        )
        .expect("valid table");

        let plan = MissingnessPlan::new().with_group(["age"], 1.0);
        let (masked, _) = inject(&table, &plan, 0).expect("inject");
        assert_eq!(
            masked.cell(4, 2),
            Some(&CellValue::Missing(MissingValue::Source))
        );
        assert_eq!(
            masked.cell(5, 2),
            Some(&CellValue::Missing(MissingValue::Injected))
        );
    }
}
