use survmask::{CellValue, MissingValue, MissingnessPlan, OutcomeColumns, RecordTable};

#[allow(dead_code)]
pub const SCENARIO_COLUMNS: [&str; 7] = ["event", "time", "age", "x1", "x2", "x3", "x4"];

/// Complete table with outcome columns first, then `age` and `x1`..`x4`.
#[allow(dead_code)]
pub fn scenario_table(rows: usize) -> RecordTable {
    let names = SCENARIO_COLUMNS.iter().map(|name| (*name).to_owned()).collect();
    let rows = (0..rows)
        .map(|i| {
            let i = i64::try_from(i).expect("row index fits i64");
            vec![
                CellValue::Int(i % 3 % 2),
                CellValue::Float(i as f64 * 1.5 + 0.5),
                CellValue::Int(35 + i % 40),
                CellValue::Float((i % 7) as f64 / 10.0),
                CellValue::Int(i % 5),
                CellValue::Text(if i % 2 == 0 { "pos" } else { "neg" }.to_owned()),
                CellValue::Float(i as f64),
            ]
        })
        .collect();
    RecordTable::new(names, rows, &OutcomeColumns::default()).expect("scenario table is valid")
}

/// `{age}: 0.15, {x1, x2}: 0.01, {x3}: 0.15, {x4}: 0.4`
#[allow(dead_code)]
pub fn scenario_plan() -> MissingnessPlan {
    MissingnessPlan::new()
        .with_group(["age"], 0.15)
        .with_group(["x1", "x2"], 0.01)
        .with_group(["x3"], 0.15)
        .with_group(["x4"], 0.4)
}

/// Copy of `table` with the given `(row, column)` cells missing in the source.
#[allow(dead_code)]
pub fn with_source_missing(table: &RecordTable, cells: &[(usize, usize)]) -> RecordTable {
    let mut rows = table.rows().to_vec();
    for &(row, column) in cells {
        rows[row][column] = CellValue::Missing(MissingValue::Source);
    }
    RecordTable::new(
        table.column_names().map(str::to_owned).collect(),
        rows,
        &OutcomeColumns::default(),
    )
    .expect("table stays valid")
}

/// Counts missing cells by walking rows directly.
#[allow(dead_code)]
pub fn recount_missing(table: &RecordTable, column: usize) -> usize {
    table
        .rows()
        .iter()
        .filter(|row| matches!(row[column], CellValue::Missing(_)))
        .count()
}
