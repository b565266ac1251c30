use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::Rng;
use tempfile::NamedTempFile;

use crate::dataset::{OutcomeColumns, RecordTable};
use crate::error::{Error, Result};
use crate::inject::{inject_with_rng, seeded_rng};
use crate::logger::{Level, enabled, log_debug, log_info, set_log_prefix};
use crate::plan::{MissingnessPlan, TierLayout, build_plan_with_rng};
use crate::report::MissingnessReport;
use crate::sinks::CsvSink;
use crate::source::DatasetSource;

/// Seed used by the CLI when none is given.
pub const DEFAULT_SEED: u64 = 42;

/// Resolves output file paths below a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    #[must_use]
    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    /// `<root>/data/<dataset>_survival.csv`
    #[must_use]
    pub fn complete_path(&self, dataset: &str) -> PathBuf {
        self.data_dir().join(format!("{dataset}_survival.csv"))
    }

    /// `<root>/data/<dataset>_survival_with_missingness.csv`
    #[must_use]
    pub fn masked_path(&self, dataset: &str) -> PathBuf {
        self.data_dir()
            .join(format!("{dataset}_survival_with_missingness.csv"))
    }

    /// `<root>/reports/<dataset>_survival_missingness_summary.csv`
    #[must_use]
    pub fn report_path(&self, dataset: &str) -> PathBuf {
        self.reports_dir()
            .join(format!("{dataset}_survival_missingness_summary.csv"))
    }
}

/// Where the missingness plan of a run comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanSource {
    /// Caller-supplied plan applied as is.
    Fixed(MissingnessPlan),
    /// Plan drawn from the table's predictor columns with [`build_plan_with_rng`].
    Tiers(TierLayout),
}

impl PlanSource {
    /// Fixed plans leave `rng` untouched; tier plans draw from it.
    ///
    /// # Errors
    ///
    /// Propagates [`build_plan_with_rng`] errors for tier layouts.
    pub fn plan_for<R: Rng>(&self, table: &RecordTable, rng: &mut R) -> Result<MissingnessPlan> {
        match self {
            Self::Fixed(plan) => Ok(plan.clone()),
            Self::Tiers(layout) => build_plan_with_rng(&table.predictor_names(), layout, rng),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub seed: u64,
    pub plan: PlanSource,
    pub outcome: OutcomeColumns,
    pub delimiter: u8,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            plan: PlanSource::Tiers(TierLayout::standard()),
            outcome: OutcomeColumns::default(),
            delimiter: b',',
        }
    }
}

/// Outcome of preparing one dataset.
#[derive(Debug, Clone)]
pub struct PrepareSummary {
    pub dataset: String,
    pub rows: usize,
    pub plan: MissingnessPlan,
    pub report: MissingnessReport,
    pub complete_path: PathBuf,
    pub masked_path: PathBuf,
    pub report_path: PathBuf,
}

/// Loads one dataset, masks it, and writes the complete table, the masked
/// table and the missingness report below `layout`.
///
/// One generator seeded with `options.seed` serves the tier draws first and
/// the masking trials after them. Outputs are staged next to their final
/// paths and only renamed into place once all three are fully written, so a
/// failure at any step leaves no output behind.
///
/// # Errors
///
/// Returns the first loading, planning, masking or I/O error. I/O errors name
/// the path involved.
pub fn prepare_dataset<S: DatasetSource + ?Sized>(
    source: &S,
    layout: &OutputLayout,
    options: &PrepareOptions,
) -> Result<PrepareSummary> {
    let dataset = source.name().to_owned();
    let _log_prefix = set_log_prefix(dataset.as_str());

    let table = source.load(&options.outcome)?;
    let mut rng = seeded_rng(options.seed);
    let plan = options.plan.plan_for(&table, &mut rng)?;
    if enabled(Level::Debug) {
        for (index, group) in plan.groups().iter().enumerate() {
            log_debug(&format!(
                "group {index}: {} at p = {}",
                group.columns.join(", "),
                group.probability
            ));
        }
    }
    let (masked, report) = inject_with_rng(&table, &plan, &mut rng)?;

    let complete_path = layout.complete_path(&dataset);
    let masked_path = layout.masked_path(&dataset);
    let report_path = layout.report_path(&dataset);

    let staged = [
        (stage_table(&table, &complete_path, options.delimiter)?, complete_path.as_path()),
        (stage_table(&masked, &masked_path, options.delimiter)?, masked_path.as_path()),
        (stage_report(&report, &report_path)?, report_path.as_path()),
    ];
    commit(staged)?;

    log_info(&format!(
        "{} rows, {} cells masked; missingness summary saved to {}",
        table.row_count(),
        report.total_missing(),
        report_path.display()
    ));

    Ok(PrepareSummary {
        dataset,
        rows: table.row_count(),
        plan,
        report,
        complete_path,
        masked_path,
        report_path,
    })
}

fn at_path(path: &Path, err: io::Error) -> Error {
    Error::Io(io::Error::new(
        err.kind(),
        format!("{}: {err}", path.display()),
    ))
}

/// Temporary file in the directory `path` will live in.
fn staging_file(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|err| at_path(dir, err))?;
    let mut builder = tempfile::Builder::new();
    builder.prefix(".survmask-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        // The mode `File::create` uses; the umask still applies.
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir).map_err(|err| at_path(path, err))
}

fn stage_table(table: &RecordTable, path: &Path, delimiter: u8) -> Result<NamedTempFile> {
    let mut staged = staging_file(path)?;
    let mut sink = CsvSink::new(BufWriter::new(staged.as_file_mut())).with_delimiter(delimiter);
    table.write_to(&mut sink)?;
    if let Some(mut file) = sink.into_output() {
        file.flush().map_err(|err| at_path(path, err))?;
    }
    Ok(staged)
}

fn stage_report(report: &MissingnessReport, path: &Path) -> Result<NamedTempFile> {
    let mut staged = staging_file(path)?;
    report.write_csv(BufWriter::new(staged.as_file_mut()))?;
    Ok(staged)
}

/// Renames staged files onto their targets. If a rename fails, targets
/// already renamed in this call are removed again.
fn commit<const N: usize>(staged: [(NamedTempFile, &Path); N]) -> Result<()> {
    let mut done: Vec<&Path> = Vec::with_capacity(N);
    for (file, path) in staged {
        if let Err(err) = file.persist(path) {
            for written in done {
                let _ = std::fs::remove_file(written);
            }
            return Err(at_path(path, err.error));
        }
        done.push(path);
    }
    Ok(())
}
