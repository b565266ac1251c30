use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use walkdir::WalkDir;

use survmask::config::{DEFAULT_PROFILE, ProjectConfig};
use survmask::logger::{Level, log_error, log_warn, set_log_file, set_max_level};
use survmask::pipeline::DEFAULT_SEED;
use survmask::{
    CsvDataset, DatasetSource, MissingnessPlan, OutcomeColumns, OutputLayout, PlanSource,
    PrepareOptions, TierLayout, build_plan, prepare_dataset,
};

#[derive(Parser)]
#[command(
    name = "survmask",
    version,
    about = "Derive survival datasets with reproducible injected missingness"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write complete and masked tables plus a missingness report for each input.
    Prepare(Box<PrepareArgs>),
    /// Print the tier plan that would be drawn for an input, as JSON.
    Plan(PlanArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TierPreset {
    /// age, two rare, one moderate and one frequent column.
    Standard,
    /// age, one rare and one frequent column.
    Compact,
}

impl TierPreset {
    fn layout(self) -> TierLayout {
        match self {
            Self::Standard => TierLayout::standard(),
            Self::Compact => TierLayout::compact(),
        }
    }
}

#[derive(Parser, Clone)]
struct OutcomeOptions {
    /// Name of the event indicator column.
    #[arg(long, default_value = "event", help_heading = "Dataset")]
    event_column: String,

    /// Name of the time-to-event column.
    #[arg(long, default_value = "time", help_heading = "Dataset")]
    time_column: String,

    /// Separate outcome file placed before the features (single input only).
    #[arg(long, value_name = "FILE", help_heading = "Dataset")]
    outcome: Option<PathBuf>,

    /// Input/output field delimiter.
    #[arg(long, default_value_t = ',', help_heading = "Dataset")]
    delimiter: char,
}

impl OutcomeOptions {
    fn columns(&self) -> OutcomeColumns {
        OutcomeColumns::new(&self.event_column, &self.time_column)
    }

    fn delimiter(&self) -> Result<u8, AnyError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| format!("delimiter {:?} is not a single ASCII character", self.delimiter).into())
    }

    fn dataset(&self, input: &Path) -> Result<CsvDataset, AnyError> {
        let mut dataset = CsvDataset::open(input)?.with_delimiter(self.delimiter()?);
        if let Some(outcome) = &self.outcome {
            dataset = dataset.with_outcome_file(outcome);
        }
        Ok(dataset)
    }
}

#[derive(Parser, Clone)]
struct TierOptions {
    /// Seed for plan sampling and masking.
    #[arg(long, default_value_t = DEFAULT_SEED, help_heading = "Plan")]
    seed: u64,

    /// Tier layout used to draw the plan.
    #[arg(long, value_enum, default_value_t = TierPreset::Standard, help_heading = "Plan")]
    tiers: TierPreset,
}

#[derive(Parser, Clone)]
struct PrepareArgs {
    /// Input files or directories (recurses directories for .csv/.tsv files).
    #[arg(required = true, value_name = "PATH", help_heading = "Input")]
    inputs: Vec<PathBuf>,

    #[command(flatten)]
    dataset: OutcomeOptions,

    #[command(flatten)]
    tiers: TierOptions,

    /// Fixed plan as JSON (`[{"columns": [...], "probability": p}]`) instead of tiers.
    #[arg(long, value_name = "FILE", conflicts_with = "tiers", help_heading = "Plan")]
    plan: Option<PathBuf>,

    /// Project configuration file.
    #[arg(
        long,
        value_name = "FILE",
        default_value = "config.toml",
        help_heading = "Output"
    )]
    config: PathBuf,

    /// Configuration profile providing the project root.
    #[arg(long, default_value = DEFAULT_PROFILE, help_heading = "Output")]
    profile: String,

    /// Project root, overriding the configuration file.
    #[arg(long, value_name = "DIR", help_heading = "Output")]
    out_dir: Option<PathBuf>,

    /// Number of concurrent worker threads.
    #[arg(long, help_heading = "Execution")]
    jobs: Option<usize>,

    /// Stop on first error.
    #[arg(long, help_heading = "Execution")]
    fail_fast: bool,

    /// Write log messages to a file in addition to stderr.
    #[arg(long, value_name = "FILE", help_heading = "Logging")]
    log_file: Option<PathBuf>,

    /// Log per-group masking details.
    #[arg(short, long, action = ArgAction::Count, help_heading = "Logging")]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose", help_heading = "Logging")]
    quiet: bool,
}

#[derive(Parser, Clone)]
struct PlanArgs {
    /// Input file whose predictor columns are sampled.
    input: PathBuf,

    #[command(flatten)]
    dataset: OutcomeOptions,

    #[command(flatten)]
    tiers: TierOptions,
}

type AnyError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), AnyError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Prepare(args) => run_prepare(&args),
        Command::Plan(args) => run_plan(&args),
    }
}

fn run_prepare(args: &PrepareArgs) -> Result<(), AnyError> {
    set_max_level(match (args.quiet, args.verbose) {
        (true, _) => Level::Warn,
        (false, 0) => Level::Info,
        (false, _) => Level::Debug,
    });
    if let Some(path) = &args.log_file {
        set_log_file(path)?;
    }
    if let Some(jobs) = args.jobs {
        // Best-effort: configure global rayon pool once. Ignore error if already set.
        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global();
    }

    let layout = match &args.out_dir {
        Some(dir) => OutputLayout::new(dir.clone()),
        None => ProjectConfig::load(&args.config)?.output_layout(&args.profile)?,
    };

    let plan = match &args.plan {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            PlanSource::Fixed(MissingnessPlan::from_json_reader(std::io::BufReader::new(file))?)
        }
        None => PlanSource::Tiers(args.tiers.tiers.layout()),
    };
    let options = PrepareOptions {
        seed: args.tiers.seed,
        plan,
        outcome: args.dataset.columns(),
        delimiter: args.dataset.delimiter()?,
    };

    let files = discover_inputs(&args.inputs);
    if files.is_empty() {
        return Err("no .csv or .tsv inputs found".into());
    }
    if args.dataset.outcome.is_some() && files.len() != 1 {
        return Err("--outcome requires a single input".into());
    }

    let datasets = files
        .iter()
        .map(|input| args.dataset.dataset(input))
        .collect::<Result<Vec<_>, _>>()?;
    check_unique_names(&datasets)?;

    let process = |dataset: &CsvDataset| -> Result<(), AnyError> {
        prepare_dataset(dataset, &layout, &options)
            .map(|_| ())
            .map_err(|e| format!("{}: {e}", dataset.name()).into())
    };

    if args.fail_fast {
        datasets
            .par_iter()
            .map(process)
            .collect::<Result<Vec<()>, AnyError>>()?;
    } else {
        let failures = datasets
            .par_iter()
            .map(|dataset| {
                let res = process(dataset);
                if let Err(ref e) = res {
                    log_error(&e.to_string());
                }
                res
            })
            .filter(Result::is_err)
            .count();
        if failures > 0 {
            return Err(format!("completed with {failures} failures").into());
        }
    }

    Ok(())
}

fn run_plan(args: &PlanArgs) -> Result<(), AnyError> {
    let dataset = args.dataset.dataset(&args.input)?;
    let table = dataset.load(&args.dataset.columns())?;
    let plan = build_plan(
        &table.predictor_names(),
        &args.tiers.tiers.layout(),
        args.tiers.seed,
    )?;
    println!("{}", plan.to_json_pretty()?);
    Ok(())
}

fn discover_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .follow_links(false)
                .into_iter()
                .filter_map(Result::ok)
            {
                let path = entry.path();
                if path.is_file() && is_delimited(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            log_warn(&format!("{} does not exist; skipping", input.display()));
        }
    }
    files.sort();
    files.dedup();
    files
}

fn is_delimited(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv") || e.eq_ignore_ascii_case("tsv"))
}

/// Datasets sharing a name would write the same output files.
fn check_unique_names(datasets: &[CsvDataset]) -> Result<(), AnyError> {
    let mut seen: HashMap<&str, &Path> = HashMap::with_capacity(datasets.len());
    for dataset in datasets {
        if let Some(first) = seen.insert(dataset.name(), dataset.features_path()) {
            return Err(format!(
                "{} and {} both map to dataset '{}'",
                first.display(),
                dataset.features_path().display(),
                dataset.name()
            )
            .into());
        }
    }
    Ok(())
}
