//! Reproducible missingness injection for survival-analysis datasets.
//!
//! A record table (predictor columns plus an event and a time outcome column)
//! is masked according to a [`MissingnessPlan`]: disjoint predictor groups,
//! each with an independent per-cell Bernoulli probability, drawn from a
//! generator seeded by the caller. The masked copy comes with a
//! [`MissingnessReport`] of intended vs. realized missingness per column.

pub mod cell;
pub mod config;
pub mod dataset;
pub mod error;
pub mod inject;
pub mod logger;
pub mod pipeline;
pub mod plan;
pub mod report;
pub mod sinks;
pub mod source;

pub use crate::error::{Error, PlanSite, Result};
pub use cell::{CellValue, MissingValue};
pub use config::ProjectConfig;
pub use dataset::{OutcomeColumns, RecordTable};
pub use inject::{inject, inject_with_rng, seeded_rng};
pub use pipeline::{OutputLayout, PlanSource, PrepareOptions, PrepareSummary, prepare_dataset};
pub use plan::{ColumnGroup, MissingnessPlan, TierLayout, build_plan, build_plan_with_rng};
pub use report::{MissingnessReport, ReportEntry};
pub use sinks::{CsvSink, RowSink, SinkContext};
pub use source::{CsvDataset, DatasetSource, TableSource};
