//! Missingness plans: disjoint predictor column groups, each with a per-cell
//! missing probability.
//!
//! Plans are either written by hand (in code or as JSON) or drawn at random
//! from a [`TierLayout`] with [`build_plan`]. Either way they are checked
//! against the target table before any cell is touched.

mod tiers;

use std::collections::HashSet;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::dataset::RecordTable;
use crate::error::{Error, PlanSite, Result};

pub use tiers::{PrimaryTier, Tier, TierLayout, build_plan, build_plan_with_rng};

/// One group of predictor columns sharing a missing probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnGroup {
    pub columns: Vec<String>,
    pub probability: f64,
}

impl ColumnGroup {
    #[must_use]
    pub fn new<I, S>(columns: I, probability: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            probability,
        }
    }
}

/// Ordered sequence of column groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissingnessPlan {
    groups: Vec<ColumnGroup>,
}

/// A plan whose column names have been resolved to table indices.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedGroup {
    pub columns: Vec<usize>,
    pub probability: f64,
}

impl MissingnessPlan {
    #[must_use]
    pub const fn new() -> Self {
        Self { groups: Vec::new() }
    }

    #[must_use]
    pub fn with_group<I, S>(mut self, columns: I, probability: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.push(ColumnGroup::new(columns, probability));
        self
    }

    pub fn push_group(&mut self, group: ColumnGroup) {
        self.groups.push(group);
    }

    #[must_use]
    pub fn groups(&self) -> &[ColumnGroup] {
        &self.groups
    }

    /// Probability assigned to `column`, if any group covers it.
    #[must_use]
    pub fn probability_for(&self, column: &str) -> Option<f64> {
        self.groups
            .iter()
            .find(|group| group.columns.iter().any(|name| name == column))
            .map(|group| group.probability)
    }

    /// Reads a plan from JSON: `[{"columns": [...], "probability": p}, ...]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] when the input is not a valid plan document.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Renders the plan as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the plan against `table` and resolves column names to indices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlanViolation`] when a group is empty, a probability
    /// lies outside `(0, 1]`, or a column is unknown, an outcome column, or
    /// listed more than once.
    pub(crate) fn resolve(&self, table: &RecordTable) -> Result<Vec<ResolvedGroup>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut resolved = Vec::with_capacity(self.groups.len());

        for (index, group) in self.groups.iter().enumerate() {
            let site = || PlanSite::group(index);
            if group.columns.is_empty() {
                return Err(Error::plan(site(), "group lists no columns"));
            }
            check_probability(group.probability).map_err(|details| Error::plan(site(), details))?;

            let mut columns = Vec::with_capacity(group.columns.len());
            for name in &group.columns {
                let column = table.column(name).ok_or_else(|| {
                    Error::plan(site(), format!("column '{name}' does not exist"))
                })?;
                if column.is_outcome() {
                    return Err(Error::plan(
                        site(),
                        format!("column '{name}' is an outcome column"),
                    ));
                }
                if !seen.insert(name.as_str()) {
                    return Err(Error::plan(
                        site(),
                        format!("column '{name}' appears in more than one group"),
                    ));
                }
                columns.push(column.index);
            }
            resolved.push(ResolvedGroup {
                columns,
                probability: group.probability,
            });
        }
        Ok(resolved)
    }
}

pub(crate) fn check_probability(probability: f64) -> std::result::Result<(), String> {
    if probability.is_finite() && probability > 0.0 && probability <= 1.0 {
        Ok(())
    } else {
        Err(format!("probability {probability} is outside (0, 1]"))
    }
}
