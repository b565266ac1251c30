use std::borrow::Cow;
use std::fmt;
use std::io;

/// Result type used across the missingness pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type surfaced by loading, planning, masking, and writing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O failure while reading inputs or writing outputs.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A missingness plan (or tier layout) is inconsistent with the table it targets.
    #[error("plan violation in {site}: {details}")]
    PlanViolation {
        site: PlanSite,
        details: Cow<'static, str>,
    },

    /// Not enough predictor columns to fill the requested tiers.
    #[error("insufficient predictor columns: tiers require {required}, only {available} available")]
    InsufficientColumns { required: usize, available: usize },

    /// The record table does not have the expected shape.
    #[error("malformed table: {details}")]
    MalformedTable { details: Cow<'static, str> },

    /// Project configuration could not be read or interpreted.
    #[error("invalid configuration: {details}")]
    Config { details: Cow<'static, str> },

    /// Failure while reading or writing delimited text.
    #[error("csv error: {details}")]
    Csv { details: Cow<'static, str> },

    /// Failure while reading or writing JSON plans.
    #[error("serialization error: {details}")]
    Serialization { details: Cow<'static, str> },
}

impl Error {
    pub(crate) fn plan(site: PlanSite, details: impl Into<Cow<'static, str>>) -> Self {
        Self::PlanViolation {
            site,
            details: details.into(),
        }
    }

    pub(crate) fn malformed(details: impl Into<Cow<'static, str>>) -> Self {
        Self::MalformedTable {
            details: details.into(),
        }
    }
}

/// Part of a plan used for diagnostic reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSite {
    Group { index: usize },
    Tier { name: String },
}

impl PlanSite {
    #[must_use]
    pub const fn group(index: usize) -> Self {
        Self::Group { index }
    }

    #[must_use]
    pub fn tier(name: impl Into<String>) -> Self {
        Self::Tier { name: name.into() }
    }
}

impl fmt::Display for PlanSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group { index } => write!(f, "group {index}"),
            Self::Tier { name } => write!(f, "tier '{name}'"),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            details: Cow::Owned(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            details: Cow::Owned(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            details: Cow::Owned(err.to_string()),
        }
    }
}
