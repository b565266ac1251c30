/// Column descriptor of a record table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub index: usize,
    pub name: String,
    pub role: ColumnRole,
}

impl Column {
    #[must_use]
    pub const fn is_outcome(&self) -> bool {
        matches!(self.role, ColumnRole::Outcome(_))
    }

    #[must_use]
    pub const fn is_predictor(&self) -> bool {
        matches!(self.role, ColumnRole::Predictor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Feature column eligible for missingness injection.
    Predictor,
    /// Reserved survival outcome column, never masked.
    Outcome(OutcomeKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Event,
    Time,
}

/// Names of the two reserved outcome columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeColumns {
    pub event: String,
    pub time: String,
}

impl Default for OutcomeColumns {
    fn default() -> Self {
        Self::new("event", "time")
    }
}

impl OutcomeColumns {
    #[must_use]
    pub fn new(event: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            time: time.into(),
        }
    }

    /// Role a column with `name` takes in a table using these outcome names.
    #[must_use]
    pub fn role_of(&self, name: &str) -> ColumnRole {
        if name == self.event {
            ColumnRole::Outcome(OutcomeKind::Event)
        } else if name == self.time {
            ColumnRole::Outcome(OutcomeKind::Time)
        } else {
            ColumnRole::Predictor
        }
    }
}
