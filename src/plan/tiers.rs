use rand::Rng;

use super::{ColumnGroup, MissingnessPlan, check_probability};
use crate::error::{Error, PlanSite, Result};
use crate::inject::seeded_rng;

/// Column that, when present, always forms its own group.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryTier {
    pub column: String,
    pub probability: f64,
}

/// A named probability level filled by sampling `size` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub name: String,
    pub size: usize,
    pub probability: f64,
}

impl Tier {
    #[must_use]
    pub fn new(name: impl Into<String>, size: usize, probability: f64) -> Self {
        Self {
            name: name.into(),
            size,
            probability,
        }
    }
}

/// Tier structure used by [`build_plan`].
#[derive(Debug, Clone, PartialEq)]
pub struct TierLayout {
    pub primary: Option<PrimaryTier>,
    pub tiers: Vec<Tier>,
}

impl TierLayout {
    /// `age` at 0.15, then two rare columns at 0.01, one moderate column at
    /// 0.15 and one frequent column at 0.4.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            primary: Some(PrimaryTier {
                column: "age".to_owned(),
                probability: 0.15,
            }),
            tiers: vec![
                Tier::new("rare", 2, 0.01),
                Tier::new("moderate", 1, 0.15),
                Tier::new("frequent", 1, 0.4),
            ],
        }
    }

    /// `age` at 0.15, then one rare column at 0.01 and one frequent column at 0.4.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            primary: Some(PrimaryTier {
                column: "age".to_owned(),
                probability: 0.15,
            }),
            tiers: vec![Tier::new("rare", 1, 0.01), Tier::new("frequent", 1, 0.4)],
        }
    }

    /// Number of non-primary columns the sampled tiers consume.
    #[must_use]
    pub fn required_columns(&self) -> usize {
        self.tiers.iter().map(|tier| tier.size).sum()
    }

    /// # Errors
    ///
    /// Returns [`Error::PlanViolation`] for an empty tier or a probability
    /// outside `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if let Some(primary) = &self.primary {
            check_probability(primary.probability)
                .map_err(|details| Error::plan(PlanSite::tier(&primary.column), details))?;
        }
        for tier in &self.tiers {
            if tier.size == 0 {
                return Err(Error::plan(
                    PlanSite::tier(&tier.name),
                    "tier must draw at least one column",
                ));
            }
            check_probability(tier.probability)
                .map_err(|details| Error::plan(PlanSite::tier(&tier.name), details))?;
        }
        Ok(())
    }
}

/// Draws a plan from `layout` using a generator seeded with `seed`.
///
/// Predictor names are sorted and de-duplicated first, so the result depends
/// only on the set of names, not on their order.
///
/// # Errors
///
/// See [`build_plan_with_rng`].
pub fn build_plan<S: AsRef<str>>(
    predictors: &[S],
    layout: &TierLayout,
    seed: u64,
) -> Result<MissingnessPlan> {
    let mut rng = seeded_rng(seed);
    build_plan_with_rng(predictors, layout, &mut rng)
}

/// Draws a plan from `layout` with a caller-supplied generator.
///
/// Draw order: the primary column (if present) is taken without a draw; then
/// for each tier in order, `size` times, an index is drawn uniformly from the
/// sorted remainder and that column is removed from it.
///
/// # Errors
///
/// Returns [`Error::PlanViolation`] when the layout is invalid and
/// [`Error::InsufficientColumns`] when fewer non-primary predictors exist than
/// the tiers consume. Both are raised before any random draw.
pub fn build_plan_with_rng<S, R>(
    predictors: &[S],
    layout: &TierLayout,
    rng: &mut R,
) -> Result<MissingnessPlan>
where
    S: AsRef<str>,
    R: Rng,
{
    layout.validate()?;

    let mut remaining: Vec<&str> = predictors.iter().map(AsRef::as_ref).collect();
    remaining.sort_unstable();
    remaining.dedup();

    let mut plan = MissingnessPlan::new();
    if let Some(primary) = &layout.primary
        && let Some(position) = remaining.iter().position(|name| *name == primary.column)
    {
        remaining.remove(position);
        plan.push_group(ColumnGroup::new([primary.column.as_str()], primary.probability));
    }

    let required = layout.required_columns();
    if remaining.len() < required {
        return Err(Error::InsufficientColumns {
            required,
            available: remaining.len(),
        });
    }

    for tier in &layout.tiers {
        let mut picked = Vec::with_capacity(tier.size);
        for _ in 0..tier.size {
            let index = rng.random_range(0..remaining.len());
            picked.push(remaining.remove(index));
        }
        plan.push_group(ColumnGroup::new(picked, tier.probability));
    }
    Ok(plan)
}
