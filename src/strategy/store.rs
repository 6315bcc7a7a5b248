//! Target-weight persistence seam.
//!
//! Stores hold only the *overrides*: entries whose weight differs from the
//! base universe targets. [`merged_targets`] layers them back on top.

use std::convert::Infallible;

use crate::portfolio::TargetWeights;

/// Weights closer than this to the base are not persisted.
pub const OVERRIDE_EPSILON: f64 = 1e-6;

/// Load/save of a ticker -> weight override map.
pub trait TargetStore {
    type Error;

    /// Current overrides (empty if nothing was ever saved).
    fn load(&self) -> Result<TargetWeights, Self::Error>;

    /// Replace the stored overrides.
    fn save(&mut self, overrides: &TargetWeights) -> Result<(), Self::Error>;
}

/// `base` with every override applied on top.
pub fn merged_targets(base: &TargetWeights, overrides: &TargetWeights) -> TargetWeights {
    let mut merged = base.clone();
    merged.extend(overrides.iter().map(|(&t, &w)| (t, w)));
    merged
}

/// Entries of `targets` that differ from `base` by more than
/// [`OVERRIDE_EPSILON`]. A ticker missing from either side counts as 0.
pub fn target_overrides(base: &TargetWeights, targets: &TargetWeights) -> TargetWeights {
    let mut overrides = TargetWeights::new();
    for ticker in base.keys().chain(targets.keys()) {
        let new = targets.get(ticker).copied().unwrap_or(0.0);
        let old = base.get(ticker).copied().unwrap_or(0.0);
        if (new - old).abs() > OVERRIDE_EPSILON {
            overrides.insert(*ticker, new);
        }
    }
    overrides
}

/// Base targets merged with whatever `store` holds.
pub fn load_targets<S: TargetStore>(
    store: &S,
    base: &TargetWeights,
) -> Result<TargetWeights, S::Error> {
    Ok(merged_targets(base, &store.load()?))
}

/// Persist the diff between `targets` and `base`. Returns what was written.
pub fn save_targets<S: TargetStore>(
    store: &mut S,
    base: &TargetWeights,
    targets: &TargetWeights,
) -> Result<TargetWeights, S::Error> {
    let overrides = target_overrides(base, targets);
    store.save(&overrides)?;
    log::debug!("saved {} target overrides", overrides.len());
    Ok(overrides)
}

/// In-memory store, for tests and dry runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryTargetStore {
    overrides: TargetWeights,
    saves: usize,
}

impl MemoryTargetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: TargetWeights) -> Self {
        Self {
            overrides,
            saves: 0,
        }
    }

    /// Number of times [`TargetStore::save`] was called.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl TargetStore for MemoryTargetStore {
    type Error = Infallible;

    fn load(&self) -> Result<TargetWeights, Infallible> {
        Ok(self.overrides.clone())
    }

    fn save(&mut self, overrides: &TargetWeights) -> Result<(), Infallible> {
        self.overrides = overrides.clone();
        self.saves += 1;
        Ok(())
    }
}
