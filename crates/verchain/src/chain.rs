use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use crate::error::{Error, Result};
use crate::versioned::Versioned;

/// A single pure transform between two adjacent schema versions.
///
/// Steps must be deterministic and free of side effects: the same input always
/// produces the same output, on any thread.
pub type Step<V> = Box<dyn Fn(V) -> Result<V> + Send + Sync>;

/// Ordered upgrade and downgrade steps between consecutive schema versions.
///
/// Both lists share one addressing rule: position `i` (0-based) relates
/// versions `i + 1` and `i + 2`. Upgrade `i` turns a `v(i+1)` value into a
/// `v(i+2)` value; downgrade `i` does the reverse.
///
/// Going from version `a` up to `latest` runs upgrade positions
/// `a - 1 ..= latest - 2` in increasing order. Going from `latest` down to
/// version `b` runs downgrade positions `latest - 2 ..= b - 1` in decreasing
/// order, so every step moves exactly one version. No step is skipped or
/// repeated.
pub struct MigrationChain<V> {
    upgrades: Vec<Step<V>>,
    downgrades: Vec<Step<V>>,
}

impl<V> MigrationChain<V> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            upgrades: Vec::new(),
            downgrades: Vec::new(),
        }
    }

    /// Build a chain from ready-made step lists, both ordered from v1 upwards.
    pub fn from_steps(upgrades: Vec<Step<V>>, downgrades: Vec<Step<V>>) -> Self {
        Self {
            upgrades,
            downgrades,
        }
    }

    pub(crate) fn push_upgrade(&mut self, step: Step<V>) {
        self.upgrades.push(step);
    }

    pub(crate) fn push_downgrade(&mut self, step: Step<V>) {
        self.downgrades.push(step);
    }

    /// Upgrade step at `position`, mapping `v(position+1)` to `v(position+2)`.
    pub fn upgrade(&self, position: usize) -> Option<&Step<V>> {
        self.upgrades.get(position)
    }

    /// Downgrade step at `position`, mapping `v(position+2)` to `v(position+1)`.
    pub fn downgrade(&self, position: usize) -> Option<&Step<V>> {
        self.downgrades.get(position)
    }

    /// Number of upgrade steps.
    pub fn upgrade_len(&self) -> usize {
        self.upgrades.len()
    }

    /// Number of downgrade steps.
    pub fn downgrade_len(&self) -> usize {
        self.downgrades.len()
    }

    /// Positions of the upgrade steps needed to go from `from` to `to`.
    ///
    /// Empty when `from >= to` or when `from` is 0.
    pub fn upgrade_path(from: u16, to: u16) -> Range<usize> {
        if from >= to || from == 0 {
            return 0..0;
        }
        usize::from(from - 1)..usize::from(to - 1)
    }

    /// Positions of the downgrade steps needed to go from `from` to `to`,
    /// listed in increasing order. Run them in reverse.
    pub fn downgrade_path(from: u16, to: u16) -> Range<usize> {
        Self::upgrade_path(to, from)
    }

    /// All registered steps as `(from, to)` version pairs: upgrades first,
    /// then downgrades, each in position order.
    pub fn registered_steps(&self) -> Vec<(u16, u16)> {
        let upgrades = (0..self.upgrades.len()).map(|i| (i as u16 + 1, i as u16 + 2));
        let downgrades = (0..self.downgrades.len()).map(|i| (i as u16 + 2, i as u16 + 1));
        upgrades.chain(downgrades).collect()
    }
}

impl<V: Versioned> MigrationChain<V> {
    /// Run the upgrade steps that take `value` up to version `to`.
    pub fn apply_upgrades(&self, mut value: V, to: u16) -> Result<V> {
        let from = value.version();
        for position in Self::upgrade_path(from, to) {
            let (step_from, step_to) = bounds(position, true);
            let step = self.upgrades.get(position).ok_or(Error::MissingMigration {
                from: step_from,
                to: step_to,
            })?;

            tracing::trace!(from = step_from, to = step_to, "applying upgrade step");
            value = run_step(step, value, step_from, step_to)?;
        }
        Ok(value)
    }

    /// Run the downgrade steps that take `value` down to version `to`.
    pub fn apply_downgrades(&self, mut value: V, to: u16) -> Result<V> {
        let from = value.version();
        for position in Self::downgrade_path(from, to).rev() {
            let (step_from, step_to) = bounds(position, false);
            let step = self
                .downgrades
                .get(position)
                .ok_or(Error::MissingMigration {
                    from: step_from,
                    to: step_to,
                })?;

            tracing::trace!(from = step_from, to = step_to, "applying downgrade step");
            value = run_step(step, value, step_from, step_to)?;
        }
        Ok(value)
    }

    /// Check that every step between `min_version` and `latest` exists in
    /// both directions, reporting the first gap.
    pub fn validate(&self, min_version: u16, latest: u16) -> Result<()> {
        check_version(min_version)?;
        for position in Self::upgrade_path(min_version, latest) {
            if position >= self.upgrades.len() {
                let (from, to) = bounds(position, true);
                return Err(Error::MissingMigration { from, to });
            }
        }
        for position in Self::downgrade_path(latest, min_version).rev() {
            if position >= self.downgrades.len() {
                let (from, to) = bounds(position, false);
                return Err(Error::MissingMigration { from, to });
            }
        }
        Ok(())
    }
}

impl<V> Default for MigrationChain<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for MigrationChain<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationChain")
            .field("upgrades", &self.upgrades.len())
            .field("downgrades", &self.downgrades.len())
            .finish()
    }
}

/// Reject version 0; versions start at 1.
pub(crate) fn check_version(version: u16) -> Result<()> {
    if version == 0 {
        return Err(Error::InvalidVersion(version));
    }
    Ok(())
}

fn bounds(position: usize, upgrade: bool) -> (u16, u16) {
    let lower = position as u16 + 1;
    if upgrade {
        (lower, lower + 1)
    } else {
        (lower + 1, lower)
    }
}

fn run_step<V: Versioned>(step: &Step<V>, value: V, from: u16, to: u16) -> Result<V> {
    let found = value.version();
    if found != from {
        return Err(Error::VersionMismatch {
            expected: from,
            found,
        });
    }

    let out = step(value).map_err(|err| match err {
        Error::Codec(source) => Error::Transform { from, to, source },
        other => other,
    })?;

    let found = out.version();
    if found != to {
        return Err(Error::VersionMismatch { expected: to, found });
    }
    Ok(out)
}
