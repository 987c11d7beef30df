//! LevelSet - closed set of PII levels
//!
//! Backed by a bit per level, so it is `Copy` and membership is a mask test.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::PiiLevel;

/// A set of [`PiiLevel`]s.
///
/// Serializes as a list of level names. An absent list in configuration is
/// the empty set, never "unset".
///
/// # Examples
/// ```
/// use contracts::{LevelSet, PiiLevel};
///
/// let set: LevelSet = [PiiLevel::None, PiiLevel::Diagnostic].into_iter().collect();
/// assert!(set.contains(PiiLevel::Diagnostic));
/// assert!(!set.contains(PiiLevel::Network));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<PiiLevel>", into = "Vec<PiiLevel>")]
pub struct LevelSet(u8);

impl LevelSet {
    /// Empty set.
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Alias of [`LevelSet::new`], reads better at call sites.
    #[inline]
    pub const fn empty() -> Self {
        Self::new()
    }

    /// Every level.
    pub fn all() -> Self {
        PiiLevel::ALL.into_iter().collect()
    }

    #[inline]
    const fn bit(level: PiiLevel) -> u8 {
        1 << level.rank()
    }

    pub fn insert(&mut self, level: PiiLevel) -> bool {
        let was_present = self.contains(level);
        self.0 |= Self::bit(level);
        !was_present
    }

    pub fn remove(&mut self, level: PiiLevel) -> bool {
        let was_present = self.contains(level);
        self.0 &= !Self::bit(level);
        was_present
    }

    #[inline]
    pub const fn contains(&self, level: PiiLevel) -> bool {
        self.0 & Self::bit(level) != 0
    }

    #[inline]
    pub const fn union(self, other: LevelSet) -> LevelSet {
        LevelSet(self.0 | other.0)
    }

    /// Levels in `self` that are not in `other`.
    #[inline]
    pub const fn difference(self, other: LevelSet) -> LevelSet {
        LevelSet(self.0 & !other.0)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate members in rank order.
    pub fn iter(&self) -> impl Iterator<Item = PiiLevel> + '_ {
        PiiLevel::ALL
            .into_iter()
            .filter(move |level| self.contains(*level))
    }

    /// Members as a vector, in rank order.
    pub fn to_vec(&self) -> Vec<PiiLevel> {
        self.iter().collect()
    }
}

impl FromIterator<PiiLevel> for LevelSet {
    fn from_iter<I: IntoIterator<Item = PiiLevel>>(iter: I) -> Self {
        let mut set = LevelSet::new();
        for level in iter {
            set.insert(level);
        }
        set
    }
}

impl<const N: usize> From<[PiiLevel; N]> for LevelSet {
    fn from(levels: [PiiLevel; N]) -> Self {
        levels.into_iter().collect()
    }
}

impl From<Vec<PiiLevel>> for LevelSet {
    fn from(levels: Vec<PiiLevel>) -> Self {
        levels.into_iter().collect()
    }
}

impl From<LevelSet> for Vec<PiiLevel> {
    fn from(set: LevelSet) -> Self {
        set.to_vec()
    }
}

impl fmt::Debug for LevelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for LevelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(PiiLevel::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
