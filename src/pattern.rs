//! # Pattern Module
//!
//! Ordered, immutable sequences of [`Duration`] values.
//!
//! Every transform returns a new [`DurationPattern`] and leaves the original
//! untouched, so a pattern can be shared freely between threads.
//!
//! ## Transforms
//! - `append` / `prepend` - Add one duration at either end
//! - `retrograde` - Reverse the order (its own inverse)
//! - `prolate` - Multiply every duration's value by a factor
//! - `rotate` - Cyclic shift; positive `n` moves the first `n` elements to the end
//!
//! ## Example
//! ```rust
//! use staff::{Duration, DurationPattern, Tempo};
//!
//! let pattern = DurationPattern::new(vec![
//!     Duration::rest(8).unwrap(),
//!     Duration::new(8).unwrap(),
//!     Duration::new(4).unwrap(),
//! ]);
//! let rotated = pattern.rotate(1);
//! assert_eq!(rotated.get(-1).unwrap(), pattern.get(0).unwrap());
//! assert_eq!(pattern.milliseconds(&Tempo::new(60.0).unwrap()), 2000.0);
//! ```

use crate::duration::{fraction_to_f64, Duration, Fraction, Tempo};
use crate::error::{Result, StaffError};
use num_traits::CheckedAdd;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationPattern {
    durations: Vec<Duration>,
}

impl DurationPattern {
    pub fn new(durations: Vec<Duration>) -> Self {
        Self { durations }
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Duration> {
        self.durations.iter()
    }

    pub fn as_slice(&self) -> &[Duration] {
        &self.durations
    }

    /// Element at `index`. Negative indices count from the end, so `-1` is
    /// the last element.
    pub fn get(&self, index: isize) -> Result<Duration> {
        let len = self.durations.len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs()).filter(|&i| i < len)
        };
        resolved
            .map(|i| self.durations[i])
            .ok_or(StaffError::IndexOutOfBounds { index, len })
    }

    pub fn append(&self, duration: Duration) -> Self {
        let mut durations = self.durations.clone();
        durations.push(duration);
        Self { durations }
    }

    pub fn prepend(&self, duration: Duration) -> Self {
        let mut durations = Vec::with_capacity(self.durations.len() + 1);
        durations.push(duration);
        durations.extend_from_slice(&self.durations);
        Self { durations }
    }

    /// This pattern followed by `other`.
    pub fn concat(&self, other: &DurationPattern) -> Self {
        self.iter().chain(other.iter()).copied().collect()
    }

    pub fn retrograde(&self) -> Self {
        self.iter().rev().copied().collect()
    }

    /// Multiplies every duration's value by `factor`, so the whole pattern
    /// takes `factor` times as long at any tempo. Rest flags are kept.
    pub fn prolate(&self, factor: f64) -> Result<Self> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(StaffError::InvalidValue(format!(
                "prolation factor must be positive, got {}",
                factor
            )));
        }
        let ratio = Fraction::approximate_float(factor).ok_or_else(|| {
            StaffError::InvalidValue(format!(
                "prolation factor {} has no rational approximation",
                factor
            ))
        })?;
        self.prolate_by(ratio)
    }

    /// Exact form of [`prolate`](Self::prolate).
    pub fn prolate_by(&self, factor: Fraction) -> Result<Self> {
        self.iter().map(|d| d.scaled(factor)).collect()
    }

    /// Cyclic shift by `n` positions, taken modulo the length with floor
    /// semantics: `rotate(1)` moves the first element to the end,
    /// `rotate(-1)` moves the last element to the front, and any `n` that is a
    /// multiple of the length is the identity.
    pub fn rotate(&self, n: isize) -> Self {
        let mut durations = self.durations.clone();
        if !durations.is_empty() {
            let len = durations.len() as isize;
            durations.rotate_left(n.rem_euclid(len) as usize);
        }
        Self { durations }
    }

    /// Total fraction of a whole note. Fails with
    /// [`StaffError::InvalidValue`] when the exact sum doesn't fit in a
    /// [`Fraction`]; [`milliseconds`](Self::milliseconds) still works then.
    pub fn value(&self) -> Result<Fraction> {
        self.iter().try_fold(Fraction::from_integer(0), |total, d| {
            total.checked_add(&d.value()).ok_or_else(|| self.overflow())
        })
    }

    pub fn milliseconds(&self, tempo: &Tempo) -> f64 {
        self.iter().map(|d| d.milliseconds(tempo)).sum()
    }

    /// Start offset of each element, in milliseconds from the pattern start.
    pub fn onsets(&self, tempo: &Tempo) -> Result<Vec<f64>> {
        let ms_per_whole = 4.0 * tempo.beat_milliseconds();
        let mut onsets = Vec::with_capacity(self.len());
        let mut elapsed = Some(Fraction::from_integer(0));
        for d in self.iter() {
            let start = elapsed.ok_or_else(|| self.overflow())?;
            onsets.push(fraction_to_f64(start) * ms_per_whole);
            elapsed = start.checked_add(&d.value());
        }
        Ok(onsets)
    }

    fn overflow(&self) -> StaffError {
        StaffError::InvalidValue(format!("total length of {} overflows", self))
    }
}

impl From<Vec<Duration>> for DurationPattern {
    fn from(durations: Vec<Duration>) -> Self {
        Self::new(durations)
    }
}

impl FromIterator<Duration> for DurationPattern {
    fn from_iter<I: IntoIterator<Item = Duration>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for DurationPattern {
    type Item = Duration;
    type IntoIter = std::vec::IntoIter<Duration>;

    fn into_iter(self) -> Self::IntoIter {
        self.durations.into_iter()
    }
}

impl<'a> IntoIterator for &'a DurationPattern {
    type Item = &'a Duration;
    type IntoIter = std::slice::Iter<'a, Duration>;

    fn into_iter(self) -> Self::IntoIter {
        self.durations.iter()
    }
}

impl fmt::Display for DurationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, duration) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", duration)?;
        }
        write!(f, "]")
    }
}
