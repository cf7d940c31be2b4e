//! # Duration Module
//!
//! Note lengths, tempo and tuplet ratios.
//!
//! ## Duration Calculation
//! - A [`Duration`] is `1/denominator` of a whole note, times an exact scale
//!   that dots, tuplets and prolation accumulate
//! - Example: Dotted quarter note = `1/4 * 3/2 = 3/8` of a whole note
//! - Example: Quarter note triplet = `1/4 * 2/3 = 1/6` of a whole note
//! - Rests occupy time exactly like sounded notes
//!
//! ## Wall-clock Time
//! The beat unit of a [`Tempo`] is always the quarter note, so a whole note is
//! four beats:
//!
//! ```text
//! milliseconds = value * 4 * (60000 / bpm)
//! ```
//!
//! ## Example
//! ```rust
//! use staff::{Duration, Tempo, Tuplet};
//!
//! let eighth = Duration::new(8).unwrap();
//! let tempo = Tempo::new(60.0).unwrap();
//! assert_eq!(eighth.milliseconds(&tempo), 500.0);
//!
//! let triplet = Tuplet::new(3, 2).unwrap().apply(&eighth).unwrap();
//! assert_eq!(triplet.value(), num_rational::Ratio::new(1, 12));
//! ```

use crate::error::{Result, StaffError};
use num_rational::Ratio;
use num_traits::{CheckedDiv, CheckedMul};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Exact fraction of a whole note.
pub type Fraction = Ratio<i64>;

/// Quarter notes per whole note.
const BEATS_PER_WHOLE: f64 = 4.0;

pub(crate) fn fraction_to_f64(fraction: Fraction) -> f64 {
    *fraction.numer() as f64 / *fraction.denom() as f64
}

fn unit_scale() -> Fraction {
    Fraction::from_integer(1)
}

/// A note value: `1/denominator` of a whole note, scaled, possibly a rest.
///
/// The denominator is expected to be a power of two (1, 2, 4, 8, ...). Other
/// values are accepted and behave arithmetically.
///
/// The scale is always positive and `scale / denominator` always fits in a
/// [`Fraction`]. Operations that would break this return an error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DurationRecord")]
pub struct Duration {
    denominator: NonZeroU32,
    #[serde(default)]
    is_rest: bool,
    #[serde(default = "unit_scale")]
    scale: Fraction,
}

impl Duration {
    pub fn new(denominator: u32) -> Result<Self> {
        let denominator = NonZeroU32::new(denominator).ok_or_else(|| {
            StaffError::InvalidValue("duration denominator must be positive, got 0".to_string())
        })?;
        Ok(Self {
            denominator,
            is_rest: false,
            scale: unit_scale(),
        })
    }

    /// A silence of `1/denominator` of a whole note.
    pub fn rest(denominator: u32) -> Result<Self> {
        Ok(Self::new(denominator)?.with_rest(true))
    }

    pub fn with_rest(self, is_rest: bool) -> Self {
        Self { is_rest, ..self }
    }

    pub fn denominator(&self) -> u32 {
        self.denominator.get()
    }

    pub fn is_rest(&self) -> bool {
        self.is_rest
    }

    /// Accumulated scale from dots, tuplets and prolation.
    pub fn scale(&self) -> Fraction {
        self.scale
    }

    /// Fraction of a whole note, regardless of rest status.
    pub fn value(&self) -> Fraction {
        self.scale / i64::from(self.denominator.get())
    }

    /// Adds one dot: half as long again.
    pub fn dotted(self) -> Result<Self> {
        self.scaled(Fraction::new(3, 2))
    }

    /// Multiplies the note's value by `factor`, keeping the rest flag.
    ///
    /// Fails with [`StaffError::InvalidValue`] when the factor isn't positive
    /// or the scaled value no longer fits in a [`Fraction`].
    pub fn scaled(self, factor: Fraction) -> Result<Self> {
        if factor <= Fraction::from_integer(0) {
            return Err(StaffError::InvalidValue(format!(
                "duration scale factor must be positive, got {}",
                factor
            )));
        }
        let scale = self.scale.checked_mul(&factor).ok_or_else(|| {
            StaffError::InvalidValue(format!("scaling {} by {} overflows", self, factor))
        })?;
        Self::with_scale(self.denominator, self.is_rest, scale)
    }

    fn with_scale(denominator: NonZeroU32, is_rest: bool, scale: Fraction) -> Result<Self> {
        let whole = Fraction::from_integer(i64::from(denominator.get()));
        if scale.checked_div(&whole).is_none() {
            return Err(StaffError::InvalidValue(format!(
                "{} / {} is not representable",
                scale, denominator
            )));
        }
        Ok(Self {
            denominator,
            is_rest,
            scale,
        })
    }

    /// Length in quarter-note beats.
    pub fn beats(&self) -> f64 {
        fraction_to_f64(self.value()) * BEATS_PER_WHOLE
    }

    pub fn milliseconds(&self, tempo: &Tempo) -> f64 {
        self.beats() * tempo.beat_milliseconds()
    }
}

#[derive(Deserialize)]
struct DurationRecord {
    denominator: NonZeroU32,
    #[serde(default)]
    is_rest: bool,
    #[serde(default = "unit_scale")]
    scale: Fraction,
}

impl TryFrom<DurationRecord> for Duration {
    type Error = StaffError;

    fn try_from(record: DurationRecord) -> Result<Self> {
        let (numer, denom) = (*record.scale.numer(), *record.scale.denom());
        if numer <= 0 || denom <= 0 {
            return Err(StaffError::InvalidValue(format!(
                "duration scale must be positive, got {}/{}",
                numer, denom
            )));
        }
        Self::with_scale(record.denominator, record.is_rest, Fraction::new(numer, denom))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_rest {
            write!(f, "rest ")?;
        }
        write!(f, "1/{}", self.denominator)?;
        if self.scale != unit_scale() {
            write!(f, " x {}", self.scale)?;
        }
        Ok(())
    }
}

/// Beats per minute, with the quarter note as the beat.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tempo(f64);

impl Tempo {
    pub fn new(bpm: f64) -> Result<Self> {
        if bpm.is_finite() && bpm > 0.0 {
            Ok(Self(bpm))
        } else {
            Err(StaffError::InvalidValue(format!("bpm must be positive, got {}", bpm)))
        }
    }

    pub fn bpm(&self) -> f64 {
        self.0
    }

    /// Beats per second.
    pub fn bps(&self) -> f64 {
        self.0 / 60.0
    }

    pub fn beat_milliseconds(&self) -> f64 {
        60_000.0 / self.0
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self(120.0)
    }
}

impl TryFrom<f64> for Tempo {
    type Error = StaffError;

    fn try_from(bpm: f64) -> Result<Self> {
        Self::new(bpm)
    }
}

impl From<Tempo> for f64 {
    fn from(value: Tempo) -> Self {
        value.0
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0.2} BPM", self.0)
    }
}

/// `actual` notes played in the time of `normal` (3 in the time of 2 is a
/// triplet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tuplet {
    actual: NonZeroU32,
    normal: NonZeroU32,
}

impl Tuplet {
    pub fn new(actual: u32, normal: u32) -> Result<Self> {
        match (NonZeroU32::new(actual), NonZeroU32::new(normal)) {
            (Some(actual), Some(normal)) => Ok(Self { actual, normal }),
            _ => Err(StaffError::InvalidValue(format!(
                "tuplet {}:{} must have positive counts",
                actual, normal
            ))),
        }
    }

    /// The conventional grouping for `actual` notes:
    /// 3 in the time of 2, 4 in the time of 3, 5 or more in the time of 4.
    pub fn standard(actual: u32) -> Result<Self> {
        if actual < 2 {
            return Err(StaffError::InvalidValue(format!(
                "a tuplet needs at least 2 notes, got {}",
                actual
            )));
        }
        let normal = if actual <= 4 { actual - 1 } else { 4 };
        Self::new(actual, normal)
    }

    pub fn actual(&self) -> u32 {
        self.actual.get()
    }

    pub fn normal(&self) -> u32 {
        self.normal.get()
    }

    /// Factor applied to each grouped note: `normal / actual`.
    pub fn ratio(&self) -> Fraction {
        Fraction::new(i64::from(self.normal.get()), i64::from(self.actual.get()))
    }

    pub fn apply(&self, duration: &Duration) -> Result<Duration> {
        duration.scaled(self.ratio())
    }
}

impl fmt::Display for Tuplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.actual, self.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_fraction_of_whole() {
        assert_eq!(Duration::new(1).unwrap().value(), Fraction::from_integer(1));
        assert_eq!(Duration::new(8).unwrap().value(), Fraction::new(1, 8));
        // Rest status doesn't change the value
        assert_eq!(Duration::rest(8).unwrap().value(), Fraction::new(1, 8));
    }

    #[test]
    fn test_zero_denominator_is_invalid() {
        assert!(matches!(Duration::new(0), Err(StaffError::InvalidValue(_))));
        assert!(matches!(Duration::rest(0), Err(StaffError::InvalidValue(_))));
    }

    #[test]
    fn test_milliseconds_at_sixty_bpm() {
        let tempo = Tempo::new(60.0).unwrap();
        assert_eq!(tempo.beat_milliseconds(), 1000.0);
        assert_eq!(Duration::new(4).unwrap().milliseconds(&tempo), 1000.0);
        assert_eq!(Duration::new(1).unwrap().milliseconds(&tempo), 4000.0);
        assert_eq!(Duration::rest(2).unwrap().milliseconds(&tempo), 2000.0);
    }

    #[test]
    fn test_milliseconds_at_default_tempo() {
        let tempo = Tempo::default();
        assert_eq!(tempo.bpm(), 120.0);
        assert_eq!(tempo.bps(), 2.0);
        assert_eq!(Duration::new(4).unwrap().milliseconds(&tempo), 500.0);
    }

    #[test]
    fn test_invalid_tempo() {
        assert!(matches!(Tempo::new(0.0), Err(StaffError::InvalidValue(_))));
        assert!(matches!(Tempo::new(-60.0), Err(StaffError::InvalidValue(_))));
        assert!(Tempo::new(f64::NAN).is_err());
    }

    #[test]
    fn test_dotted() {
        let dotted_quarter = Duration::new(4).unwrap().dotted().unwrap();
        assert_eq!(dotted_quarter.value(), Fraction::new(3, 8));
        assert_eq!(dotted_quarter.beats(), 1.5);
        assert_eq!(dotted_quarter.denominator(), 4);
    }

    #[test]
    fn test_triplet_applies_normal_over_actual() {
        let triplet = Tuplet::new(3, 2).unwrap();
        let quarter = Duration::new(4).unwrap();
        let scaled = triplet.apply(&quarter).unwrap();
        assert_eq!(scaled.value(), Fraction::new(1, 6));
        // Three triplet quarters fill a half note
        assert_eq!(scaled.value() * 3, Duration::new(2).unwrap().value());
        // The original is untouched
        assert_eq!(quarter.value(), Fraction::new(1, 4));
    }

    #[test]
    fn test_tuplet_keeps_rest_flag() {
        let rest = Duration::rest(8).unwrap();
        assert!(Tuplet::new(5, 4).unwrap().apply(&rest).unwrap().is_rest());
    }

    #[test]
    fn test_standard_tuplets() {
        assert_eq!(Tuplet::standard(3).unwrap(), Tuplet::new(3, 2).unwrap());
        assert_eq!(Tuplet::standard(4).unwrap().normal(), 3);
        assert_eq!(Tuplet::standard(5).unwrap().normal(), 4);
        assert_eq!(Tuplet::standard(7).unwrap().normal(), 4);
        assert!(Tuplet::standard(1).is_err());
        assert!(Tuplet::new(0, 2).is_err());
    }

    #[test]
    fn test_scaled_rejects_non_positive() {
        let quarter = Duration::new(4).unwrap();
        assert!(quarter.scaled(Fraction::from_integer(0)).is_err());
        assert!(quarter.scaled(Fraction::new(-1, 2)).is_err());
        assert_eq!(quarter.scaled(Fraction::from_integer(2)).unwrap().value(), Fraction::new(1, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Duration::new(8).unwrap().to_string(), "1/8");
        assert_eq!(Duration::rest(4).unwrap().dotted().unwrap().to_string(), "rest 1/4 x 3/2");
        assert_eq!(Tempo::new(88.0).unwrap().to_string(), "88.00 BPM");
        assert_eq!(Tuplet::new(3, 2).unwrap().to_string(), "3:2");
    }

    #[test]
    fn test_serde_defaults() {
        let eighth: Duration = serde_yaml::from_str("denominator: 8").unwrap();
        assert_eq!(eighth, Duration::new(8).unwrap());
        assert!(serde_yaml::from_str::<Duration>("denominator: 0").is_err());
        assert!(serde_yaml::from_str::<Tempo>("-3.0").is_err());
    }

    #[test]
    fn test_serde_validates_scale() {
        let dotted: Duration = serde_yaml::from_str("denominator: 4\nscale: [3, 2]").unwrap();
        assert_eq!(dotted, Duration::new(4).unwrap().dotted().unwrap());
        assert_eq!(dotted.value(), Fraction::new(3, 8));

        let negative = serde_yaml::from_str::<Duration>("denominator: 4\nscale: [-1, 2]");
        assert!(negative.is_err());
        let zero = serde_yaml::from_str::<Duration>("denominator: 4\nscale: [0, 1]");
        assert!(zero.is_err());
        // 1 / (i64::MAX * 3) has no i64 denominator
        let huge = serde_yaml::from_str::<Duration>(
            "denominator: 3\nscale: [1, 9223372036854775807]",
        );
        assert!(huge.is_err());
    }

    #[test]
    fn test_repeated_scaling_overflows_into_error() {
        let mut duration = Duration::new(4).unwrap();
        let factor = Fraction::new(1_000_000_007, 1_000_000_009);
        let mut failed = false;
        for _ in 0..8 {
            match duration.scaled(factor) {
                Ok(next) => duration = next,
                Err(e) => {
                    assert!(matches!(e, StaffError::InvalidValue(_)));
                    failed = true;
                    break;
                }
            }
        }
        assert!(failed);
        // The last good value is still usable
        assert!(duration.value() > Fraction::from_integer(0));
    }

    #[test]
    fn test_dotting_overflows_into_error() {
        let mut duration = Duration::new(1).unwrap();
        let mut result = Ok(duration);
        for _ in 0..64 {
            result = duration.dotted();
            match &result {
                Ok(next) => duration = *next,
                Err(_) => break,
            }
        }
        assert!(matches!(result, Err(StaffError::InvalidValue(_))));
    }
}
