//! Reference tuning, frequency, cents and bend values.

use crate::error::{Result, StaffError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::ops::{Add, Neg, Sub};

/// Cents per octave, regardless of how many divisions the octave has.
pub const CENTS_PER_OCTAVE: f64 = 1200.0;

/// Twelve-tone equal temperament.
pub(crate) const TWELVE_DIVS: NonZeroU32 = match NonZeroU32::new(12) {
    Some(divs) => divs,
    None => unreachable!(),
};

pub(crate) fn octave_divisions(octave_divs: u32) -> Result<NonZeroU32> {
    NonZeroU32::new(octave_divs)
        .ok_or_else(|| StaffError::InvalidValue("octave_divs must be positive, got 0".to_string()))
}

/// A frequency in Hz. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Frequency(f64);

impl Frequency {
    pub fn new(hz: f64) -> Result<Self> {
        if hz.is_finite() && hz > 0.0 {
            Ok(Self(hz))
        } else {
            Err(StaffError::InvalidValue(format!(
                "frequency must be a positive number of Hz, got {}",
                hz
            )))
        }
    }

    pub fn hz(&self) -> f64 {
        self.0
    }

    /// Shifts the frequency by an interval. The result stays positive for any
    /// finite interval.
    pub fn transpose(&self, cents: Cents) -> Frequency {
        Frequency(self.0 * cents.to_ratio())
    }
}

impl TryFrom<f64> for Frequency {
    type Error = StaffError;

    fn try_from(hz: f64) -> Result<Self> {
        Self::new(hz)
    }
}

impl From<Frequency> for f64 {
    fn from(value: Frequency) -> Self {
        value.0
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} Hz", self.0)
    }
}

/// Reference tuning standard: a frequency bound to a pitch number, counted in
/// a given number of octave divisions.
///
/// Pitches built with [`MidiPitch::in_diapason`](crate::MidiPitch::in_diapason)
/// take their division count from here. The conversion formula itself always
/// uses the pitch's own division count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diapason {
    frequency: Frequency,
    number: i32,
    octave_divs: NonZeroU32,
}

impl Diapason {
    pub fn new(frequency: f64, number: i32, octave_divs: u32) -> Result<Self> {
        Ok(Self {
            frequency: Frequency::new(frequency)?,
            number,
            octave_divs: octave_divisions(octave_divs)?,
        })
    }

    /// A4 = 440 Hz at MIDI number 69, twelve divisions.
    pub fn a440() -> Self {
        Self {
            frequency: Frequency(440.0),
            number: 69,
            octave_divs: TWELVE_DIVS,
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn octave_divs(&self) -> u32 {
        self.octave_divs.get()
    }

    pub(crate) fn divisions(&self) -> NonZeroU32 {
        self.octave_divs
    }
}

impl Default for Diapason {
    fn default() -> Self {
        Self::a440()
    }
}

/// Logarithmic interval: 1200 cents to the octave.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(f64);

impl Cents {
    pub const OCTAVE: Cents = Cents(CENTS_PER_OCTAVE);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// The interval from `lower` up to `upper`: `1200 * log2(upper / lower)`.
    /// Negative when `upper` is actually the lower of the two.
    ///
    /// ```
    /// use staff::{Cents, Frequency};
    ///
    /// let a4 = Frequency::new(440.0).unwrap();
    /// let a3 = Frequency::new(220.0).unwrap();
    /// assert_eq!(Cents::between(a3, a4).value(), -1200.0);
    /// ```
    pub fn between(upper: impl Into<Frequency>, lower: impl Into<Frequency>) -> Self {
        let (upper, lower) = (upper.into(), lower.into());
        Self(CENTS_PER_OCTAVE * (upper.0 / lower.0).log2())
    }

    pub fn from_ratio(ratio: f64) -> Result<Self> {
        if ratio.is_finite() && ratio > 0.0 {
            Ok(Self(CENTS_PER_OCTAVE * ratio.log2()))
        } else {
            Err(StaffError::InvalidValue(format!(
                "frequency ratio must be positive, got {}",
                ratio
            )))
        }
    }

    /// The frequency ratio this interval spans.
    pub fn to_ratio(&self) -> f64 {
        (self.0 / CENTS_PER_OCTAVE).exp2()
    }
}

impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0 + rhs.0)
    }
}

impl Sub for Cents {
    type Output = Cents;

    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0 - rhs.0)
    }
}

impl Neg for Cents {
    type Output = Cents;

    fn neg(self) -> Cents {
        Cents(-self.0)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.2} cents", self.0)
    }
}

/// Fine offset applied atop a pitch number, measured in division steps.
///
/// The fraction is bounded to `-1.0..=1.0`: a bend of a whole step or more is
/// expressed by changing the pitch number instead.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MidiBend(f64);

impl MidiBend {
    pub const ZERO: MidiBend = MidiBend(0.0);

    /// Center of the 14-bit pitch wheel.
    pub const PITCH_WHEEL_CENTER: u16 = 8192;
    pub const PITCH_WHEEL_MAX: u16 = 16383;

    /// The General MIDI default bend range, in division steps.
    pub const DEFAULT_RANGE: f64 = 2.0;

    pub fn new(fraction: f64) -> Result<Self> {
        if fraction.is_finite() && (-1.0..=1.0).contains(&fraction) {
            Ok(Self(fraction))
        } else {
            Err(StaffError::InvalidValue(format!(
                "bend must be within one division step (-1.0..=1.0), got {}",
                fraction
            )))
        }
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Converts to a 14-bit pitch-wheel value for a synth whose wheel spans
    /// `range` division steps either side of center.
    ///
    /// ```
    /// use staff::MidiBend;
    ///
    /// let bend = MidiBend::new(0.5).unwrap();
    /// assert_eq!(bend.to_pitch_wheel(MidiBend::DEFAULT_RANGE).unwrap(), 10240);
    /// ```
    pub fn to_pitch_wheel(&self, range: f64) -> Result<u16> {
        check_bend_range(range)?;
        let raw = f64::from(Self::PITCH_WHEEL_CENTER) * (1.0 + self.0 / range);
        Ok(raw.round().clamp(0.0, f64::from(Self::PITCH_WHEEL_MAX)) as u16)
    }

    /// Fails when the wheel position lands more than one division step away
    /// from the pitch, which happens for ranges wider than one step.
    pub fn from_pitch_wheel(value: u16, range: f64) -> Result<Self> {
        check_bend_range(range)?;
        if value > Self::PITCH_WHEEL_MAX {
            return Err(StaffError::InvalidValue(format!(
                "pitch wheel value must be at most {}, got {}",
                Self::PITCH_WHEEL_MAX,
                value
            )));
        }
        let offset = f64::from(value) - f64::from(Self::PITCH_WHEEL_CENTER);
        Self::new(offset / f64::from(Self::PITCH_WHEEL_CENTER) * range)
    }
}

fn check_bend_range(range: f64) -> Result<()> {
    if range.is_finite() && range > 0.0 {
        Ok(())
    } else {
        Err(StaffError::InvalidValue(format!(
            "bend range must be positive, got {}",
            range
        )))
    }
}

impl TryFrom<f64> for MidiBend {
    type Error = StaffError;

    fn try_from(fraction: f64) -> Result<Self> {
        Self::new(fraction)
    }
}

impl From<MidiBend> for f64 {
    fn from(value: MidiBend) -> Self {
        value.0
    }
}
