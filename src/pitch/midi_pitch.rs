//! The composite pitch value and its conversions.

use super::tuning::{octave_divisions, Cents, Diapason, Frequency, MidiBend, TWELVE_DIVS};
use crate::error::{Result, StaffError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::num::NonZeroU32;

/// Residual bends smaller than this are treated as float noise and dropped
/// when converting from a frequency.
const BEND_EPSILON: f64 = 1e-9;

fn twelve_divs() -> NonZeroU32 {
    TWELVE_DIVS
}

/// A pitch: an integer step number plus a fine bend, in a tuning given by a
/// diapason and a number of equal octave divisions.
///
/// Equality and ordering use the effective height `number + bend`, and are
/// only defined between pitches sharing a diapason and division count.
/// `MidiPitch::new(60)` and `MidiPitch::new(59)` bent up by a whole step are
/// the same pitch, even though their pitch classes differ.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MidiPitch {
    number: i32,
    #[serde(default)]
    bend: MidiBend,
    #[serde(default)]
    diapason: Diapason,
    #[serde(default = "twelve_divs")]
    octave_divs: NonZeroU32,
}

impl MidiPitch {
    /// A 12-tone equal-tempered pitch tuned to A440.
    pub fn new(number: i32) -> Self {
        Self::in_diapason(number, Diapason::default())
    }

    /// A pitch in the given diapason, divided the way the diapason is.
    pub fn in_diapason(number: i32, diapason: Diapason) -> Self {
        Self {
            number,
            bend: MidiBend::ZERO,
            diapason,
            octave_divs: diapason.divisions(),
        }
    }

    pub fn with_tuning(
        number: i32,
        bend: MidiBend,
        diapason: Diapason,
        octave_divs: u32,
    ) -> Result<Self> {
        Ok(Self {
            number,
            bend,
            diapason,
            octave_divs: octave_divisions(octave_divs)?,
        })
    }

    /// Same pitch with a different bend.
    pub fn with_bend(self, bend: MidiBend) -> Self {
        Self { bend, ..self }
    }

    /// Same bend and tuning, different step number.
    pub fn with_number(self, number: i32) -> Self {
        Self { number, ..self }
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn bend(&self) -> MidiBend {
        self.bend
    }

    pub fn diapason(&self) -> Diapason {
        self.diapason
    }

    pub fn octave_divs(&self) -> u32 {
        self.octave_divs.get()
    }

    /// Position within the octave, `0..octave_divs`. Bend is ignored.
    pub fn pitch_class(&self) -> i32 {
        self.number.rem_euclid(self.divs())
    }

    /// Octave number, counted so that number 60 falls in octave 4 when the
    /// octave has twelve divisions.
    pub fn octave(&self) -> i32 {
        self.number.div_euclid(self.divs()) - 1
    }

    /// Effective height in division steps: `number + bend`.
    pub fn height(&self) -> f64 {
        f64::from(self.number) + self.bend.fraction()
    }

    /// Whether both pitches share a diapason and division count, so their
    /// heights are directly comparable.
    pub fn same_tuning(&self, other: &MidiPitch) -> bool {
        self.octave_divs == other.octave_divs && self.diapason == other.diapason
    }

    pub fn to_frequency(&self) -> Frequency {
        let steps = self.height() - f64::from(self.diapason.number());
        self.diapason
            .frequency()
            .transpose(Cents::new(steps * Cents::OCTAVE.value() / f64::from(self.divs())))
    }

    /// Nearest division step to `frequency`, with the remainder as bend.
    ///
    /// ```
    /// use staff::{Diapason, Frequency, MidiPitch};
    ///
    /// let hz = Frequency::new(261.6255653005986).unwrap();
    /// let c4 = MidiPitch::from_frequency(hz, Diapason::default(), 12).unwrap();
    /// assert_eq!(c4.number(), 60);
    /// assert!(c4.bend().is_zero());
    /// ```
    pub fn from_frequency(frequency: Frequency, diapason: Diapason, octave_divs: u32) -> Result<Self> {
        let divs = octave_divisions(octave_divs)?;
        let steps = f64::from(diapason.number())
            + f64::from(divs.get()) * (frequency.hz() / diapason.frequency().hz()).log2();
        let number = steps.round();
        if number < f64::from(i32::MIN) || number > f64::from(i32::MAX) {
            return Err(StaffError::InvalidValue(format!(
                "{} is out of the representable pitch range",
                frequency
            )));
        }
        let mut residual = steps - number;
        if residual.abs() < BEND_EPSILON {
            residual = 0.0;
        }
        Ok(Self {
            number: number as i32,
            bend: MidiBend::new(residual)?,
            diapason,
            octave_divs: divs,
        })
    }

    /// Moves the pitch by whole division steps, keeping bend and tuning.
    pub fn transpose(&self, steps: i32) -> Result<Self> {
        let number = self.number.checked_add(steps).ok_or_else(|| {
            StaffError::InvalidValue(format!(
                "transposing {} by {} steps leaves the pitch range",
                self.number, steps
            ))
        })?;
        Ok(self.with_number(number))
    }

    /// Moves the pitch by an arbitrary interval. The result is re-quantized to
    /// the nearest step of this pitch's tuning.
    pub fn transpose_cents(&self, cents: Cents) -> Result<Self> {
        Self::from_frequency(
            self.to_frequency().transpose(cents),
            self.diapason,
            self.octave_divs(),
        )
    }

    /// Interval from `other` up to this pitch.
    pub fn cents_from(&self, other: &MidiPitch) -> Cents {
        Cents::between(*self, *other)
    }

    /// Orders two pitches of the same tuning by height.
    pub fn try_cmp(&self, other: &MidiPitch) -> Result<Ordering> {
        if !self.same_tuning(other) {
            return Err(StaffError::IncompatibleTuning(format!(
                "cannot order pitch {} ({} divisions) against {} ({} divisions) by number; \
                 compare by frequency instead",
                self.number,
                self.octave_divs,
                other.number,
                other.octave_divs
            )));
        }
        Ok(self.height().total_cmp(&other.height()))
    }

    /// Orders any two pitches by sounding frequency.
    pub fn cmp_by_frequency(&self, other: &MidiPitch) -> Ordering {
        self.to_frequency().hz().total_cmp(&other.to_frequency().hz())
    }

    pub(crate) fn divs(&self) -> i32 {
        // Division counts beyond i32::MAX have no musical meaning.
        i32::try_from(self.octave_divs.get()).unwrap_or(i32::MAX)
    }
}

impl Default for MidiPitch {
    /// Middle C.
    fn default() -> Self {
        Self::new(60)
    }
}

impl PartialEq for MidiPitch {
    fn eq(&self, other: &Self) -> bool {
        self.same_tuning(other) && self.height() == other.height()
    }
}

impl PartialOrd for MidiPitch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl From<MidiPitch> for Frequency {
    fn from(pitch: MidiPitch) -> Self {
        pitch.to_frequency()
    }
}
