//! # Instrument Module
//!
//! Instruments, their playable ranges and their articulations.
//!
//! ## Range Coercion
//! [`Instrument::to_range`] moves a pitch by whole octaves so it lands inside
//! the instrument's range, as near as it can to a reference pitch:
//!
//! 1. The reference (`close_to`) is clamped into `[bottom, top]`
//! 2. If the pitch classes match, the reference's number is used as is
//! 3. Otherwise the nearer of the two same-class neighbours (below or above the
//!    reference) is tried first, and the other one is used if the first falls
//!    outside the range
//!
//! Only those two neighbours are considered. When the range is narrower than an
//! octave both may fall outside it, in which case the second one is returned.
//!
//! ## Example
//! ```rust
//! use staff::{Instrument, InstrumentRange, MidiPitch};
//!
//! let cello = Instrument::new(
//!     "Cello",
//!     "Strings",
//!     InstrumentRange::new(MidiPitch::new(36), MidiPitch::new(76)).unwrap(),
//!     vec![],
//! )
//! .unwrap();
//!
//! let g = "G0".parse::<MidiPitch>().unwrap();
//! let coerced = cello.to_range(&g, &MidiPitch::new(40)).unwrap();
//! assert_eq!(coerced.to_string(), "G2");
//! assert!(cello.in_range(&coerced));
//! ```

use crate::error::{Result, StaffError};
use crate::pitch::MidiPitch;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// A playing technique and the key switch that selects it on a sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Articulation {
    name: String,
    key_switch: MidiPitch,
    #[serde(default)]
    abbreviation: String,
    #[serde(default)]
    description: String,
}

impl Articulation {
    pub fn new(name: impl Into<String>, key_switch: MidiPitch) -> Self {
        Self {
            name: name.into(),
            key_switch,
            abbreviation: String::new(),
            description: String::new(),
        }
    }

    pub fn with_abbreviation(self, abbreviation: impl Into<String>) -> Self {
        Self {
            abbreviation: abbreviation.into(),
            ..self
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_switch(&self) -> MidiPitch {
        self.key_switch
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Deserialize)]
struct RangeRecord {
    bottom: MidiPitch,
    top: MidiPitch,
}

/// Lowest and highest playable pitch, both inclusive. `bottom <= top`, and
/// both share one tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RangeRecord")]
pub struct InstrumentRange {
    bottom: MidiPitch,
    top: MidiPitch,
}

impl InstrumentRange {
    pub fn new(bottom: MidiPitch, top: MidiPitch) -> Result<Self> {
        if bottom.try_cmp(&top)? == Ordering::Greater {
            return Err(StaffError::InvalidValue(format!(
                "range bottom {} is above top {}",
                bottom, top
            )));
        }
        Ok(Self { bottom, top })
    }

    pub fn bottom(&self) -> MidiPitch {
        self.bottom
    }

    pub fn top(&self) -> MidiPitch {
        self.top
    }

    /// Number of division steps from bottom to top.
    pub fn span(&self) -> i32 {
        self.top.number() - self.bottom.number()
    }

    /// `bottom <= pitch <= top`. A pitch in another tuning is never contained.
    pub fn contains(&self, pitch: &MidiPitch) -> bool {
        if !self.bottom.same_tuning(pitch) {
            log::warn!(
                "range check of {} against a range in a different tuning; compare by frequency instead",
                pitch
            );
            return false;
        }
        self.bottom <= *pitch && *pitch <= self.top
    }

    /// The nearest bound if `pitch` lies outside the range, else `pitch`.
    pub fn clamp(&self, pitch: &MidiPitch) -> MidiPitch {
        if *pitch > self.top {
            self.top
        } else if *pitch < self.bottom {
            self.bottom
        } else {
            *pitch
        }
    }
}

impl TryFrom<RangeRecord> for InstrumentRange {
    type Error = StaffError;

    fn try_from(record: RangeRecord) -> Result<Self> {
        Self::new(record.bottom, record.top)
    }
}

impl fmt::Display for InstrumentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.bottom, self.top)
    }
}

fn default_category() -> String {
    "Default".to_string()
}

#[derive(Deserialize)]
struct InstrumentRecord {
    name: String,
    section: String,
    range: InstrumentRange,
    #[serde(default)]
    articulations: Vec<Articulation>,
    #[serde(default)]
    is_continuous: bool,
    #[serde(default)]
    abbreviation: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default)]
    description: String,
}

/// A musical instrument: its range, its articulations and some labels.
///
/// `category` only serves to keep instruments organised (for example by the
/// sampler plugin they load into) and defaults to `"Default"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InstrumentRecord")]
pub struct Instrument {
    name: String,
    section: String,
    range: InstrumentRange,
    articulations: Vec<Articulation>,
    is_continuous: bool,
    abbreviation: String,
    category: String,
    description: String,
}

impl Instrument {
    /// Fails if two articulations share a name.
    pub fn new(
        name: impl Into<String>,
        section: impl Into<String>,
        range: InstrumentRange,
        articulations: Vec<Articulation>,
    ) -> Result<Self> {
        let name = name.into();
        let mut seen = HashSet::new();
        if let Some(duplicate) = articulations.iter().find(|a| !seen.insert(a.name())) {
            return Err(StaffError::InvalidValue(format!(
                "instrument '{}' has more than one articulation named '{}'",
                name,
                duplicate.name()
            )));
        }
        Ok(Self {
            name,
            section: section.into(),
            range,
            articulations,
            is_continuous: false,
            abbreviation: String::new(),
            category: default_category(),
            description: String::new(),
        })
    }

    /// Whether the instrument can glide between pitches, like a string
    /// instrument or a trombone.
    pub fn continuous(self, is_continuous: bool) -> Self {
        Self {
            is_continuous,
            ..self
        }
    }

    pub fn with_abbreviation(self, abbreviation: impl Into<String>) -> Self {
        Self {
            abbreviation: abbreviation.into(),
            ..self
        }
    }

    pub fn with_category(self, category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..self
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn range(&self) -> &InstrumentRange {
        &self.range
    }

    pub fn articulations(&self) -> &[Articulation] {
        &self.articulations
    }

    pub fn is_continuous(&self) -> bool {
        self.is_continuous
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn in_range(&self, pitch: &MidiPitch) -> bool {
        self.range.contains(pitch)
    }

    /// Moves `pitch` by octaves into the instrument's range, near `close_to`.
    ///
    /// The result keeps `pitch`'s class, bend and tuning; only its number
    /// changes. See the module documentation for the search order. Both
    /// pitches must share the range's tuning, otherwise the result is
    /// [`StaffError::IncompatibleTuning`].
    pub fn to_range(&self, pitch: &MidiPitch, close_to: &MidiPitch) -> Result<MidiPitch> {
        for given in [pitch, close_to] {
            if !self.range.bottom.same_tuning(given) {
                return Err(StaffError::IncompatibleTuning(format!(
                    "{} is not in the tuning of {}'s range {}",
                    given, self.name, self.range
                )));
            }
        }
        let close_to = self.range.clamp(close_to);
        let divs = i64::from(pitch.divs());
        let reference = i64::from(close_to.number());
        let bottom = i64::from(self.range.bottom.number());
        let top = i64::from(self.range.top.number());

        // Steps down from the reference to the nearest pitch of the same class,
        // and steps up to the nearest one above it.
        let down = (i64::from(close_to.pitch_class()) - i64::from(pitch.pitch_class())).rem_euclid(divs);
        let up = divs - down;

        let number = if down == 0 {
            reference
        } else if 2 * down < divs {
            if reference - down < bottom {
                reference + up
            } else {
                reference - down
            }
        } else if reference + up > top {
            reference - down
        } else {
            reference + up
        };
        let number = i32::try_from(number).map_err(|_| {
            StaffError::InvalidValue(format!("coercing {} near {} leaves the pitch range", pitch, close_to))
        })?;

        log::trace!(
            "coerced {} into {} near {}: number {}",
            pitch,
            self.range,
            close_to,
            number
        );
        Ok(pitch.with_number(number))
    }

    /// First articulation with exactly this name (case-sensitive).
    pub fn get_articulation(&self, name: &str) -> Result<&Articulation> {
        self.articulations
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| {
                StaffError::NotFound(format!(
                    "articulation '{}' does not exist on '{}'",
                    name, self.name
                ))
            })
    }
}

impl TryFrom<InstrumentRecord> for Instrument {
    type Error = StaffError;

    fn try_from(record: InstrumentRecord) -> Result<Self> {
        Ok(Self::new(record.name, record.section, record.range, record.articulations)?
            .continuous(record.is_continuous)
            .with_abbreviation(record.abbreviation)
            .with_category(record.category)
            .with_description(record.description))
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Instrument(name='{}', category='{}', description='{}')",
            self.name, self.category, self.description
        )
    }
}
