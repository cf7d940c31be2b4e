//! # Pitch Module
//!
//! Models musical pitch in several equivalent units and converts between them.
//!
//! ## Sub-modules
//! - `tuning` - [`Diapason`], [`Frequency`], [`Cents`] and [`MidiBend`] value types
//! - `midi_pitch` - [`MidiPitch`], the composite pitch value, and its conversions
//! - `names` - Scientific pitch names ("C4", "F#2", "Eb-1") for 12-division tunings
//!
//! ## Conversion Formula
//!
//! A pitch's frequency generalizes 12-tone equal temperament to any number of
//! equal divisions per octave:
//!
//! ```text
//! frequency = diapason.frequency * 2^((number + bend - diapason.number) / octave_divs)
//! ```
//!
//! [`MidiPitch::from_frequency`] inverts this: the nearest division step becomes
//! `number` and the residual becomes the bend.
//!
//! ## Ordering Across Tunings
//!
//! Two pitches are ordered by effective height (`number + bend`) only when they
//! share a diapason and division count. Across tunings `partial_cmp` returns
//! `None` and [`MidiPitch::try_cmp`] returns `StaffError::IncompatibleTuning`;
//! use [`MidiPitch::cmp_by_frequency`] to normalize first.
//!
//! ## Example
//! ```rust
//! use staff::{Cents, MidiPitch};
//!
//! let a4: MidiPitch = "A4".parse().unwrap();
//! assert_eq!(a4.number(), 69);
//! assert_eq!(a4.to_frequency().hz(), 440.0);
//!
//! let a5 = a4.transpose(12).unwrap();
//! assert_eq!(Cents::between(a5, a4).value(), 1200.0);
//! ```
//!
//! ## Related Modules
//! - `instrument` - Uses `MidiPitch` ordering for range checks and coercion

mod midi_pitch;
mod names;
mod tuning;


pub use midi_pitch::MidiPitch;
pub use tuning::{Cents, Diapason, Frequency, MidiBend};
