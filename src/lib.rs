pub mod duration;
pub mod error;
pub mod instrument;
pub mod pattern;
pub mod pitch;
pub mod store;

pub use duration::{Duration, Fraction, Tempo, Tuplet};
pub use error::StaffError;
pub use instrument::{Articulation, Instrument, InstrumentRange};
pub use pattern::DurationPattern;
pub use pitch::{Cents, Diapason, Frequency, MidiBend, MidiPitch};
pub use store::{InstrumentStore, MemoryStore, StoreConfig, YamlStore};

/// Coerces every pitch of a line into an instrument's range, each one placed
/// near the previous coerced pitch so the line keeps its contour.
///
/// The first pitch is placed near `start`. Fails on the first pitch that
/// [`Instrument::to_range`] rejects.
pub fn fit_line(
    instrument: &Instrument,
    line: &[MidiPitch],
    start: &MidiPitch,
) -> error::Result<Vec<MidiPitch>> {
    let mut previous = *start;
    line.iter()
        .map(|pitch| {
            previous = instrument.to_range(pitch, &previous)?;
            Ok(previous)
        })
        .collect()
}
