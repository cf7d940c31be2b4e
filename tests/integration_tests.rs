//! Integration tests for the staff library
//!
//! Exercises the public API the way composition tooling would: build values,
//! transform them, and check the properties that must hold across modules.

use float_cmp::approx_eq;
use staff::{
    fit_line, Articulation, Cents, Diapason, Duration, DurationPattern, Instrument,
    InstrumentRange, InstrumentStore, MemoryStore, MidiBend, MidiPitch, StaffError, Tempo,
    Tuplet,
};

fn pitch(name: &str) -> MidiPitch {
    name.parse().unwrap()
}

fn patterns() -> Vec<DurationPattern> {
    let eighth = Duration::new(8).unwrap();
    let triplet = Tuplet::new(3, 2).unwrap();
    vec![
        DurationPattern::default(),
        DurationPattern::new(vec![Duration::new(4).unwrap()]),
        DurationPattern::new(vec![
            Duration::rest(8).unwrap(),
            eighth,
            eighth,
            eighth,
            Duration::new(2).unwrap(),
        ]),
        DurationPattern::new(vec![
            triplet.apply(&eighth).unwrap(),
            triplet.apply(&eighth).unwrap(),
            triplet.apply(&Duration::rest(8).unwrap()).unwrap(),
            Duration::new(4).unwrap().dotted().unwrap(),
            Duration::new(16).unwrap(),
            Duration::new(1).unwrap(),
        ]),
    ]
}

fn double_bass() -> Instrument {
    Instrument::new(
        "Double Bass",
        "Strings",
        InstrumentRange::new(pitch("E1"), pitch("E3")).unwrap(),
        vec![
            Articulation::new("Arco", pitch("C0")),
            Articulation::new("Pizzicato", pitch("C#0")).with_abbreviation("pizz."),
        ],
    )
    .unwrap()
    .continuous(true)
}

#[test]
fn test_retrograde_is_an_involution() {
    for p in patterns() {
        assert_eq!(p.retrograde().retrograde(), p);
    }
}

#[test]
fn test_prolation_scales_elapsed_time() {
    for tempo in [Tempo::new(60.0).unwrap(), Tempo::new(97.5).unwrap(), Tempo::default()] {
        for p in patterns() {
            for factor in [0.5, 2.0, 1.5, 0.25] {
                let prolated = p.prolate(factor).unwrap();
                assert!(approx_eq!(
                    f64,
                    prolated.milliseconds(&tempo),
                    p.milliseconds(&tempo) * factor,
                    epsilon = 1e-9
                ));
                assert_eq!(prolated.len(), p.len());
            }
        }
    }
}

#[test]
fn test_rotation_properties() {
    for p in patterns() {
        for n in -12..=12 {
            assert_eq!(p.rotate(n).len(), p.len());
        }
        assert_eq!(p.rotate(0), p);
        assert_eq!(p.rotate(p.len() as isize), p);
    }
}

#[test]
fn test_append_prepend_properties() {
    let d = Duration::rest(1).unwrap();
    for p in patterns() {
        let appended = p.append(d);
        assert_eq!(appended.len(), p.len() + 1);
        assert_eq!(appended.get(-1).unwrap(), d);

        let prepended = p.prepend(d);
        assert_eq!(prepended.len(), p.len() + 1);
        assert_eq!(prepended.get(0).unwrap(), d);
    }
}

#[test]
fn test_pattern_elapsed_time_at_sixty_bpm() {
    let p = &patterns()[2];
    assert_eq!(p.len(), 5);
    let expected = (1.0 / 8.0 * 4.0 + 1.0 / 2.0) * 4.0 * 1000.0;
    assert_eq!(p.milliseconds(&Tempo::new(60.0).unwrap()), expected);
}

#[test]
fn test_in_range_matches_bounds() {
    let bass = double_bass();
    let range = *bass.range();
    for number in 0..80 {
        for bend in [0.0, 0.5, -0.5] {
            let x = MidiPitch::new(number).with_bend(MidiBend::new(bend).unwrap());
            assert_eq!(bass.in_range(&x), range.bottom() <= x && x <= range.top());
        }
    }
}

#[test]
fn test_to_range_at_the_bottom_of_the_range() {
    let bass = double_bass();
    let low_e = pitch("E1");
    assert_eq!(bass.to_range(&low_e, &bass.range().bottom()).unwrap(), low_e);
    // A reference below the range is clamped to the bottom first
    assert_eq!(bass.to_range(&pitch("E3"), &pitch("C0")).unwrap(), low_e);
    // Same class one octave up sits in the middle of the range
    assert_eq!(bass.to_range(&pitch("E6"), &pitch("F2")).unwrap(), pitch("E2"));
}

#[test]
fn test_to_range_needs_the_range_tuning() {
    let bass = double_bass();
    let quarter_tones = Diapason::new(440.0, 138, 24).unwrap();
    // 24-EDO number 62 sounds as E1 but is numbered on a different grid
    let foreign_e = MidiPitch::in_diapason(62, quarter_tones);
    assert!(matches!(
        bass.to_range(&foreign_e, &pitch("E2")),
        Err(StaffError::IncompatibleTuning(_))
    ));
    assert!(matches!(
        bass.to_range(&pitch("E1"), &foreign_e),
        Err(StaffError::IncompatibleTuning(_))
    ));

    let line = [pitch("G5"), foreign_e];
    assert!(matches!(
        fit_line(&bass, &line, &pitch("G2")),
        Err(StaffError::IncompatibleTuning(_))
    ));
}

#[test]
fn test_frequency_round_trip_within_tolerance() {
    let diapasons = [
        Diapason::default(),
        Diapason::new(432.0, 69, 12).unwrap(),
        Diapason::new(440.0, 207, 36).unwrap(),
    ];
    for diapason in diapasons {
        for number in (-50..400).step_by(7) {
            let x = MidiPitch::in_diapason(number, diapason)
                .with_bend(MidiBend::new(0.123).unwrap());
            let back =
                MidiPitch::from_frequency(x.to_frequency(), x.diapason(), x.octave_divs()).unwrap();
            assert!(approx_eq!(f64, back.height(), x.height(), epsilon = 1e-6));
            assert!(back.same_tuning(&x));
        }
    }
}

#[test]
fn test_articulation_lookup() {
    let bass = double_bass();
    let pizz = bass.get_articulation("Pizzicato").unwrap();
    assert_eq!(pizz, &Articulation::new("Pizzicato", pitch("C#0")).with_abbreviation("pizz."));

    let flute = Instrument::new(
        "Flute",
        "Woodwinds",
        InstrumentRange::new(pitch("C4"), pitch("C7")).unwrap(),
        vec![Articulation::new("Flutter", pitch("C0"))],
    )
    .unwrap();
    assert!(matches!(flute.get_articulation("Pizzicato"), Err(StaffError::NotFound(_))));
}

#[test]
fn test_fit_line_keeps_contour() {
    let bass = double_bass();
    // A melody written far too high
    let line: Vec<MidiPitch> = ["G5", "A5", "B5", "E5", "D6"].iter().map(|n| pitch(n)).collect();
    let fitted = fit_line(&bass, &line, &pitch("G2")).unwrap();

    let names: Vec<String> = fitted.iter().map(|p| p.to_string()).collect();
    // E3 is five steps above B2, E2 seven below
    assert_eq!(names, vec!["G2", "A2", "B2", "E3", "D3"]);
    assert!(fitted.iter().all(|p| bass.in_range(p)));
}

#[test]
fn test_store_round_trip_preserves_pitches() {
    let quarter_tones = Diapason::new(440.0, 138, 24).unwrap();
    let instrument = Instrument::new(
        "Quarter-tone Trumpet",
        "Brass",
        InstrumentRange::new(
            MidiPitch::in_diapason(104, quarter_tones),
            MidiPitch::in_diapason(164, quarter_tones).with_bend(MidiBend::new(0.5).unwrap()),
        )
        .unwrap(),
        vec![Articulation::new("Harmon", MidiPitch::in_diapason(48, quarter_tones))
            .with_description("Harmon mute, stem in")],
    )
    .unwrap()
    .with_abbreviation("tpt.");

    let mut store = MemoryStore::new();
    store.save(&instrument).unwrap();
    let loaded = store.load("Quarter-tone Trumpet").unwrap();
    assert_eq!(loaded, instrument);
    assert_eq!(loaded.range().top().octave_divs(), 24);
}

#[test]
fn test_errors_surface_to_caller() {
    assert!(matches!(Tempo::new(0.0), Err(StaffError::InvalidValue(_))));
    assert!(matches!(Duration::new(0), Err(StaffError::InvalidValue(_))));
    assert!(matches!(Diapason::new(440.0, 69, 0), Err(StaffError::InvalidValue(_))));
    assert!(matches!(patterns()[2].prolate(0.0), Err(StaffError::InvalidValue(_))));
    assert!(matches!(patterns()[2].get(7), Err(StaffError::IndexOutOfBounds { .. })));
    assert!(matches!(
        InstrumentRange::new(pitch("E3"), pitch("E1")),
        Err(StaffError::InvalidValue(_))
    ));
}

#[test]
fn test_cents_between_pitches() {
    let fifth = Cents::between(pitch("E5"), pitch("A4"));
    assert!(approx_eq!(f64, fifth.value(), 700.0, epsilon = 1e-9));
    let tuned = pitch("A4").transpose_cents(Cents::from_ratio(1.5).unwrap()).unwrap();
    assert_eq!(tuned.number(), 76);
    assert!(approx_eq!(f64, tuned.bend().fraction(), 0.01955, epsilon = 1e-5));
}

#[test]
fn test_long_prolation_chains_report_overflow() {
    let mut p = patterns()[3].clone();
    let mut outcome = Ok(());
    let factors = [std::f64::consts::PI, std::f64::consts::SQRT_2, 1.2345678901234];
    for &factor in factors.iter().cycle().take(6) {
        match p.prolate(factor) {
            Ok(next) => p = next,
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }
    // Either a prolation or the exact total gives up, without panicking
    let total = outcome.and_then(|_| p.value());
    assert!(matches!(total, Err(StaffError::InvalidValue(_))));
    // The floating-point length is always available
    assert!(p.milliseconds(&Tempo::default()) > 0.0);
}

mod glob_import {
    use staff::*;

    fn parse_tempo(text: &str) -> Result<Tempo, String> {
        let bpm: f64 = text.parse().map_err(|_| format!("not a number: {}", text))?;
        Tempo::new(bpm).map_err(|e| e.to_string())
    }

    #[test]
    fn test_glob_import_keeps_std_result() {
        assert_eq!(parse_tempo("90").unwrap().bpm(), 90.0);
        assert!(parse_tempo("fast").is_err());
        assert!(parse_tempo("-1").is_err());
        let _: staff::error::Result<Duration> = Duration::new(4);
    }
}
