//! Chord spelling: map a set of pitch classes to standard chord symbols.
//!
//! A static interval-template vocabulary, matched exactly against the
//! interval set above each candidate root. The order of the input list
//! drives the root search, so callers that place the bass pitch class
//! first get inversion-aware results (a non-bass root becomes a slash
//! chord, e.g. [E, C, G] → "C/E").

use crate::notes::PITCH_CLASSES;

/// Interval sets (semitones above the root, ascending) and their symbol
/// suffixes. Exact-match vocabulary — partial or superset voicings fall
/// through to the caller's fallback tiers.
const CHORD_TEMPLATES: &[(&[u8], &str)] = &[
    // Triads
    (&[0, 4, 7], ""),
    (&[0, 3, 7], "m"),
    (&[0, 3, 6], "dim"),
    (&[0, 4, 8], "aug"),
    (&[0, 2, 7], "sus2"),
    (&[0, 5, 7], "sus4"),
    // Power chord
    (&[0, 7], "5"),
    // Sixths and sevenths
    (&[0, 4, 7, 9], "6"),
    (&[0, 3, 7, 9], "m6"),
    (&[0, 4, 7, 10], "7"),
    (&[0, 4, 7, 11], "maj7"),
    (&[0, 3, 7, 10], "m7"),
    (&[0, 3, 7, 11], "mMaj7"),
    (&[0, 3, 6, 10], "m7b5"),
    (&[0, 3, 6, 9], "dim7"),
    (&[0, 5, 7, 10], "7sus4"),
    (&[0, 2, 4, 7], "add9"),
    // Ninths
    (&[0, 2, 4, 7, 10], "9"),
    (&[0, 2, 4, 7, 11], "maj9"),
    (&[0, 2, 3, 7, 10], "m9"),
];

/// Detect chord symbols for an ordered list of distinct pitch classes.
///
/// Each pitch class is tried as the root in list order; every root whose
/// interval set matches a template contributes one symbol. The first
/// element is treated as the bass: a match rooted elsewhere is spelled as
/// a slash chord. Returns symbols in root-try order (first is preferred);
/// empty when nothing in the vocabulary matches.
pub fn detect(pitch_classes: &[u8]) -> Vec<String> {
    if pitch_classes.len() < 2 {
        return Vec::new();
    }
    let bass = pitch_classes[0] % 12;

    let mut symbols = Vec::new();
    for &candidate in pitch_classes {
        let root = candidate % 12;
        let mut intervals: Vec<u8> = pitch_classes
            .iter()
            .map(|&pc| (pc % 12 + 12 - root) % 12)
            .collect();
        intervals.sort_unstable();
        intervals.dedup();

        if let Some(&(_, suffix)) = CHORD_TEMPLATES
            .iter()
            .find(|(template, _)| *template == intervals.as_slice())
        {
            let mut name = format!("{}{}", PITCH_CLASSES[root as usize], suffix);
            if root != bass {
                name.push('/');
                name.push_str(PITCH_CLASSES[bass as usize]);
            }
            symbols.push(name);
        }
    }
    symbols
}
