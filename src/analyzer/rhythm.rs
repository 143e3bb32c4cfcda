use std::collections::HashMap;

use crate::notes::ChordEvent;

/// Cap on reported recurring patterns per recording.
const MAX_PROGRESSIONS: usize = 5;

/// Qualitative harmonic-rhythm label from the mean chord duration.
pub fn harmonic_rhythm(chords: &[ChordEvent]) -> String {
    if chords.len() < 2 {
        return "static".to_string();
    }

    let avg_duration: f64 =
        chords.iter().map(|c| c.duration).sum::<f64>() / chords.len() as f64;

    let label = if avg_duration < 0.75 {
        "fast (chord per beat or faster)"
    } else if avg_duration < 1.5 {
        "moderate (1-2 beats per chord)"
    } else if avg_duration < 3.0 {
        "slow (1-2 bars per chord)"
    } else {
        "very slow (multi-bar)"
    };
    label.to_string()
}

/// Find 3- and 4-chord subsequences that recur within one recording.
///
/// Sliding-window substring counting over the chord-symbol sequence.
/// Only patterns seen more than once are kept, sorted by frequency
/// descending (ties keep first-encounter order), capped at 5, each
/// annotated with its occurrence count.
pub fn detect_progressions(chords: &[ChordEvent]) -> Vec<String> {
    if chords.len() < 3 {
        return Vec::new();
    }

    let symbols: Vec<&str> = chords.iter().map(|c| c.chord.as_str()).collect();

    // Collect every 3-gram and, where room allows, the 4-gram starting at
    // the same position
    let mut patterns: Vec<String> = Vec::new();
    for i in 0..symbols.len() - 2 {
        patterns.push(symbols[i..i + 3].join(" → "));
        if i + 4 <= symbols.len() {
            patterns.push(symbols[i..i + 4].join(" → "));
        }
    }

    let mut counts: HashMap<&str, u32> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for pattern in &patterns {
        let entry = counts.entry(pattern.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(pattern.as_str());
        }
        *entry += 1;
    }

    let mut recurring: Vec<(&str, u32)> = order
        .into_iter()
        .map(|p| (p, counts[p]))
        .filter(|&(_, count)| count > 1)
        .collect();
    recurring.sort_by(|a, b| b.1.cmp(&a.1));

    recurring
        .into_iter()
        .take(MAX_PROGRESSIONS)
        .map(|(pattern, count)| format!("{pattern} (×{count})"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chords(symbols: &[&str], duration: f64) -> Vec<ChordEvent> {
        symbols
            .iter()
            .enumerate()
            .map(|(i, s)| ChordEvent {
                chord: s.to_string(),
                time: i as f64 * duration,
                duration,
            })
            .collect()
    }

    #[test]
    fn test_harmonic_rhythm_labels() {
        assert_eq!(harmonic_rhythm(&chords(&["C", "F"], 0.5)), "fast (chord per beat or faster)");
        assert_eq!(harmonic_rhythm(&chords(&["C", "F"], 1.0)), "moderate (1-2 beats per chord)");
        assert_eq!(harmonic_rhythm(&chords(&["C", "F"], 2.0)), "slow (1-2 bars per chord)");
        assert_eq!(harmonic_rhythm(&chords(&["C", "F"], 4.0)), "very slow (multi-bar)");
    }

    #[test]
    fn test_harmonic_rhythm_static_under_two_chords() {
        assert_eq!(harmonic_rhythm(&[]), "static");
        assert_eq!(harmonic_rhythm(&chords(&["C"], 8.0)), "static");
    }

    #[test]
    fn test_repeated_progression_found() {
        // C F G played three times over
        let seq = chords(&["C", "F", "G", "C", "F", "G", "C", "F", "G"], 1.0);
        let progressions = detect_progressions(&seq);
        assert!(!progressions.is_empty());
        assert_eq!(progressions[0], "C → F → G (×3)");
    }

    #[test]
    fn test_no_repeats_reports_nothing() {
        let seq = chords(&["C", "F", "G", "Am", "Dm", "E"], 1.0);
        assert!(detect_progressions(&seq).is_empty());
    }

    #[test]
    fn test_under_three_chords_reports_nothing() {
        let seq = chords(&["C", "F"], 1.0);
        assert!(detect_progressions(&seq).is_empty());
    }

    #[test]
    fn test_caps_at_five_patterns() {
        // Long alternating sequence produces many recurring 3- and 4-grams
        let symbols: Vec<&str> = ["C", "F", "G", "Am"].iter().cycle().take(24).copied().collect();
        let seq = chords(&symbols, 1.0);
        let progressions = detect_progressions(&seq);
        assert_eq!(progressions.len(), 5);
    }

    #[test]
    fn test_annotation_carries_count() {
        let seq = chords(&["C", "G", "Am", "F", "C", "G", "Am", "F"], 1.0);
        let progressions = detect_progressions(&seq);
        assert!(progressions.iter().any(|p| p.ends_with("(×2)")));
    }
}
