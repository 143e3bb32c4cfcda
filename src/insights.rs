//! Library-wide distributions and harmonic-tendency labeling.
//!
//! Pure derivations over per-recording summaries — computed on demand for
//! the insights views and never persisted.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::library::RecordingSummary;

/// Chord-frequency table cap.
const MAX_CHORDS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct KeyCount {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChordCount {
    pub chord: String,
    pub count: usize,
}

/// How often each key appears across the library, descending. Ties keep
/// the order keys were first encountered in.
pub fn key_distribution(analyses: &[RecordingSummary]) -> Vec<KeyCount> {
    let keys = analyses.iter().filter_map(|a| a.key_signature.as_deref());
    group_count(keys)
        .into_iter()
        .map(|(key, count)| KeyCount { key: key.to_string(), count })
        .collect()
}

/// The most common chord symbols across the library, descending, top 20.
pub fn chord_frequency(analyses: &[RecordingSummary]) -> Vec<ChordCount> {
    let chords = analyses
        .iter()
        .flat_map(|a| a.chords.iter().map(|c| c.chord.as_str()));
    group_count(chords)
        .into_iter()
        .take(MAX_CHORDS)
        .map(|(chord, count)| ChordCount { chord: chord.to_string(), count })
        .collect()
}

/// Count distinct items, descending by count, first-encounter order on
/// ties (a stable sort over an encounter-ordered list).
fn group_count<'a>(items: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for item in items {
        let entry = counts.entry(item).or_insert(0);
        if *entry == 0 {
            order.push(item);
        }
        *entry += 1;
    }

    let mut table: Vec<(&str, usize)> = order.into_iter().map(|k| (k, counts[k])).collect();
    table.sort_by(|a, b| b.1.cmp(&a.1));
    table
}

// Chord-symbol categories. Minor must not swallow "maj7"/"maj9", so the
// 'm' may only be followed by a non-'a' character (or nothing).
static SEVENTH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"7|9|11|13").unwrap());
static MINOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-G][#b]?m([^a]|$)").unwrap());
static SUS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"sus").unwrap());
static DIM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"dim").unwrap());
static AUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"aug").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicTendencies {
    /// Qualitative observations about the player's harmonic habits
    pub tendencies: Vec<String>,
    /// One overall style label
    pub dominant_style: String,
}

/// Label the library's harmonic habits from the pooled chord multiset.
///
/// Every chord occurrence across every recording counts once; category
/// proportions against fixed thresholds produce the tendency sentences
/// and the dominant-style label.
pub fn harmonic_tendencies(analyses: &[RecordingSummary]) -> HarmonicTendencies {
    let total: usize = analyses.iter().map(|a| a.chords.len()).sum();
    if total == 0 {
        return HarmonicTendencies {
            tendencies: Vec::new(),
            dominant_style: "Not enough data".to_string(),
        };
    }

    let mut seventh = 0usize;
    let mut minor = 0usize;
    let mut sus = 0usize;
    let mut dim = 0usize;
    let mut aug = 0usize;
    for chord in analyses.iter().flat_map(|a| a.chords.iter()) {
        let name = chord.chord.as_str();
        if SEVENTH_RE.is_match(name) {
            seventh += 1;
        }
        if MINOR_RE.is_match(name) {
            minor += 1;
        }
        if SUS_RE.is_match(name) {
            sus += 1;
        }
        if DIM_RE.is_match(name) {
            dim += 1;
        }
        if AUG_RE.is_match(name) {
            aug += 1;
        }
    }

    let total = total as f64;
    let seventh_ratio = seventh as f64 / total;
    let minor_ratio = minor as f64 / total;
    let sus_ratio = sus as f64 / total;
    let dim_ratio = dim as f64 / total;
    let aug_ratio = aug as f64 / total;

    let mut tendencies = Vec::new();
    if seventh_ratio > 0.3 {
        tendencies.push("Jazz-influenced harmony".to_string());
    }
    if minor_ratio > 0.5 {
        tendencies.push("Drawn to minor tonalities".to_string());
    }
    if sus_ratio > 0.1 {
        tendencies.push("Uses suspended chords for color".to_string());
    }
    if dim_ratio > 0.05 {
        tendencies.push("Employs diminished passing chords".to_string());
    }
    if aug_ratio > 0.05 {
        tendencies.push("Uses augmented chords for tension".to_string());
    }
    if seventh_ratio <= 0.1 && sus_ratio <= 0.05 {
        tendencies.push("Diatonic/straightforward harmony".to_string());
    }

    let dominant_style = if seventh_ratio > 0.4 {
        "Jazz / Neo-Soul"
    } else if minor_ratio > 0.6 {
        "Minor-key driven"
    } else if seventh_ratio <= 0.1 {
        "Pop / Folk / Classical"
    } else {
        "Contemporary blend"
    };

    HarmonicTendencies {
        tendencies,
        dominant_style: dominant_style.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::ChordEvent;

    fn summary(id: &str, key: Option<&str>, chords: &[&str]) -> RecordingSummary {
        RecordingSummary {
            id: id.to_string(),
            title: id.to_string(),
            key_signature: key.map(str::to_string),
            tempo: None,
            chords: chords
                .iter()
                .enumerate()
                .map(|(i, c)| ChordEvent {
                    chord: c.to_string(),
                    time: i as f64,
                    duration: 1.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_key_distribution_sorted_descending() {
        let analyses = vec![
            summary("a", Some("C Major"), &[]),
            summary("b", Some("A Minor"), &[]),
            summary("c", Some("C Major"), &[]),
            summary("d", None, &[]),
        ];
        let dist = key_distribution(&analyses);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].key, "C Major");
        assert_eq!(dist[0].count, 2);
        assert_eq!(dist[1].key, "A Minor");
    }

    #[test]
    fn test_key_distribution_ties_keep_encounter_order() {
        let analyses = vec![
            summary("a", Some("G Major"), &[]),
            summary("b", Some("D Minor"), &[]),
        ];
        let dist = key_distribution(&analyses);
        assert_eq!(dist[0].key, "G Major");
        assert_eq!(dist[1].key, "D Minor");
    }

    #[test]
    fn test_chord_frequency_counts_occurrences() {
        let analyses = vec![
            summary("a", None, &["C", "F", "C"]),
            summary("b", None, &["C", "G"]),
        ];
        let freq = chord_frequency(&analyses);
        assert_eq!(freq[0].chord, "C");
        assert_eq!(freq[0].count, 3);
    }

    #[test]
    fn test_minor_regex_excludes_major_sevenths() {
        assert!(MINOR_RE.is_match("Cm"));
        assert!(MINOR_RE.is_match("F#m7"));
        assert!(MINOR_RE.is_match("Bbm9"));
        assert!(!MINOR_RE.is_match("Cmaj7"));
        assert!(!MINOR_RE.is_match("C"));
        assert!(!MINOR_RE.is_match("G7"));
    }

    #[test]
    fn test_jazz_tendency_and_style() {
        let analyses = vec![summary("a", None, &["Cmaj7", "Dm7", "G7", "Am7"])];
        let result = harmonic_tendencies(&analyses);
        assert!(result.tendencies.contains(&"Jazz-influenced harmony".to_string()));
        assert_eq!(result.dominant_style, "Jazz / Neo-Soul");
    }

    #[test]
    fn test_plain_triads_read_as_diatonic() {
        let analyses = vec![summary("a", None, &["C", "F", "G", "C"])];
        let result = harmonic_tendencies(&analyses);
        assert!(result
            .tendencies
            .contains(&"Diatonic/straightforward harmony".to_string()));
        assert_eq!(result.dominant_style, "Pop / Folk / Classical");
    }

    #[test]
    fn test_minor_heavy_library() {
        let analyses = vec![summary("a", None, &["Am", "Dm", "Em", "Am", "F"])];
        let result = harmonic_tendencies(&analyses);
        assert!(result.tendencies.contains(&"Drawn to minor tonalities".to_string()));
        assert_eq!(result.dominant_style, "Minor-key driven");
    }

    #[test]
    fn test_empty_library() {
        let result = harmonic_tendencies(&[]);
        assert!(result.tendencies.is_empty());
        assert_eq!(result.dominant_style, "Not enough data");
    }
}
