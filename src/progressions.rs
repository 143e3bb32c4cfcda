//! Cross-recording progression mining: contiguous chord subsequences that
//! show up in at least two different recordings.

use std::collections::HashMap;

use crate::library::RecordingSummary;

/// Shortest subsequence worth calling a progression.
pub const DEFAULT_MIN_LENGTH: usize = 3;

/// Longest subsequence is min length + 3 (3 through 6 chords by default).
const LENGTH_SPAN: usize = 3;

/// Result cap.
const MAX_RESULTS: usize = 20;

/// Progressions are keyed by their chord names joined with an arrow, the
/// same separator the per-recording summarizer uses.
const ARROW: &str = " → ";

#[derive(Debug, Clone, PartialEq)]
pub struct CommonProgression {
    /// The chord names, in order
    pub progression: Vec<String>,
    /// Raw occurrence count across the whole library
    pub count: usize,
    /// Distinct recording titles containing the progression (always ≥2)
    pub recordings: Vec<String>,
}

struct Support {
    count: usize,
    recordings: Vec<String>,
}

/// Mine progressions shared across recordings.
///
/// Every contiguous chord-name subsequence of length `min_length` through
/// `min_length + 3` is counted; only those appearing in at least two
/// distinct recordings survive. Sorted by (distinct recordings, raw
/// count) descending, capped at 20. Ties keep first-encounter order.
pub fn find_common_progressions(
    analyses: &[RecordingSummary],
    min_length: usize,
) -> Vec<CommonProgression> {
    // windows(0) is not a thing
    let min_length = min_length.max(1);

    let mut support: HashMap<String, Support> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for analysis in analyses {
        let sequence: Vec<&str> = analysis.chords.iter().map(|c| c.chord.as_str()).collect();

        for len in min_length..=(min_length + LENGTH_SPAN).min(sequence.len()) {
            for window in sequence.windows(len) {
                let key = window.join(ARROW);
                let entry = support.entry(key.clone()).or_insert_with(|| {
                    order.push(key);
                    Support { count: 0, recordings: Vec::new() }
                });
                entry.count += 1;
                if !entry.recordings.contains(&analysis.title) {
                    entry.recordings.push(analysis.title.clone());
                }
            }
        }
    }

    let mut shared: Vec<CommonProgression> = order
        .iter()
        .map(|key| {
            let entry = &support[key];
            CommonProgression {
                progression: key.split(ARROW).map(str::to_string).collect(),
                count: entry.count,
                recordings: entry.recordings.clone(),
            }
        })
        .filter(|p| p.recordings.len() >= 2)
        .collect();

    shared.sort_by(|a, b| {
        b.recordings
            .len()
            .cmp(&a.recordings.len())
            .then(b.count.cmp(&a.count))
    });
    shared.truncate(MAX_RESULTS);
    shared
}
