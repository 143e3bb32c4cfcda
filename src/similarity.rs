//! Pairwise recording similarity from key, tempo, and chord vocabulary.

use std::collections::HashSet;

use crate::library::RecordingSummary;

/// Minimum score a pair needs to be reported.
const MIN_SCORE: u32 = 30;

/// Result cap.
const MAX_RESULTS: usize = 15;

/// Tempos within this many BPM count as similar.
const TEMPO_WINDOW: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarPair {
    /// The two recording titles, in library order
    pub pair: [String; 2],
    /// 0-100 similarity score
    pub similarity: u32,
    /// One human-readable reason per contributing factor
    pub reasons: Vec<String>,
}

/// Score every unordered pair of recordings.
///
/// Same key is worth 30, tempos within 10 BPM are worth 20, and a chord
/// vocabulary with Jaccard overlap above 0.5 adds up to 50 more. Pairs
/// below 30 or without a single concrete reason are dropped. Sorted by
/// score descending, top 15. Scoring is symmetric — swapping the input
/// order of two recordings changes neither score nor reasons.
///
/// All-pairs is O(n²) in library size: fine for a personal library of
/// tens to low hundreds of recordings, a scaling limit beyond that.
pub fn find_similar_recordings(analyses: &[RecordingSummary]) -> Vec<SimilarPair> {
    let mut pairs: Vec<SimilarPair> = Vec::new();

    for i in 0..analyses.len() {
        for j in i + 1..analyses.len() {
            let a = &analyses[i];
            let b = &analyses[j];
            let mut score = 0u32;
            let mut reasons = Vec::new();

            if let (Some(key_a), Some(key_b)) = (&a.key_signature, &b.key_signature) {
                if key_a == key_b {
                    score += 30;
                    reasons.push(format!("Same key: {key_a}"));
                }
            }

            if let (Some(tempo_a), Some(tempo_b)) = (a.tempo, b.tempo) {
                if tempo_a.abs_diff(tempo_b) < TEMPO_WINDOW {
                    score += 20;
                    let midpoint = ((tempo_a + tempo_b) as f64 / 2.0).round() as u32;
                    reasons.push(format!("Similar tempo (~{midpoint} BPM)"));
                }
            }

            let chords_a: HashSet<&str> = a.chords.iter().map(|c| c.chord.as_str()).collect();
            let chords_b: HashSet<&str> = b.chords.iter().map(|c| c.chord.as_str()).collect();
            let shared = chords_a.intersection(&chords_b).count();
            let union = chords_a.union(&chords_b).count();
            let overlap = if union > 0 {
                shared as f64 / union as f64
            } else {
                0.0
            };
            if overlap > 0.5 {
                score += (overlap * 50.0).round() as u32;
                reasons.push(format!(
                    "{shared} shared chords ({}% overlap)",
                    (overlap * 100.0).round() as u32
                ));
            }

            if score >= MIN_SCORE && !reasons.is_empty() {
                pairs.push(SimilarPair {
                    pair: [a.title.clone(), b.title.clone()],
                    similarity: score,
                    reasons,
                });
            }
        }
    }

    pairs.sort_by(|a, b| b.similarity.cmp(&a.similarity));
    pairs.truncate(MAX_RESULTS);
    pairs
}
