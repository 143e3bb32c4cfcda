use crate::notes::{NoteEvent, PITCH_CLASSES};

// Krumhansl-Kessler key profiles (from cognitive probe-tone studies).
// Each array gives the perceptual stability rating for each pitch class
// relative to the tonic at index 0.
const KK_MAJOR: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const KK_MINOR: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Detected key with confidence
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEstimate {
    /// e.g. "C Major", "A Minor"
    pub key: String,
    /// 0.0 to 1.0, mapped from the winning Pearson correlation
    pub confidence: f64,
}

/// Krumhansl-Schmuckler key finding over a duration-weighted pitch-class
/// histogram.
///
/// The histogram is the fixed observation; the hypothesis (candidate
/// tonic) is what rotates. Each K-K profile is rotated so its index 0
/// lands on the candidate tonic, then Pearson-correlated against the
/// normalized histogram. Candidates are enumerated tonic 0..11 with major
/// checked before minor, and the first maximum wins.
///
/// Durations weight the histogram rather than velocities — transcription
/// velocity is too noisy to trust.
pub fn detect_key(notes: &[NoteEvent]) -> Option<KeyEstimate> {
    if notes.is_empty() {
        return None;
    }

    let mut histogram = [0.0_f64; 12];
    for note in notes {
        histogram[(note.midi % 12) as usize] += note.duration;
    }

    let total: f64 = histogram.iter().sum();
    if total <= 0.0 {
        // Silence / no pitched content
        return None;
    }
    let mut normalized = histogram;
    for bin in &mut normalized {
        *bin /= total;
    }

    let mut best_key = None;
    let mut best_corr = f64::NEG_INFINITY;

    for tonic in 0..12 {
        for (profile, mode) in [(&KK_MAJOR, "Major"), (&KK_MINOR, "Minor")] {
            let corr = correlate_at_tonic(&normalized, profile, tonic);
            if corr > best_corr {
                best_corr = corr;
                best_key = Some(format!("{} {}", PITCH_CLASSES[tonic], mode));
            }
        }
    }

    best_key.map(|key| KeyEstimate {
        key,
        confidence: ((best_corr + 1.0) / 2.0).clamp(0.0, 1.0),
    })
}

/// Pearson correlation between the histogram and a profile rotated so that
/// profile index 0 aligns with `tonic`. Pearson compares only the shape of
/// the two distributions, not their magnitudes.
fn correlate_at_tonic(histogram: &[f64; 12], profile: &[f64; 12], tonic: usize) -> f64 {
    let mut rotated = [0.0_f64; 12];
    for (degree, &weight) in profile.iter().enumerate() {
        rotated[(degree + tonic) % 12] = weight;
    }

    let mean_h = histogram.iter().sum::<f64>() / 12.0;
    let mean_p = rotated.iter().sum::<f64>() / 12.0;

    let mut cov = 0.0_f64;
    let mut var_h = 0.0_f64;
    let mut var_p = 0.0_f64;
    for i in 0..12 {
        let dh = histogram[i] - mean_h;
        let dp = rotated[i] - mean_p;
        cov += dh * dp;
        var_h += dh * dh;
        var_p += dp * dp;
    }

    let denom = (var_h * var_p).sqrt();
    if denom > 1e-12 { cov / denom } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale_notes(pitch_classes: &[u8]) -> Vec<NoteEvent> {
        pitch_classes
            .iter()
            .enumerate()
            .map(|(i, &pc)| NoteEvent {
                midi: 60 + pc,
                time: i as f64 * 0.5,
                duration: 0.5,
                velocity: 80,
            })
            .collect()
    }

    #[test]
    fn test_c_major_scale() {
        let notes = scale_notes(&[0, 2, 4, 5, 7, 9, 11]);
        let estimate = detect_key(&notes).unwrap();
        assert_eq!(estimate.key, "C Major");
        assert!(
            estimate.confidence > 0.8,
            "expected strong confidence, got {}",
            estimate.confidence
        );
    }

    #[test]
    fn test_rotation_direction_d_major() {
        // D major scale: D E F# G A B C#. A mis-rotated profile would label
        // this with some other tonic entirely.
        let notes = scale_notes(&[2, 4, 6, 7, 9, 11, 13]);
        let estimate = detect_key(&notes).unwrap();
        assert_eq!(estimate.key, "D Major");
    }

    #[test]
    fn test_a_minor_weighted_toward_tonic() {
        // Natural minor scale with a long tonic drone to break the
        // relative-major ambiguity
        let mut notes = scale_notes(&[9, 11, 12, 14, 16, 17, 19]);
        notes.push(NoteEvent {
            midi: 57,
            time: 4.0,
            duration: 4.0,
            velocity: 80,
        });
        let estimate = detect_key(&notes).unwrap();
        assert_eq!(estimate.key, "A Minor");
    }

    #[test]
    fn test_empty_notes() {
        assert!(detect_key(&[]).is_none());
    }

    #[test]
    fn test_zero_duration_histogram() {
        // Degenerate input: notes that contribute no histogram mass
        let notes = vec![NoteEvent {
            midi: 60,
            time: 0.0,
            duration: 0.0,
            velocity: 80,
        }];
        assert!(detect_key(&notes).is_none());
    }

    #[test]
    fn test_duration_weighting_beats_note_count() {
        // Many short off-key notes vs one long in-key chord tone: duration
        // weighting should keep the long notes in charge.
        let mut notes = vec![
            NoteEvent { midi: 60, time: 0.0, duration: 4.0, velocity: 50 },
            NoteEvent { midi: 64, time: 0.0, duration: 4.0, velocity: 50 },
            NoteEvent { midi: 67, time: 0.0, duration: 4.0, velocity: 50 },
        ];
        for i in 0..4 {
            notes.push(NoteEvent {
                midi: 61,
                time: 4.0 + i as f64 * 0.1,
                duration: 0.05,
                velocity: 127,
            });
        }
        let estimate = detect_key(&notes).unwrap();
        assert_eq!(estimate.key, "C Major");
    }
}
