use crate::notes::NoteEvent;

const MIN_BPM: f64 = 50.0;
const MAX_BPM: f64 = 200.0;

/// Beat-duration search grid: 240 BPM down to 40 BPM in 5ms steps.
const MIN_BEAT: f64 = 60.0 / 240.0;
const MAX_BEAT: f64 = 60.0 / 40.0;
const BEAT_STEP: f64 = 0.005;

/// IOIs outside this range are treated as noise (grace-note smear or
/// silence between phrases) and discarded before the search.
const MIN_IOI: f64 = 0.05;
const MAX_IOI: f64 = 2.0;

/// Estimate a single whole-recording tempo from note onsets.
///
/// Consecutive inter-onset intervals are scored against every candidate
/// beat duration on the grid: an IOI supports a candidate when it lies
/// near an integer multiple of the beat (at subdivisions 0.5x, 1x, 2x,
/// 4x), with a Gaussian kernel rewarding close alignment. The winning
/// beat is folded by octaves into 50-200 BPM — tempo detection is
/// inherently ambiguous by powers of two.
///
/// Returns None for fewer than 4 notes or when no IOI survives the gate.
pub fn estimate_tempo(notes: &[NoteEvent]) -> Option<u32> {
    if notes.len() < 4 {
        return None;
    }

    let mut onsets: Vec<f64> = notes.iter().map(|n| n.time).collect();
    onsets.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let intervals: Vec<f64> = onsets
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|&ioi| ioi > MIN_IOI && ioi < MAX_IOI)
        .collect();
    if intervals.is_empty() {
        return None;
    }

    let mut best_beat = 0.0_f64;
    let mut best_score = f64::NEG_INFINITY;

    let mut beat = MIN_BEAT;
    while beat <= MAX_BEAT {
        let mut score = 0.0_f64;
        for &ioi in &intervals {
            // Subdivisions and groupings of the candidate beat
            let mut mult = 0.5;
            while mult <= 4.0 {
                let ratio = ioi / (beat * mult);
                let nearest = ratio.round();
                if nearest > 0.0 && nearest <= 8.0 {
                    let deviation = (ratio - nearest).abs();
                    score += (-deviation * deviation * 50.0).exp();
                }
                mult *= 2.0;
            }
        }
        if score > best_score {
            best_score = score;
            best_beat = beat;
        }
        beat += BEAT_STEP;
    }

    if best_beat <= 0.0 {
        return None;
    }

    let mut bpm = 60.0 / best_beat;
    while bpm < MIN_BPM {
        bpm *= 2.0;
    }
    while bpm > MAX_BPM {
        bpm /= 2.0;
    }

    Some(bpm.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes_at(onsets: &[f64]) -> Vec<NoteEvent> {
        onsets
            .iter()
            .map(|&t| NoteEvent {
                midi: 60,
                time: t,
                duration: 0.25,
                velocity: 90,
            })
            .collect()
    }

    #[test]
    fn test_steady_quarter_notes_at_120() {
        // IOI of exactly 0.5s must fold to 120 BPM, not 240 or 60
        let notes = notes_at(&[0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]);
        assert_eq!(estimate_tempo(&notes), Some(120));
    }

    #[test]
    fn test_result_always_in_range() {
        // Very slow IOIs (1.5s) still land inside 50-200
        let notes = notes_at(&[0.0, 1.5, 3.0, 4.5, 6.0]);
        let bpm = estimate_tempo(&notes).unwrap();
        assert!((50..=200).contains(&bpm), "got {bpm}");
    }

    #[test]
    fn test_mixed_subdivisions() {
        // Eighths and quarters at 120 BPM: the eighth grid wins the search
        // and the octave fold brings it back to 120
        let notes = notes_at(&[0.0, 0.25, 0.5, 1.0, 1.25, 1.5, 2.0, 2.25, 2.5, 3.0]);
        assert_eq!(estimate_tempo(&notes), Some(120));
    }

    #[test]
    fn test_too_few_notes() {
        let notes = notes_at(&[0.0, 0.5, 1.0]);
        assert_eq!(estimate_tempo(&notes), None);
    }

    #[test]
    fn test_all_intervals_gated_out() {
        // One block chord: all IOIs are zero, nothing survives the gate
        let notes = notes_at(&[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(estimate_tempo(&notes), None);
    }

    #[test]
    fn test_unsorted_input() {
        let notes = notes_at(&[1.5, 0.0, 1.0, 0.5, 2.0, 3.0, 2.5, 3.5]);
        assert_eq!(estimate_tempo(&notes), Some(120));
    }
}
