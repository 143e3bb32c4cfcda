use crate::notes::NoteEvent;

/// Notes needed before the accent evidence is worth reading.
const MIN_NOTES: usize = 8;

/// How much stronger the 3-beat evidence must be before we leave 4/4.
const TRIPLE_BIAS: f64 = 1.15;

/// Detect the time signature from accent phase patterns.
///
/// Each note's onset is placed inside a 3-beat and a 4-beat cycle; notes
/// close to a cycle boundary (the downbeat) contribute their velocity,
/// scaled by a Gaussian closeness kernel. Scores are normalized by the
/// number of cycles the recording spans so longer cycles don't win by
/// accumulation alone. Only "3/4" and "4/4" are distinguished — a
/// deliberate scope limit, not an oversight.
///
/// Defaults to "4/4" without a tempo or with fewer than 8 notes.
pub fn detect_time_signature(notes: &[NoteEvent], tempo: Option<u32>) -> String {
    let Some(tempo) = tempo else {
        return "4/4".to_string();
    };
    if notes.len() < MIN_NOTES {
        return "4/4".to_string();
    }

    let beat_duration = 60.0 / tempo as f64;
    let first_onset = notes.iter().map(|n| n.time).fold(f64::INFINITY, f64::min);
    let last_onset = notes.iter().map(|n| n.time).fold(f64::NEG_INFINITY, f64::max);
    let total_duration = last_onset - first_onset;

    let mut score3 = 0.0_f64;
    let mut score4 = 0.0_f64;

    for note in notes {
        let beat_pos3 = (note.time / beat_duration) % 3.0;
        let beat_pos4 = (note.time / beat_duration) % 4.0;
        // Distance to the nearest cycle boundary in beats
        let dist3 = beat_pos3.min(3.0 - beat_pos3);
        let dist4 = beat_pos4.min(4.0 - beat_pos4);
        score3 += note.velocity as f64 * (-dist3 * dist3 * 10.0).exp();
        score4 += note.velocity as f64 * (-dist4 * dist4 * 10.0).exp();
    }

    // Normalize by expected cycle count
    score3 /= (total_duration / (beat_duration * 3.0)).max(1.0);
    score4 /= (total_duration / (beat_duration * 4.0)).max(1.0);

    if score3 > score4 * TRIPLE_BIAS {
        "3/4".to_string()
    } else {
        "4/4".to_string()
    }
}
