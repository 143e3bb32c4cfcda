use crate::notes::NoteEvent;

/// Melody tracking window — short enough to follow ornamented lines.
const MELODY_WINDOW: f64 = 0.1;

/// Bass lines move slower, so the window is wider.
const BASS_WINDOW: f64 = 0.25;

/// Merge tolerance between consecutive windows, matching chord merging.
const MERGE_TOLERANCE: f64 = 0.01;

#[derive(Clone, Copy)]
enum Voice {
    Top,
    Bottom,
}

/// Extract the melody (top voice) as a monophonic reduction.
pub fn extract_melody(notes: &[NoteEvent]) -> Vec<NoteEvent> {
    extract_voice(notes, MELODY_WINDOW, Voice::Top)
}

/// Extract the bass line (bottom voice) as a monophonic reduction.
pub fn extract_bass_line(notes: &[NoteEvent]) -> Vec<NoteEvent> {
    extract_voice(notes, BASS_WINDOW, Voice::Bottom)
}

/// Slide a fixed window over the polyphonic input and keep one sounding
/// note per window — the highest for the melody, the lowest for the bass.
/// Ties keep the first note in time order. Windows holding the same pitch
/// merge into one extended event, like chord windows do.
fn extract_voice(notes: &[NoteEvent], window_size: f64, voice: Voice) -> Vec<NoteEvent> {
    if notes.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<NoteEvent> = notes.to_vec();
    sorted.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));

    let max_time = notes
        .iter()
        .map(|n| n.time + n.duration)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut voice_notes: Vec<NoteEvent> = Vec::new();

    let mut t = 0.0_f64;
    while t < max_time {
        let picked = sorted
            .iter()
            .filter(|n| n.time <= t + window_size && n.time + n.duration > t)
            .fold(None::<&NoteEvent>, |best, n| match best {
                None => Some(n),
                Some(b) => match voice {
                    Voice::Top if n.midi > b.midi => Some(n),
                    Voice::Bottom if n.midi < b.midi => Some(n),
                    _ => Some(b),
                },
            });

        if let Some(picked) = picked {
            match voice_notes.last_mut() {
                Some(last)
                    if last.midi == picked.midi
                        && (last.time + last.duration - t).abs() < MERGE_TOLERANCE =>
                {
                    last.duration += window_size;
                }
                _ => voice_notes.push(NoteEvent {
                    time: t,
                    duration: window_size,
                    ..*picked
                }),
            }
        }

        t += window_size;
    }

    voice_notes
}
