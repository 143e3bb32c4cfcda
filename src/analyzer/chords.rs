use crate::notes::{midi_to_note_name, ChordEvent, NoteEvent};
use crate::spell;

/// Window width when no tempo is available.
const FALLBACK_WINDOW: f64 = 0.5;

/// Two windows merge only when there is no real gap between them.
const MERGE_TOLERANCE: f64 = 0.01;

/// Detect chords over adaptive, non-overlapping time windows.
///
/// Window width is one beat when the tempo is known, 0.5s otherwise.
/// Per window the sounding notes are gathered, the lowest pitch supplies
/// the bass, and the spelling lookup runs in fallback tiers: bass-first
/// ordering (inversion-aware), then the plain pitch-class set, then the
/// four strongest notes by velocity, and finally a raw slash-joined
/// pitch-class string. Windows with fewer than two distinct pitch classes
/// are skipped. Consecutive windows resolving to the same symbol merge
/// into one event, so re-running on the same notes reproduces the same
/// merged sequence.
pub fn detect_chords(notes: &[NoteEvent], tempo: Option<u32>) -> Vec<ChordEvent> {
    if notes.is_empty() {
        return Vec::new();
    }

    let window_size = match tempo {
        Some(bpm) => 60.0 / bpm as f64,
        None => FALLBACK_WINDOW,
    };
    let max_time = notes
        .iter()
        .map(|n| n.time + n.duration)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut chords: Vec<ChordEvent> = Vec::new();

    let mut t = 0.0_f64;
    while t < max_time {
        let window_end = t + window_size;

        let mut active: Vec<&NoteEvent> = notes
            .iter()
            .filter(|n| n.time < window_end && n.time + n.duration > t)
            .collect();
        if active.is_empty() {
            t += window_size;
            continue;
        }

        // Bass note matters for inversions
        active.sort_by_key(|n| n.midi);
        let mut pitch_classes: Vec<u8> = Vec::new();
        for note in &active {
            let pc = note.midi % 12;
            if !pitch_classes.contains(&pc) {
                pitch_classes.push(pc);
            }
        }

        if pitch_classes.len() < 2 {
            t += window_size;
            continue;
        }

        let chord_name = match spell_window(&pitch_classes, &active) {
            Some(name) => name,
            None => {
                t += window_size;
                continue;
            }
        };

        // Merge with the previous event when the symbol repeats without a gap
        match chords.last_mut() {
            Some(last)
                if last.chord == chord_name
                    && (last.time + last.duration - t).abs() < MERGE_TOLERANCE =>
            {
                last.duration += window_size;
            }
            _ => chords.push(ChordEvent {
                chord: chord_name,
                time: t,
                duration: window_size,
            }),
        }

        t += window_size;
    }

    chords
}

/// Run the spelling fallback tiers for one window.
///
/// `pitch_classes` is pitch-ascending with the bass first; `active` is the
/// pitch-sorted sounding note list.
fn spell_window(pitch_classes: &[u8], active: &[&NoteEvent]) -> Option<String> {
    // Tier 1: bass pitch class first, for inversion detection
    if let Some(name) = spell::detect(pitch_classes).into_iter().next() {
        return Some(name);
    }

    // Tier 2: the full set without the bass bias
    let mut unordered = pitch_classes.to_vec();
    unordered.sort_unstable();
    if let Some(name) = spell::detect(&unordered).into_iter().next() {
        return Some(name);
    }

    // Tier 3: the strongest notes only — a dense pedal-down window often
    // hides a plain triad under accumulated overtones
    let mut by_velocity: Vec<&NoteEvent> = active.to_vec();
    by_velocity.sort_by(|a, b| b.velocity.cmp(&a.velocity));
    let mut strong_pcs: Vec<u8> = Vec::new();
    for note in by_velocity.iter().take(4) {
        let pc = note.midi % 12;
        if !strong_pcs.contains(&pc) {
            strong_pcs.push(pc);
        }
    }
    if strong_pcs.len() < 2 {
        return None;
    }
    if let Some(name) = spell::detect(&strong_pcs).into_iter().next() {
        return Some(name);
    }

    // Tier 4: raw pitch-class listing
    Some(
        strong_pcs
            .iter()
            .map(|&pc| midi_to_note_name(pc))
            .collect::<Vec<_>>()
            .join("/"),
    )
}
