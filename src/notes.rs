use serde::{Deserialize, Serialize};

/// The twelve chromatic pitch classes, sharps only (C = 0).
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One transcribed note. Produced entirely by the upstream transcription
/// step — the analyzer never mutates these, only derives new collections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI pitch (0-127)
    pub midi: u8,
    /// Onset in seconds from the start of the recording
    pub time: f64,
    /// Sounding length in seconds
    pub duration: f64,
    /// MIDI velocity (0-127). Transcription velocity is unreliable, so
    /// analysis steps weight by duration where it matters.
    pub velocity: u8,
}

/// One detected chord window. Events are time-ordered and non-overlapping;
/// adjacent windows resolving to the same symbol are merged into one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordEvent {
    /// Chord symbol (e.g. "Cmaj7"), or a raw slash-joined pitch-class list
    /// when no named chord matches
    pub chord: String,
    /// Window start in seconds
    pub time: f64,
    /// Window width in seconds (extended across merged windows)
    pub duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Completed,
    Error,
}

/// Complete analysis output for one recording.
///
/// The analyzer is the sole producer; consumers only read. Insufficient
/// input degrades to nulled fields under `status: completed` rather than an
/// error — the presentation layer shows those as "Unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub status: AnalysisStatus,
    pub key_signature: Option<String>,
    pub key_confidence: f64,
    /// Whole-recording tempo in BPM (50-200). One estimate per recording;
    /// tempo changes within a take are out of scope.
    pub tempo: Option<u32>,
    pub time_signature: String,
    pub chords: Vec<ChordEvent>,
    /// The input notes, carried through untouched
    pub notes: Vec<NoteEvent>,
    pub melody: Vec<NoteEvent>,
    pub bass_line: Vec<NoteEvent>,
    pub harmonic_rhythm: String,
    /// Recurring 3-4 chord patterns within this one recording
    pub progressions: Vec<String>,
    /// Reserved for a future MIDI export payload — always null here
    pub midi_data: Option<serde_json::Value>,
}

/// Pitch class name for a MIDI note (e.g. 60 → "C").
pub fn midi_to_note_name(midi: u8) -> &'static str {
    PITCH_CLASSES[(midi % 12) as usize]
}

/// Full note name with octave (e.g. 60 → "C4", 21 → "A0").
pub fn midi_to_full_name(midi: u8) -> String {
    let octave = (midi / 12) as i32 - 1;
    format!("{}{}", PITCH_CLASSES[(midi % 12) as usize], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_names() {
        assert_eq!(midi_to_note_name(60), "C");
        assert_eq!(midi_to_note_name(61), "C#");
        assert_eq!(midi_to_note_name(69), "A");
        assert_eq!(midi_to_note_name(71), "B");
        assert_eq!(midi_to_note_name(72), "C");
    }

    #[test]
    fn test_full_names() {
        assert_eq!(midi_to_full_name(60), "C4");
        assert_eq!(midi_to_full_name(21), "A0");
        assert_eq!(midi_to_full_name(108), "C8");
        assert_eq!(midi_to_full_name(0), "C-1");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&AnalysisStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let json = serde_json::to_string(&AnalysisStatus::Error).unwrap();
        assert_eq!(json, "\"error\"");
    }

    #[test]
    fn test_midi_data_serializes_null() {
        let result = AnalysisResult {
            status: AnalysisStatus::Completed,
            key_signature: None,
            key_confidence: 0.0,
            tempo: None,
            time_signature: "4/4".to_string(),
            chords: vec![],
            notes: vec![],
            melody: vec![],
            bass_line: vec![],
            harmonic_rhythm: "static".to_string(),
            progressions: vec![],
            midi_data: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value["midi_data"].is_null());
        assert!(value["key_signature"].is_null());
    }
}
