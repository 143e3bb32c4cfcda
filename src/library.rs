//! File glue between the pure analysis core and the on-disk library:
//! note-file input and analysis-record discovery. The core never touches
//! the filesystem — everything here is CLI-side plumbing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use walkdir::WalkDir;

use crate::notes::{AnalysisResult, ChordEvent, NoteEvent};

/// Analysis records are stored next to each other as `<id>.analysis.json`.
pub const RECORD_SUFFIX: &str = ".analysis.json";

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One stored recording: identity plus its analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingRecord {
    pub id: String,
    pub title: String,
    pub analysis: AnalysisResult,
}

/// The slice of a record the cross-recording miners need.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    pub id: String,
    pub title: String,
    pub key_signature: Option<String>,
    pub tempo: Option<u32>,
    pub chords: Vec<ChordEvent>,
}

impl From<&RecordingRecord> for RecordingSummary {
    fn from(record: &RecordingRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            key_signature: record.analysis.key_signature.clone(),
            tempo: record.analysis.tempo,
            chords: record.analysis.chords.clone(),
        }
    }
}

/// A note file is either a bare JSON array of notes or an object carrying
/// an optional title alongside them — both shapes come out of the
/// transcription step.
#[derive(Deserialize)]
#[serde(untagged)]
enum NotesFile {
    Bare(Vec<NoteEvent>),
    Titled {
        title: Option<String>,
        notes: Vec<NoteEvent>,
    },
}

/// Recording id derived from the note file name (stem without extension).
pub fn recording_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("recording")
        .to_string()
}

/// Where a recording's analysis record lives inside the library.
pub fn record_path(library_dir: &Path, id: &str) -> PathBuf {
    library_dir.join(format!("{id}{RECORD_SUFFIX}"))
}

/// Read a note file, tolerating both input shapes.
pub fn read_notes(path: &Path) -> Result<(Option<String>, Vec<NoteEvent>), LibraryError> {
    let contents = std::fs::read_to_string(path)?;
    let parsed: NotesFile =
        serde_json::from_str(&contents).map_err(|source| LibraryError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    Ok(match parsed {
        NotesFile::Bare(notes) => (None, notes),
        NotesFile::Titled { title, notes } => (title, notes),
    })
}

/// Write one analysis record into the library.
pub fn write_record(library_dir: &Path, record: &RecordingRecord) -> Result<(), LibraryError> {
    let path = record_path(library_dir, &record.id);
    let json = serde_json::to_string_pretty(record).map_err(|source| LibraryError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load every analysis record under the library directory.
///
/// Paths are sorted before parsing so the load order — and with it the
/// encounter order the mining functions use for tie-breaking — is stable
/// across platforms. Unreadable records are logged and skipped rather
/// than failing the whole load.
pub fn load_library(library_dir: &Path) -> Result<Vec<RecordingRecord>, LibraryError> {
    let mut record_files: Vec<PathBuf> = WalkDir::new(library_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.to_string_lossy().ends_with(RECORD_SUFFIX))
        .collect();
    record_files.sort();

    let mut records = Vec::with_capacity(record_files.len());
    for path in record_files {
        let contents = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<RecordingRecord>(&contents) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping unreadable record {}: {}", path.display(), e),
        }
    }
    Ok(records)
}

/// Collect note files (plain `.json`, not analysis records) under the
/// given paths. Files are sorted for a stable batch order.
pub fn collect_note_files(paths: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    for path in paths {
        let root = Path::new(path);
        if root.is_file() {
            files.push(root.to_path_buf());
            continue;
        }
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.ends_with(".json") && !name.ends_with(RECORD_SUFFIX) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files
}
