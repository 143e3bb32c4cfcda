pub mod chords;
pub mod key;
pub mod meter;
pub mod rhythm;
pub mod tempo;
pub mod voices;

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use crate::library::{self, LibraryError, RecordingRecord};
use crate::notes::{AnalysisResult, AnalysisStatus, NoteEvent};

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),
}

/// Analyze one recording's transcribed notes.
///
/// Pure and deterministic: identical input produces identical output, and
/// the input list is carried through untouched. Sub-analyses run in
/// dependency order — tempo feeds both chord windowing and time-signature
/// detection. Insufficient input never fails the run; it nulls the
/// affected fields and the status stays `completed`.
pub fn analyze_notes(notes: &[NoteEvent]) -> AnalysisResult {
    let tempo = tempo::estimate_tempo(notes);
    let key_estimate = key::detect_key(notes);
    let chords = chords::detect_chords(notes, tempo);
    let time_signature = meter::detect_time_signature(notes, tempo);
    let melody = voices::extract_melody(notes);
    let bass_line = voices::extract_bass_line(notes);
    let harmonic_rhythm = rhythm::harmonic_rhythm(&chords);
    let progressions = rhythm::detect_progressions(&chords);

    let (key_signature, key_confidence) = match key_estimate {
        Some(estimate) => (Some(estimate.key), estimate.confidence),
        None => (None, 0.0),
    };

    AnalysisResult {
        status: AnalysisStatus::Completed,
        key_signature,
        key_confidence,
        tempo,
        time_signature,
        chords,
        notes: notes.to_vec(),
        melody,
        bass_line,
        harmonic_rhythm,
        progressions,
        midi_data: None,
    }
}

pub struct BatchResult {
    pub analyzed: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Analyze a batch of note files in parallel and write analysis records
/// into the library directory.
///
/// The core is pure, so recordings are embarrassingly parallel — a rayon
/// pool fans the files out, and records land in the library as each file
/// finishes. Already-analyzed recordings are skipped unless `force` is
/// set; `filter` narrows the batch by a case-insensitive substring of the
/// file path.
pub fn analyze_batch(
    paths: &[PathBuf],
    library_dir: &Path,
    jobs: usize,
    force: bool,
    filter: Option<&str>,
) -> Result<BatchResult, AnalyzeError> {
    let paths: Vec<&PathBuf> = match filter {
        Some(pattern) => {
            let pattern_lower = pattern.to_lowercase();
            paths
                .iter()
                .filter(|p| p.to_string_lossy().to_lowercase().contains(&pattern_lower))
                .collect()
        }
        None => paths.iter().collect(),
    };

    if paths.is_empty() {
        log::info!("No note files to analyze");
        return Ok(BatchResult { analyzed: 0, skipped: 0, failed: 0 });
    }

    std::fs::create_dir_all(library_dir).map_err(LibraryError::from)?;

    log::info!("Analyzing {} recordings with {} workers", paths.len(), jobs);

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap()
        .progress_chars("#>-"),
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .unwrap();

    let results: Vec<Result<Option<RecordingRecord>, AnalyzeError>> = pool.install(|| {
        use rayon::prelude::*;
        paths
            .par_iter()
            .map(|path| {
                let result = analyze_file(path.as_path(), library_dir, force);
                pb.inc(1);
                result
            })
            .collect()
    });

    let mut batch = BatchResult { analyzed: 0, skipped: 0, failed: 0 };
    for result in results {
        match result {
            Ok(Some(record)) => {
                match library::write_record(library_dir, &record) {
                    Ok(()) => batch.analyzed += 1,
                    Err(e) => {
                        log::error!("Failed to store analysis for {}: {}", record.id, e);
                        batch.failed += 1;
                    }
                }
            }
            Ok(None) => batch.skipped += 1,
            Err(e) => {
                log::warn!("Analysis failed: {}", e);
                batch.failed += 1;
            }
        }
    }

    pb.finish_with_message(format!(
        "Done: {} analyzed, {} skipped, {} failed",
        batch.analyzed, batch.skipped, batch.failed
    ));

    Ok(batch)
}

/// Analyze a single note file. Returns None when the recording already has
/// a record in the library and `force` is off.
fn analyze_file(
    path: &Path,
    library_dir: &Path,
    force: bool,
) -> Result<Option<RecordingRecord>, AnalyzeError> {
    let id = library::recording_id(path);
    if !force && library::record_path(library_dir, &id).exists() {
        log::debug!("Skipping {} (already analyzed)", id);
        return Ok(None);
    }

    log::debug!("Analyzing: {}", path.display());
    let (title, notes) = library::read_notes(path)?;
    let analysis = analyze_notes(&notes);

    Ok(Some(RecordingRecord {
        title: title.unwrap_or_else(|| id.clone()),
        id,
        analysis,
    }))
}
