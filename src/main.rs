use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use etude::library::{self, RecordingRecord, RecordingSummary};
use etude::notes::midi_to_full_name;
use etude::{config, insights, progressions, similarity};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "etude", version, about = "Piano sketch analyzer")]
struct Cli {
    /// Path to the analysis library directory
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze transcribed note files and store the results in the library
    Analyze {
        /// Note files or directories containing them
        paths: Vec<String>,

        /// Number of parallel workers (0 = auto-detect from config)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,

        /// Re-analyze recordings that already have a record
        #[arg(long)]
        force: bool,

        /// Only analyze files whose path matches this pattern
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show one recording's analysis
    Show {
        /// Recording id (note file stem)
        id: String,
    },

    /// Library-wide insights: keys, chords, and harmonic tendencies
    Insights,

    /// Chord progressions shared across recordings
    Progressions {
        /// Minimum progression length in chords
        #[arg(long, default_value = "3")]
        min_length: usize,

        /// Number of results
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Recordings that resemble each other
    Similar {
        /// Number of results
        #[arg(short = 'n', long, default_value = "15")]
        limit: usize,
    },

    /// Show library statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let app_config = config::AppConfig::load();

    // Resolve library path: CLI > config > XDG default
    let library_dir = cli
        .library
        .or(app_config.library_dir.clone())
        .unwrap_or_else(config::default_library_dir);
    log::info!("Library: {}", library_dir.display());

    match cli.command {
        Commands::Analyze { paths, jobs, force, filter } => {
            if paths.is_empty() {
                anyhow::bail!("No note files to analyze. Pass files or directories.");
            }
            let files = library::collect_note_files(&paths);
            if files.is_empty() {
                println!("No note files found under the given paths.");
                return Ok(());
            }

            let workers = if jobs > 0 { jobs } else { app_config.resolve_workers() };
            let result = etude::analyzer::analyze_batch(
                &files,
                &library_dir,
                workers,
                force,
                filter.as_deref(),
            )
            .context("Analysis failed")?;
            println!(
                "Analysis complete: {} analyzed, {} skipped, {} failed",
                result.analyzed, result.skipped, result.failed
            );
        }

        Commands::Show { id } => {
            let path = library::record_path(&library_dir, &id);
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("No analysis record for \"{id}\""))?;
            let record: RecordingRecord =
                serde_json::from_str(&contents).context("Malformed analysis record")?;
            print_record(&record);
        }

        Commands::Insights => {
            let summaries = load_summaries(&library_dir)?;
            if summaries.is_empty() {
                println!("No analyzed recordings. Run `etude analyze` first.");
                return Ok(());
            }

            println!("Library insights ({} recordings)", summaries.len());
            println!();

            let keys = insights::key_distribution(&summaries);
            if !keys.is_empty() {
                println!("Keys:");
                for entry in &keys {
                    println!("  {:<12} {}", entry.key, entry.count);
                }
                println!();
            }

            let chords = insights::chord_frequency(&summaries);
            if !chords.is_empty() {
                println!("Most played chords:");
                for entry in &chords {
                    println!("  {:<8} {}", entry.chord, entry.count);
                }
                println!();
            }

            let tendencies = insights::harmonic_tendencies(&summaries);
            if !tendencies.tendencies.is_empty() {
                println!("Harmonic tendencies:");
                for t in &tendencies.tendencies {
                    println!("  - {t}");
                }
            }
            println!("Style: {}", tendencies.dominant_style);
        }

        Commands::Progressions { min_length, limit } => {
            let summaries = load_summaries(&library_dir)?;
            let mut common = progressions::find_common_progressions(&summaries, min_length);
            common.truncate(limit);

            if common.is_empty() {
                println!("No progressions shared across recordings yet.");
                return Ok(());
            }

            println!("{:<40} {:>6} {:>11}", "Progression", "Count", "Recordings");
            println!("{}", "-".repeat(60));
            for p in &common {
                let joined = p.progression.join(" → ");
                // Char-based truncation — the arrow separator is multi-byte
                let display: String = if joined.chars().count() > 40 {
                    let head: String = joined.chars().take(37).collect();
                    format!("{head}...")
                } else {
                    joined
                };
                println!("{:<40} {:>6} {:>11}", display, p.count, p.recordings.len());
            }
        }

        Commands::Similar { limit } => {
            let summaries = load_summaries(&library_dir)?;
            let mut pairs = similarity::find_similar_recordings(&summaries);
            pairs.truncate(limit);

            if pairs.is_empty() {
                println!("No similar recordings found.");
                return Ok(());
            }

            for p in &pairs {
                println!("{} ↔ {}  ({}%)", p.pair[0], p.pair[1], p.similarity);
                for reason in &p.reasons {
                    println!("    {reason}");
                }
            }
        }

        Commands::Stats => {
            let records = library::load_library(&library_dir).context("Failed to load library")?;
            let with_key = records
                .iter()
                .filter(|r| r.analysis.key_signature.is_some())
                .count();
            let with_tempo = records.iter().filter(|r| r.analysis.tempo.is_some()).count();
            let total_chords: usize = records.iter().map(|r| r.analysis.chords.len()).sum();

            println!("Library Statistics");
            println!("==================");
            println!("Recordings:       {}", records.len());
            println!("With key:         {with_key}");
            println!("With tempo:       {with_tempo}");
            println!("Chord events:     {total_chords}");
        }
    }

    Ok(())
}

fn load_summaries(library_dir: &std::path::Path) -> Result<Vec<RecordingSummary>> {
    let records = library::load_library(library_dir).context("Failed to load library")?;
    Ok(records.iter().map(RecordingSummary::from).collect())
}

/// Print one recording's analysis: headline estimates, chord timeline,
/// and recurring progressions.
fn print_record(record: &RecordingRecord) {
    let a = &record.analysis;

    println!("{} ({})", record.title, record.id);
    println!("{}", "-".repeat(40));
    println!(
        "Key:             {} (confidence {:.0}%)",
        a.key_signature.as_deref().unwrap_or("Unknown"),
        a.key_confidence * 100.0
    );
    println!(
        "Tempo:           {}",
        a.tempo.map(|t| format!("{t} BPM")).unwrap_or_else(|| "Unknown".to_string())
    );
    println!("Time signature:  {}", a.time_signature);
    println!("Harmonic rhythm: {}", a.harmonic_rhythm);
    println!("Notes:           {}", a.notes.len());

    if !a.melody.is_empty() {
        let top = a.melody.iter().map(|n| n.midi).max().unwrap_or(0);
        println!("Melody range up to {}", midi_to_full_name(top));
    }

    if !a.chords.is_empty() {
        println!();
        println!("Chords:");
        for c in &a.chords {
            println!("  {:>7.2}s  {:<10} ({:.2}s)", c.time, c.chord, c.duration);
        }
    }

    if !a.progressions.is_empty() {
        println!();
        println!("Recurring progressions:");
        for p in &a.progressions {
            println!("  {p}");
        }
    }
}
