pub mod analyzer;
pub mod config;
pub mod insights;
pub mod library;
pub mod notes;
pub mod progressions;
pub mod similarity;
pub mod spell;

/// Application name for XDG paths
pub const APP_NAME: &str = "etude";
