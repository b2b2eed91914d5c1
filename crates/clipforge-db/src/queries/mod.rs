//! Database query operations.

pub mod music_tracks;
pub mod template_jobs;
pub mod template_presets;
