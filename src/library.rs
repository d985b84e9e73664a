//! Local media library scanning.
//!
//! Videos, extracted audio, and transcript files all share a filename stem,
//! which acts as the video's name throughout the pipeline. Scanning joins
//! the three directories on that stem so the CLI can show what stage each
//! video has reached.

use crate::error::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "mov", "avi"];
const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "opus", "ogg"];

/// Everything known on disk about one video, keyed by stem.
#[derive(Debug, Clone, Default)]
pub struct LibraryEntry {
    pub name: String,
    pub video_path: Option<PathBuf>,
    pub audio_path: Option<PathBuf>,
    pub transcript_path: Option<PathBuf>,
}

impl LibraryEntry {
    pub fn has_transcript(&self) -> bool {
        self.transcript_path.is_some()
    }
}

/// Scan the data directories and join files on their stem. Missing
/// directories contribute nothing. Entries come back sorted by name.
pub fn scan_library(
    videos_dir: &Path,
    audio_dir: &Path,
    transcripts_dir: &Path,
) -> Result<Vec<LibraryEntry>> {
    let mut entries: BTreeMap<String, LibraryEntry> = BTreeMap::new();

    for path in files_with_extensions(videos_dir, VIDEO_EXTENSIONS)? {
        let entry = entry_for(&mut entries, &path);
        entry.video_path = Some(path);
    }
    for path in files_with_extensions(audio_dir, AUDIO_EXTENSIONS)? {
        let entry = entry_for(&mut entries, &path);
        entry.audio_path = Some(path);
    }
    for path in files_with_extensions(transcripts_dir, &["txt"])? {
        let entry = entry_for(&mut entries, &path);
        entry.transcript_path = Some(path);
    }

    Ok(entries.into_values().collect())
}

fn entry_for<'a>(
    entries: &'a mut BTreeMap<String, LibraryEntry>,
    path: &Path,
) -> &'a mut LibraryEntry {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    entries.entry(stem.clone()).or_insert_with(|| LibraryEntry {
        name: stem,
        ..Default::default()
    })
}

fn files_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.contains(&ext.to_lowercase().as_str()));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    Ok(files)
}
