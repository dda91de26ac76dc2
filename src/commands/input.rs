use crate::analysis::language::{detect_language, UNKNOWN_LANGUAGE};
use crate::error::{AnalysisError, Result};
use crate::models::file_report::FileOutcome;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "__pycache__", "vendor", "dist", "build"];

/// One already-loaded file, as accepted by the project interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

/// `{files: [{name, content}]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub files: Vec<SourceFile>,
}

/// `{path, content}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRequest {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Request {
    Project(ProjectRequest),
    File(FileRequest),
}

pub fn parse_request(raw: &str) -> Result<Request> {
    Ok(serde_json::from_str(raw)?)
}

/// Files found on disk. Unreadable ones are already turned into failed
/// outcomes so they show up as excluded files in the project report.
#[derive(Debug, Default)]
pub struct LoadedSources {
    pub files: Vec<SourceFile>,
    pub unreadable: Vec<FileOutcome>,
}

impl LoadedSources {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.unreadable.is_empty()
    }
}

/// Expands glob patterns (a plain directory is walked recursively) and reads
/// every matching source file once, in first-seen order.
pub fn load_sources(patterns: &[String]) -> Result<LoadedSources> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if Path::new(pattern).is_dir() {
            walk(Path::new(pattern), &mut paths);
            continue;
        }
        let entries = glob::glob(pattern).map_err(|source| AnalysisError::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            if entry.is_dir() {
                walk(&entry, &mut paths);
            } else if entry.is_file() {
                paths.push(entry.to_string_lossy().to_string());
            }
        }
    }

    let mut seen = HashSet::new();
    let mut loaded = LoadedSources::default();
    for path in paths {
        if !seen.insert(path.clone()) {
            continue;
        }
        match fs::read_to_string(&path) {
            Ok(content) => loaded.files.push(SourceFile { name: path, content }),
            Err(e) => {
                debug!("could not read {path}: {e}");
                loaded
                    .unreadable
                    .push(FileOutcome::failure(&path, format!("unreadable: {e}")));
            }
        }
    }
    Ok(loaded)
}

fn walk(dir: &Path, files: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    entries.sort();

    for path in entries {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        if name.starts_with('.') || SKIPPED_DIRS.contains(&&*name) {
            continue;
        }
        if path.is_dir() {
            walk(&path, files);
        } else if is_source_file(&path) {
            files.push(path.to_string_lossy().to_string());
        }
    }
}

fn is_source_file(path: &Path) -> bool {
    detect_language(&path.to_string_lossy()) != UNKNOWN_LANGUAGE
}
