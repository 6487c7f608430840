use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::ScanError;
use crate::scan::{Matcher, ReferenceItem};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanWorkspaceParams {
    pub root: String,
    /// Overrides the server's configured extensions.
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct FileReferences {
    pub path: String,
    pub references: Vec<ReferenceItem>,
}

#[derive(Debug, Serialize)]
pub struct FileError {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct WorkspaceReport {
    pub files: Vec<FileReferences>,
    pub errors: Vec<FileError>,
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
}

/// Source files under `root`, honoring .gitignore and hidden-file rules.
pub fn collect_source_files(
    root: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in ignore::WalkBuilder::new(root).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_some_and(|t| t.is_file()) && has_extension(entry.path(), extensions)
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn scan_file(path: &Path, matcher: &Matcher) -> Result<Vec<ReferenceItem>, ScanError> {
    let bytes = std::fs::read(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(matcher
        .locate_bytes(&bytes)
        .into_iter()
        .map(|r| matcher.to_item(r))
        .collect())
}

/// Locate references in every matching file under `root`. Files without
/// references are left out of the report.
pub fn scan_workspace(
    root: &Path,
    extensions: &[String],
    matcher: &Matcher,
) -> Result<WorkspaceReport, ScanError> {
    let files = collect_source_files(root, extensions)?;
    debug!("scanning {} files under {:?}", files.len(), root);

    let results: Vec<(PathBuf, Result<Vec<ReferenceItem>, ScanError>)> = files
        .into_par_iter()
        .map(|path| {
            let result = scan_file(&path, matcher);
            (path, result)
        })
        .collect();

    let mut report = WorkspaceReport::default();
    for (path, result) in results {
        let path = path.to_string_lossy().to_string();
        match result {
            Ok(references) if references.is_empty() => {}
            Ok(references) => report.files.push(FileReferences { path, references }),
            Err(e) => report.errors.push(FileError {
                path,
                error: e.to_string(),
            }),
        }
    }

    info!(
        "workspace scan found references in {} files ({} errors)",
        report.files.len(),
        report.errors.len()
    );
    Ok(report)
}

pub fn scan(
    params: ScanWorkspaceParams,
    default_extensions: &[String],
    matcher: &Matcher,
) -> Result<Value> {
    let extensions = params.extensions.as_deref().unwrap_or(default_extensions);
    let report = scan_workspace(Path::new(&params.root), extensions, matcher)?;
    Ok(serde_json::to_value(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension() {
        let exts = vec!["dart".to_string()];
        assert!(has_extension(Path::new("lib/main.dart"), &exts));
        assert!(!has_extension(Path::new("lib/main.ts"), &exts));
        assert!(!has_extension(Path::new("Makefile"), &exts));
    }

    #[test]
    fn test_missing_root() {
        let err = collect_source_files(Path::new("/definitely/not/here"), &[]).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }
}
