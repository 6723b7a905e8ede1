//! Writing generated documents, with a diff against what is on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use docloom_site::GeneratedFile;
use serde::Serialize;

use crate::error::CliError;

/// How a generated file compares with the file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum FileStatus {
    New,
    Changed,
    Unchanged,
}

impl FileStatus {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Status of one generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct FileReport {
    /// Path relative to the output directory.
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Compare `files` with the contents of `output_dir`.
pub(crate) fn diff(output_dir: &Path, files: &[GeneratedFile]) -> Result<Vec<FileReport>, CliError> {
    files
        .iter()
        .map(|file| {
            let target = output_dir.join(&file.path);
            let status = match fs::read_to_string(&target) {
                Ok(existing) if existing == file.content => FileStatus::Unchanged,
                Ok(_) => FileStatus::Changed,
                Err(e) if e.kind() == ErrorKind::NotFound => FileStatus::New,
                // Not UTF-8, never one of ours.
                Err(e) if e.kind() == ErrorKind::InvalidData => FileStatus::Changed,
                Err(source) => return Err(CliError::Io { path: target, source }),
            };
            Ok(FileReport {
                path: file.path.clone(),
                status,
            })
        })
        .collect()
}

/// Write new and changed files. Unchanged files are left untouched so
/// their modification times stay stable for incremental Sphinx builds.
pub(crate) fn write(
    output_dir: &Path,
    files: &[GeneratedFile],
    reports: &[FileReport],
) -> Result<usize, CliError> {
    let mut written = 0;
    for (file, report) in files.iter().zip(reports) {
        if report.status == FileStatus::Unchanged {
            continue;
        }
        let target = output_dir.join(&file.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| CliError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, &file.content).map_err(|source| CliError::Io {
            path: target.clone(),
            source,
        })?;
        tracing::debug!(path = %target.display(), status = report.status.label(), "Wrote file");
        written += 1;
    }
    Ok(written)
}

/// Count reports with `status`.
pub(crate) fn count(reports: &[FileReport], status: FileStatus) -> usize {
    reports.iter().filter(|r| r.status == status).count()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn generated(path: &str, content: &str) -> GeneratedFile {
        GeneratedFile {
            path: PathBuf::from(path),
            content: content.to_owned(),
        }
    }

    #[test]
    fn test_diff_reports_new_changed_unchanged() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("generated")).unwrap();
        fs::write(temp.path().join("index.rst"), "same\n").unwrap();
        fs::write(temp.path().join("generated/a.rst"), "old\n").unwrap();

        let files = vec![
            generated("index.rst", "same\n"),
            generated("generated/a.rst", "new\n"),
            generated("generated/a/b.rst", "b\n"),
        ];
        let reports = diff(temp.path(), &files).unwrap();

        let statuses: Vec<FileStatus> = reports.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![FileStatus::Unchanged, FileStatus::Changed, FileStatus::New]
        );
        assert_eq!(count(&reports, FileStatus::New), 1);
    }

    #[test]
    fn test_diff_does_not_write() {
        let temp = tempfile::tempdir().unwrap();
        let files = vec![generated("generated/a.rst", "a\n")];

        diff(temp.path(), &files).unwrap();

        assert!(!temp.path().join("generated").exists());
    }

    #[test]
    fn test_write_skips_unchanged() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("index.rst"), "same\n").unwrap();

        let files = vec![
            generated("index.rst", "same\n"),
            generated("generated/x/y.rst", "deep\n"),
        ];
        let reports = diff(temp.path(), &files).unwrap();
        let written = write(temp.path(), &files, &reports).unwrap();

        assert_eq!(written, 1);
        assert_eq!(
            fs::read_to_string(temp.path().join("generated/x/y.rst")).unwrap(),
            "deep\n"
        );

        let again = diff(temp.path(), &files).unwrap();
        assert_eq!(count(&again, FileStatus::Unchanged), 2);
    }

    #[test]
    fn test_report_json() {
        let report = FileReport {
            path: PathBuf::from("index.rst"),
            status: FileStatus::Changed,
        };
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"path":"index.rst","status":"changed"}"#
        );
    }
}
