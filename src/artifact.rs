// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Local artifact persistence for the generate and upload subcommands.
//!
//! The full pipeline keeps the artifact in memory between rendering and
//! publishing; these helpers exist for the split invocation modes where the
//! SVG is staged on disk between runs.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path
};

use crate::{
    chart::OutputArtifact,
    error::{self, Error}
};

/// Writes the rendered artifact to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`Error::ArtifactIo`](Error::ArtifactIo) when directories or the
/// file cannot be created or written.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use chrono::Utc;
/// use risp::{render_dashboard, write_artifact};
///
/// # fn main() -> Result<(), risp::Error> {
/// let artifact = render_dashboard(&[], Utc::now());
/// write_artifact(Path::new("github-stats.svg"), &artifact)?;
/// # Ok(())
/// # }
/// ```
pub fn write_artifact(path: &Path, artifact: &OutputArtifact) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| error::artifact_io_error(parent, source))?;
    }

    let file = File::create(path).map_err(|source| error::artifact_io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(artifact.content.as_bytes())
        .map_err(|source| error::artifact_io_error(path, source))?;
    writer
        .flush()
        .map_err(|source| error::artifact_io_error(path, source))
}

/// Reads a previously generated SVG artifact from `path`.
///
/// # Errors
///
/// Returns [`Error::ArtifactIo`](Error::ArtifactIo) when the file cannot be
/// read and [`Error::Validation`](Error::Validation) when it is empty.
pub fn read_artifact(path: &Path) -> Result<String, Error> {
    let content =
        fs::read_to_string(path).map_err(|source| error::artifact_io_error(path, source))?;

    if content.trim().is_empty() {
        return Err(Error::validation(format!(
            "artifact at {} is empty; run the generate step first",
            path.display()
        )));
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use super::*;
    use crate::chart::SVG_CONTENT_TYPE;

    fn sample_artifact() -> OutputArtifact {
        OutputArtifact {
            content:      "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>\n".to_owned(),
            content_type: SVG_CONTENT_TYPE,
            generated_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
        }
    }

    #[test]
    fn write_artifact_creates_parent_directories() {
        let directory = tempdir().expect("failed to create temp dir");
        let path = directory.path().join("nested").join("github-stats.svg");

        write_artifact(&path, &sample_artifact()).expect("expected write to succeed");

        let written = fs::read_to_string(&path).expect("expected artifact to be readable");
        assert_eq!(written, sample_artifact().content);
    }

    #[test]
    fn write_artifact_propagates_io_errors() {
        let directory = tempdir().expect("failed to create temp dir");
        let blocking_file = directory.path().join("blocked");
        fs::write(&blocking_file, "placeholder").expect("failed to create placeholder");
        let path = blocking_file.join("github-stats.svg");

        let error = write_artifact(&path, &sample_artifact()).expect_err("expected io failure");
        assert!(matches!(error, Error::ArtifactIo { .. }));
    }

    #[test]
    fn read_artifact_returns_contents() {
        let directory = tempdir().expect("failed to create temp dir");
        let path = directory.path().join("github-stats.svg");
        write_artifact(&path, &sample_artifact()).expect("expected write to succeed");

        let content = read_artifact(&path).expect("expected artifact to be readable");
        assert!(content.contains("<svg"));
    }

    #[test]
    fn read_artifact_rejects_empty_file() {
        let directory = tempdir().expect("failed to create temp dir");
        let path = directory.path().join("empty.svg");
        fs::write(&path, "   \n").expect("failed to write empty artifact");

        let error = read_artifact(&path).expect_err("expected validation error");
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn read_artifact_reports_missing_file() {
        let directory = tempdir().expect("failed to create temp dir");
        let path = directory.path().join("missing.svg");

        let error = read_artifact(&path).expect_err("expected io failure");
        match error {
            Error::ArtifactIo {
                path: ref stored_path,
                ..
            } => assert_eq!(stored_path, &path),
            other => panic!("unexpected error variant: {other:?}")
        }
    }
}
