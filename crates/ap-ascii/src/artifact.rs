//! Text artifact I/O.
//!
//! The artifact is plain ASCII: one line per sampled row, each terminated by
//! `\n`, no header. Writes go through a temporary file in the destination
//! directory and are renamed into place on [`ArtifactWriter::commit`], so a
//! failed or cancelled sampling pass never leaves a truncated artifact behind.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ap_core::error::{CoreError, CoreResult};
use ap_core::frame::AsciiArt;
use tempfile::NamedTempFile;

/// Streaming writer for a text artifact.
pub struct ArtifactWriter {
    path: PathBuf,
    out: BufWriter<NamedTempFile>,
}

impl ArtifactWriter {
    /// Open a writer targeting `path`.
    ///
    /// # Errors
    /// Returns [`CoreError::ArtifactWrite`] if the destination directory is
    /// not writable.
    pub fn create(path: &Path) -> CoreResult<Self> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir).map_err(|source| CoreError::ArtifactWrite {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(tmp),
        })
    }

    /// Append one row and its terminating newline.
    ///
    /// # Errors
    /// Returns [`CoreError::ArtifactWrite`] on I/O failure.
    pub fn write_row(&mut self, row: &str) -> CoreResult<()> {
        let written = self
            .out
            .write_all(row.as_bytes())
            .and_then(|()| self.out.write_all(b"\n"));
        written.map_err(|source| self.write_error(source))
    }

    /// Flush and move the artifact into place.
    ///
    /// # Errors
    /// Returns [`CoreError::ArtifactWrite`] if flushing or renaming fails.
    pub fn commit(self) -> CoreResult<PathBuf> {
        let Self { path, out } = self;
        let tmp = out.into_inner().map_err(|e| CoreError::ArtifactWrite {
            path: path.clone(),
            source: e.into_error(),
        })?;
        tmp.persist(&path).map_err(|e| CoreError::ArtifactWrite {
            path: path.clone(),
            source: e.error,
        })?;
        log::debug!("Artefact écrit : {}", path.display());
        Ok(path)
    }

    fn write_error(&self, source: std::io::Error) -> CoreError {
        CoreError::ArtifactWrite {
            path: self.path.clone(),
            source,
        }
    }
}

/// Write a complete [`AsciiArt`] text to `path`.
///
/// # Errors
/// Returns [`CoreError::ArtifactWrite`] if the file cannot be written.
pub fn write_artifact(path: &Path, art: &AsciiArt) -> CoreResult<()> {
    let mut writer = ArtifactWriter::create(path)?;
    for line in art.text.lines() {
        writer.write_row(line)?;
    }
    writer.commit()?;
    Ok(())
}

/// Read a text artifact back.
///
/// The caller must know the output size it was sampled with; the file
/// carries no dimensions.
///
/// # Errors
/// Returns [`CoreError::ArtifactRead`] if the file is missing or not UTF-8.
pub fn read_artifact(path: &Path) -> CoreResult<String> {
    fs::read_to_string(path).map_err(|source| CoreError::ArtifactRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove an artifact, logging instead of failing.
pub fn discard_artifact(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::info!("Fichier texte supprimé : {}", path.display()),
        Err(e) => log::warn!("Suppression de {} impossible : {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use ap_core::color::Rgb;
    use ap_core::frame::ColorBuffer;

    use super::*;

    #[test]
    fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.txt");
        let art = AsciiArt {
            text: "@.\n: \n".to_string(),
            colors: ColorBuffer::from(vec![Rgb::BLACK; 4]),
            columns: 2,
            rows: 2,
        };
        write_artifact(&path, &art).unwrap();
        assert_eq!(read_artifact(&path).unwrap(), "@.\n: \n");
    }

    #[test]
    fn uncommitted_writer_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.txt");
        {
            let mut writer = ArtifactWriter::create(&path).unwrap();
            writer.write_row("@@@").unwrap();
        }
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn unwritable_destination_fails_on_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("art.txt");
        assert!(matches!(
            ArtifactWriter::create(&path),
            Err(CoreError::ArtifactWrite { .. })
        ));
    }

    #[test]
    fn missing_artifact_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_artifact(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, CoreError::ArtifactRead { .. }));
    }
}
