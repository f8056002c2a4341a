use crate::error::TransformError;
use rand::Rng;
use rand::distr::Alphanumeric;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

const RANDOM_SUFFIX_LEN: usize = 6;

/// Turns streams and local files into archive units ready for upload.
///
/// Every unit lives in its own directory under a private temporary root, which
/// is removed when the stager is dropped.
#[derive(Debug)]
pub struct ArchiveStager {
    root: TempDir,
}

/// A directory holding the contents of one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArchive {
    pub name: String,
    pub path: PathBuf,
}

impl StagedArchive {
    /// Deletes the unit from disk.
    pub fn discard(self) -> io::Result<()> {
        fs::remove_dir_all(&self.path)
    }
}

impl ArchiveStager {
    pub fn new() -> Result<Self, TransformError> {
        let root = tempfile::Builder::new()
            .prefix("topospec-staging")
            .tempdir()
            .map_err(|e| staging_error("<root>", e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Writes a single document read from `reader` into a fresh unit.
    ///
    /// The file is named after `caller_reference`; `.json` is appended when the
    /// reference carries no extension.
    pub fn stage_stream<R: Read>(
        &self,
        mut reader: R,
        caller_reference: &str,
    ) -> Result<StagedArchive, TransformError> {
        let name = sanitize_filename(caller_reference);
        let unit = self.new_unit(&name)?;

        let file_name = if Path::new(&name).extension().is_some() {
            name.clone()
        } else {
            format!("{}.json", name)
        };
        let mut file =
            fs::File::create(unit.join(&file_name)).map_err(|e| staging_error(&name, e))?;
        io::copy(&mut reader, &mut file).map_err(|e| staging_error(&name, e))?;

        debug!(archive = %name, path = %unit.display(), "staged document");
        Ok(StagedArchive { name, path: unit })
    }

    /// Copies a local file or directory into a fresh unit.
    pub fn stage_path(&self, source: &Path) -> Result<StagedArchive, TransformError> {
        let reference = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string());
        let name = sanitize_filename(&reference);
        let unit = self.new_unit(&name)?;

        if source.is_dir() {
            copy_dir(source, &unit).map_err(|e| staging_error(&name, e))?;
        } else {
            fs::copy(source, unit.join(&name)).map_err(|e| staging_error(&name, e))?;
        }

        debug!(archive = %name, source = %source.display(), "staged local archive");
        Ok(StagedArchive { name, path: unit })
    }

    fn new_unit(&self, name: &str) -> Result<PathBuf, TransformError> {
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        let unit = self
            .root
            .path()
            .join(format!("{}_{}", stem, random_id(RANDOM_SUFFIX_LEN)));
        fs::create_dir_all(&unit).map_err(|e| staging_error(name, e))?;
        Ok(unit)
    }
}

/// Keeps alphanumerics, `-`, `_` and `.`; everything else becomes `_`.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "archive".to_string()
    } else {
        cleaned.to_string()
    }
}

fn random_id(len: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

fn copy_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

fn staging_error(archive: &str, e: io::Error) -> TransformError {
    TransformError::Staging {
        archive: archive.to_string(),
        message: e.to_string(),
    }
}
