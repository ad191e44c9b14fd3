//! Asset synchronizer: whole-directory copies from the staged upload tree.
//!
//! A sync is additive: source files land in the destination (overwriting
//! same-named files when asked) and destination-only files survive. The one
//! exception is a bundle marked `clean_first`, whose destination is deleted
//! before the copy so nothing from the previous brand lingers.

use crate::config::ProjectLayout;
use crate::safety::{ProjectGuard, SafetyError};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("source directory {} does not exist", .0.display())]
    SourceMissing(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsafe destination: {0}")]
    Unsafe(#[from] SafetyError),
}

impl AssetError {
    fn io(path: &Path, source: io::Error) -> Self {
        AssetError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What a sync did, file by file. Paths are destination paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub copied: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    /// Set when the destination was deleted before copying
    pub cleaned: bool,
    /// Optional source that does not exist; nothing was touched
    pub source_absent: bool,
}

/// Copy `source` into `destination` recursively.
///
/// Fails with [`AssetError::SourceMissing`] before touching the destination
/// when `source` is not a directory. Intermediate destination directories are
/// created on demand. Existing files are replaced only when `overwrite` is set;
/// otherwise they are recorded as skipped.
pub fn sync(source: &Path, destination: &Path, overwrite: bool) -> Result<SyncReport, AssetError> {
    if !source.is_dir() {
        return Err(AssetError::SourceMissing(source.to_path_buf()));
    }

    fs::create_dir_all(destination).map_err(|e| AssetError::io(destination, e))?;

    let mut report = SyncReport::default();
    for entry in WalkDir::new(source).follow_links(true).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            AssetError::Io {
                path,
                source: e.into(),
            }
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| AssetError::io(entry.path(), io::Error::other(e)))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| AssetError::io(&target, e))?;
            continue;
        }

        if target.exists() && !overwrite {
            tracing::debug!(file = %target.display(), "already exists, skipping");
            report.skipped.push(target);
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| AssetError::io(parent, e))?;
        }
        fs::copy(entry.path(), &target).map_err(|e| AssetError::io(&target, e))?;
        tracing::debug!(from = %entry.path().display(), to = %target.display(), "copied");
        report.copied.push(target);
    }

    Ok(report)
}

/// Delete a directory tree. A directory that does not exist is not an error.
pub fn clean_dir(path: &Path) -> Result<bool, AssetError> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::info!(dir = %path.display(), "removed");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AssetError::io(path, e)),
    }
}

/// A source subtree and the project directory it is copied into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBundle {
    pub name: &'static str,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub overwrite: bool,
    /// Delete the destination before copying
    pub clean_first: bool,
    /// A missing source fails the bundle; otherwise the bundle is skipped
    pub required: bool,
}

impl AssetBundle {
    /// Confirm the source, clean if nominated, then copy.
    ///
    /// The destination is checked against `guard` first, and a missing
    /// required source fails before anything is deleted.
    pub fn apply(&self, guard: &ProjectGuard) -> Result<SyncReport, AssetError> {
        let destination = guard.validate_path(&self.destination)?;
        if let Some(absent) = self.missing_source()? {
            return Ok(absent);
        }
        let cleaned = if self.clean_first {
            clean_dir(&destination)?
        } else {
            false
        };
        let mut report = sync(&self.source, &destination, self.overwrite)?;
        report.cleaned = cleaned;
        Ok(report)
    }

    /// The checks of [`AssetBundle::apply`] without copying or deleting.
    pub fn check(&self, guard: &ProjectGuard) -> Result<SyncReport, AssetError> {
        guard.validate_path(&self.destination)?;
        if let Some(absent) = self.missing_source()? {
            return Ok(absent);
        }
        Ok(SyncReport {
            cleaned: self.clean_first,
            ..SyncReport::default()
        })
    }

    fn missing_source(&self) -> Result<Option<SyncReport>, AssetError> {
        if self.source.is_dir() {
            return Ok(None);
        }
        if self.required {
            return Err(AssetError::SourceMissing(self.source.clone()));
        }
        tracing::info!(bundle = self.name, source = %self.source.display(), "optional source absent, skipping");
        Ok(Some(SyncReport {
            source_absent: true,
            ..SyncReport::default()
        }))
    }
}

/// The ordered asset plan for one restaurant's staged directory.
pub fn plan(staged: &Path, layout: &ProjectLayout, shared_ios_logo: Option<&Path>) -> Vec<AssetBundle> {
    let mut bundles = vec![
        AssetBundle {
            name: "android-res",
            source: staged.join("android/res"),
            destination: layout.android_res.clone(),
            overwrite: true,
            clean_first: false,
            required: true,
        },
        AssetBundle {
            name: "android-json",
            source: staged.join("android/json"),
            destination: layout.android_app.clone(),
            overwrite: true,
            clean_first: false,
            required: true,
        },
        AssetBundle {
            name: "ios-images",
            source: staged.join("ios"),
            destination: layout.ios_assets.clone(),
            overwrite: true,
            clean_first: true,
            required: true,
        },
    ];
    if let Some(shared) = shared_ios_logo {
        bundles.push(AssetBundle {
            name: "ios-shared-logo",
            source: shared.to_path_buf(),
            destination: layout.ios_assets.join("Logo.imageset"),
            overwrite: true,
            clean_first: false,
            required: false,
        });
    }
    bundles
}
