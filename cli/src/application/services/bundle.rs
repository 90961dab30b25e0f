//! Application service: write the deployment bundle into a directory.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::application::ports::{LocalFs, ProgressReporter};

/// Files written and left alone by [`write_bundle`].
#[derive(Debug, Default, Serialize)]
pub struct BundleReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Write each `(relative path, contents)` pair below `dir`.
///
/// Existing files are kept unless `force` is set.
///
/// # Errors
///
/// Returns an error if a directory or file cannot be written.
pub fn write_bundle<'a>(
    fs: &impl LocalFs,
    dir: &Path,
    files: impl IntoIterator<Item = (&'a Path, &'a [u8])>,
    force: bool,
    reporter: &impl ProgressReporter,
) -> Result<BundleReport> {
    let mut report = BundleReport::default();
    for (rel, contents) in files {
        let target = dir.join(rel);
        if fs.exists(&target) && !force {
            reporter.warn(&format!("{} exists, skipped (use --force to overwrite)", rel.display()));
            report.skipped.push(target);
            continue;
        }
        if let Some(parent) = target.parent() {
            fs.create_dir_all(parent)?;
        }
        fs.write(&target, contents)?;
        reporter.success(&format!("wrote {}", rel.display()));
        report.written.push(target);
    }
    Ok(report)
}
