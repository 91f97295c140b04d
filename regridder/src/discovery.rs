use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;

/// Lists the moment files of one day under the archive convention
/// `{root}/{year}/{month}/{day}/{date}_*.{ext}`, lexicographically sorted.
/// A missing day directory is an empty list; the pipeline decides whether
/// that is fatal.
pub fn moment_files(root: &Path, date: NaiveDate, ext: &str) -> anyhow::Result<Vec<PathBuf>> {
    let day_dir = root
        .join(date.format("%Y").to_string())
        .join(date.format("%m").to_string())
        .join(date.format("%d").to_string());
    if !day_dir.is_dir() {
        return Ok(Vec::new());
    }

    let prefix = format!("{}_", date.format("%Y%m%d"));
    let mut files = Vec::new();
    for entry in std::fs::read_dir(&day_dir)
        .with_context(|| format!("listing day directory {}", day_dir.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", day_dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let named_for_day = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.starts_with(&prefix));
        let has_ext = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map_or(false, |extension| extension == ext);
        if named_for_day && has_ext {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
