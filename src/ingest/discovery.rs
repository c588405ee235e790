use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::{log_debug, log_info};

const ENABLE_LOGS: bool = true;

/// Default spreadsheet extensions, compared case-insensitively.
pub const DEFAULT_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls"];

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

/// Office writes `~$name.xlsx` owner files next to open workbooks.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("~$"))
}

fn list_directory(dir: &Path, extensions: &[String]) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() && !path.is_file() {
            continue;
        }
        if has_extension(&path, extensions) && !is_lock_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Candidate workbooks across `dirs`, non-recursive. Directories keep their
/// input order; files within a directory are sorted by path. Directories that
/// cannot be listed are skipped with a warning.
pub fn discover_files(dirs: &[PathBuf], extensions: &[String]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for dir in dirs {
        match list_directory(dir, extensions) {
            Ok(files) => {
                log_info!("Found {} workbook(s) in {}", files.len(), dir.display());
                for file in &files {
                    log_debug!("  {}", file.display());
                }
                found.extend(files);
            }
            Err(err) => warn!("Skipping input directory {}: {err}", dir.display()),
        }
    }
    found
}
