//! The mail spool: a directory of `.eml` files, with a `processed/`
//! subdirectory holding messages that were already turned into units.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const PROCESSED_DIR: &str = "processed";

/// Message files directly inside `spool_dir`, in lexical order.
pub fn scan_spool(spool_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(spool_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() && is_message_file(&entry.path()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Move `message` into the spool's `processed/` directory.
pub fn mark_processed(spool_dir: &Path, message: &Path) -> io::Result<PathBuf> {
    let processed = spool_dir.join(PROCESSED_DIR);
    fs::create_dir_all(&processed)?;

    let file_name = message.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", message.display()),
        )
    })?;
    let target = processed.join(file_name);
    fs::rename(message, &target)?;
    Ok(target)
}

fn is_message_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("eml"))
        .unwrap_or(false)
}
