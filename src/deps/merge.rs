//! Directory tree merging.
//!
//! Moves the contents of one directory into another without replacing any
//! directory that already exists on the target side. Existing directories are
//! descended into and only their missing children are moved over.

use crate::error::CheckoutError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Counters reported by [`merge_dirs`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Entries moved as a whole (files or complete subtrees).
    pub moved: usize,
    /// Existing target directories that were merged into.
    pub merged_dirs: usize,
}

/// Merge `source` into `target`.
///
/// For each entry of `source`: when the same name is not a directory under
/// `target` the entry is moved there (replacing a file of that name),
/// otherwise the two directories are merged in turn. Entries already present
/// under `target` that have no counterpart in `source` are never touched.
///
/// Cyclic symlinks inside `source` are not supported.
pub fn merge_dirs(source: &Path, target: &Path) -> Result<MergeStats, CheckoutError> {
    let mut stats = MergeStats::default();
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(source.to_path_buf(), target.to_path_buf())];

    while let Some((src_dir, tgt_dir)) = pending.pop() {
        let entries = fs::read_dir(&src_dir).map_err(|e| CheckoutError::fs(&src_dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| CheckoutError::fs(&src_dir, e))?;
            let src_item = entry.path();
            let tgt_item = tgt_dir.join(entry.file_name());

            if tgt_item.is_dir() {
                if !src_item.is_dir() {
                    return Err(CheckoutError::fs(
                        &tgt_item,
                        io::Error::new(
                            io::ErrorKind::AlreadyExists,
                            format!("{} would replace a directory", src_item.display()),
                        ),
                    ));
                }
                log::debug!("merging into existing {}", tgt_item.display());
                stats.merged_dirs += 1;
                pending.push((src_item, tgt_item));
            } else {
                move_entry(&src_item, &tgt_item)?;
                stats.moved += 1;
            }
        }
    }

    Ok(stats)
}

fn move_entry(src: &Path, dst: &Path) -> Result<(), CheckoutError> {
    // rename(2) cannot put a directory over a file
    if src.is_dir() && dst.symlink_metadata().is_ok() {
        fs::remove_file(dst).map_err(|e| CheckoutError::fs(dst, e))?;
    }

    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!("{} is on another device, copying", src.display());
            copy_then_remove(src, dst)
        }
        Err(err) => Err(CheckoutError::fs(src, err)),
    }
}

fn copy_then_remove(src: &Path, dst: &Path) -> Result<(), CheckoutError> {
    if src.is_dir() {
        copy_dir_all(src, dst).map_err(|e| CheckoutError::fs(dst, e))?;
        fs::remove_dir_all(src).map_err(|e| CheckoutError::fs(src, e))
    } else {
        fs::copy(src, dst).map_err(|e| CheckoutError::fs(dst, e))?;
        fs::remove_file(src).map_err(|e| CheckoutError::fs(src, e))
    }
}

fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            fs::copy(entry.path(), dst.join(entry.file_name()))?;
        }
    }
    Ok(())
}
