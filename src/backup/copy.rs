//! Recursive directory copy and clear helpers
//!
//! Symlinks are followed, so an archive always holds plain files. A dangling
//! link or a symlink loop is a copy error.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Totals for one tree copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: u64,
    pub bytes: u64,
}

/// Copy the contents of `src` into `dest`, creating `dest` if needed.
///
/// Errors carry the offending path and the OS reason text.
pub fn copy_tree(src: &Path, dest: &Path) -> io::Result<CopyStats> {
    fs::create_dir_all(dest).map_err(|e| with_path(e, dest))?;

    let mut stats = CopyStats::default();
    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let rel_path = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        let target = dest.join(rel_path);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| with_path(e, &target))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| with_path(e, parent))?;
            }
            let bytes = fs::copy(entry.path(), &target).map_err(|e| with_path(e, entry.path()))?;
            stats.files += 1;
            stats.bytes += bytes;
        }
    }

    Ok(stats)
}

/// Remove every entry inside `dir`, keeping `dir` itself
pub fn clear_dir_contents(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir).map_err(|e| with_path(e, dir))? {
        let entry = entry?;
        let path = entry.path();
        let result = if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| with_path(e, &path))?;
    }
    Ok(())
}

fn with_path(err: io::Error, path: &Path) -> io::Error {
    io::Error::new(err.kind(), format!("{}: {}", path.display(), err))
}
