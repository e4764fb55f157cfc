//! Request-scoped working directories.
//!
//! Every run gets its own directory. Frames written by one request are never
//! visible to another, and the directory is removed when the [`WorkArea`] is
//! dropped, on success and error paths alike.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A uniquely named directory owned by a single processing run.
#[derive(Debug)]
pub struct WorkArea {
    dir: TempDir,
}

impl WorkArea {
    /// Create a fresh working area under `root`, or under the system temporary
    /// directory when `root` is `None`.
    pub fn new(root: Option<&Path>, label: &str) -> io::Result<Self> {
        let prefix = format!("vidcred-{label}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match root {
            Some(root) => {
                fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        tracing::debug!(path = %dir.path().display(), "created working area");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a file inside the working area.
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove everything inside the working area, keeping the directory.
    pub fn clear(&self) -> io::Result<()> {
        for entry in fs::read_dir(self.dir.path())? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Whether the working area currently holds no files.
    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(fs::read_dir(self.dir.path())?.next().is_none())
    }
}

impl Drop for WorkArea {
    fn drop(&mut self) {
        tracing::debug!(path = %self.dir.path().display(), "releasing working area");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_areas_are_unique_per_run() {
        let root = tempfile::tempdir().unwrap();
        let a = WorkArea::new(Some(root.path()), "frames").unwrap();
        let b = WorkArea::new(Some(root.path()), "frames").unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().starts_with(root.path()));
    }

    #[test]
    fn clear_removes_files_and_subdirectories() {
        let area = WorkArea::new(None, "clear").unwrap();
        fs::write(area.join("frame_0001.png"), b"x").unwrap();
        fs::create_dir(area.join("nested")).unwrap();
        fs::write(area.join("nested").join("f.txt"), b"y").unwrap();
        assert!(!area.is_empty().unwrap());

        area.clear().unwrap();
        assert!(area.is_empty().unwrap());
        assert!(area.path().exists());
    }

    #[test]
    fn drop_removes_directory() {
        let path = {
            let area = WorkArea::new(None, "drop").unwrap();
            fs::write(area.join("frame.png"), b"x").unwrap();
            area.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
