use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filesystem operations needed by the exporter.
pub trait ExportFs {
    /// Creates `path` and missing ancestors; existing directories are reused.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    /// Replaces `path` with `contents` so readers never see a partial file.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl ExportFs for LocalFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        replace_via_temp(path, |file| file.write_all(contents))
    }
}

/// Fills a sibling temp file with `fill`, then renames it over `path`.
///
/// The temp file is removed whenever filling or renaming fails.
fn replace_via_temp<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp_path = parent.join(format!(".notewalk-{}.tmp", Uuid::new_v4().simple()));

    let staged = File::create(&tmp_path).and_then(|mut file| {
        fill(&mut file)?;
        file.sync_all()
    });
    if let Err(err) = staged.and_then(|()| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}

/// In-memory filesystem double with failure injection.
///
/// Directory creation fails for any path at or below a registered failing
/// directory; writes fail for registered paths and for missing parents.
#[derive(Debug, Default)]
pub struct MemoryFs {
    dirs: RefCell<BTreeSet<PathBuf>>,
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    failing_dirs: RefCell<BTreeSet<PathBuf>>,
    failing_writes: RefCell<BTreeSet<PathBuf>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `create_dir_all` fail for `path` and everything below it.
    pub fn fail_create_dir(&self, path: impl Into<PathBuf>) {
        self.failing_dirs.borrow_mut().insert(path.into());
    }

    pub fn fail_write(&self, path: impl Into<PathBuf>) {
        self.failing_writes.borrow_mut().insert(path.into());
    }

    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        self.dirs.borrow().contains(path.as_ref())
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Option<String> {
        self.read(path)
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    /// Every written file path, sorted.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }

    /// Snapshot of every file, for whole-tree comparisons.
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        self.files.borrow().clone()
    }
}

impl ExportFs for MemoryFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let blocked = self
            .failing_dirs
            .borrow()
            .iter()
            .any(|failing| path.starts_with(failing));
        if blocked {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "simulated mkdir failure",
            ));
        }

        let mut dirs = self.dirs.borrow_mut();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if self.failing_writes.borrow().contains(path) {
            return Err(io::Error::other("simulated write failure"));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !self.dirs.borrow().contains(parent) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "parent directory missing",
                ));
            }
        }
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{replace_via_temp, ExportFs, LocalFs, MemoryFs};
    use std::io::{self, Write};
    use std::path::Path;

    #[test]
    fn local_atomic_write_replaces_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        LocalFs.write_atomic(&path, b"first").unwrap();
        LocalFs.write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn failed_fill_removes_temp_file_and_keeps_old_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        LocalFs.write_atomic(&path, b"first").unwrap();

        let err = replace_via_temp(&path, |file| {
            file.write_all(b"part")?;
            Err(io::Error::other("disk full"))
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "disk full");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("occupied");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), b"x").unwrap();

        assert!(LocalFs.write_atomic(&target, b"body").is_err());
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn memory_write_requires_parent_directory() {
        let fs = MemoryFs::new();
        assert!(fs.write_atomic(Path::new("/out/A/x.md"), b"x").is_err());
        fs.create_dir_all(Path::new("/out/A")).unwrap();
        assert!(fs.is_dir("/out"));
        fs.write_atomic(Path::new("/out/A/x.md"), b"x").unwrap();
        assert_eq!(fs.read_to_string("/out/A/x.md").as_deref(), Some("x"));
    }

    #[test]
    fn memory_failing_dir_blocks_descendants() {
        let fs = MemoryFs::new();
        fs.fail_create_dir("/out/A");
        assert!(fs.create_dir_all(Path::new("/out/A/B")).is_err());
        assert!(fs.create_dir_all(Path::new("/out/C")).is_ok());
    }
}
