//! Filesystem identity: uniquing files and directories by `(device, inode)`.
//!
//! [`FileManager`] is the layer between path strings and the canonical
//! identity the rest of the front-end reasons about. A `stat` failure, or a
//! path that names the wrong kind of entry (a directory where a file was
//! requested, or vice versa), is reported as "not found" — a `None` result,
//! not an error. Only a `stat` failure that isn't ordinary non-existence
//! (e.g. permission denied) is surfaced as [`FileManagerError`].

use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

use crate::error::{FileManagerError, FileManagerResult};
use crate::FxHashMap;

crate::define_idx!(FileUid);

/// Canonical identity of one file, uniqued by `(device, inode)`.
///
/// Two paths that `stat` to the same device/inode share one `FileEntry`;
/// the shared instance outlives any buffer ingested from it.
#[derive(Debug)]
pub struct FileEntry {
    /// The path string first used to locate this entry. Not necessarily
    /// canonical — see `DESIGN.md`'s "symlinked directory naming" note,
    /// which applies identically here (first-seen path wins).
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub parent: Option<Rc<DirectoryEntry>>,
    /// Dense id assigned in allocation order, stable for the `FileManager`'s
    /// lifetime.
    pub uid: FileUid,
    device: u64,
    inode: u64,
}

impl FileEntry {
    #[inline]
    pub fn device_inode(&self) -> (u64, u64) {
        (self.device, self.inode)
    }
}

/// Canonical identity of one directory, uniqued the same way as `FileEntry`.
#[derive(Debug)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    device: u64,
    inode: u64,
}

impl DirectoryEntry {
    #[inline]
    pub fn device_inode(&self) -> (u64, u64) {
        (self.device, self.inode)
    }
}

/// Lookup/cache-miss counters, reported by [`FileManager::print_stats`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FileManagerStats {
    pub dir_lookups: u64,
    pub dir_cache_misses: u64,
    pub file_lookups: u64,
    pub file_cache_misses: u64,
}

/// Owns the `(device, inode)` → entry tables and the negative-result caches.
///
/// Single-threaded per translation unit, matching spec.md §5's shared-state
/// model; interior mutability (`RefCell`) stands in for what a concurrent
/// implementation would guard with a lock.
#[derive(Default)]
pub struct FileManager {
    unique_files: RefCell<FxHashMap<(u64, u64), Rc<FileEntry>>>,
    unique_dirs: RefCell<FxHashMap<(u64, u64), Rc<DirectoryEntry>>>,
    /// Path → resolved entry, `None` recording a cached negative result.
    file_cache: RefCell<FxHashMap<PathBuf, Option<Rc<FileEntry>>>>,
    dir_cache: RefCell<FxHashMap<PathBuf, Option<Rc<DirectoryEntry>>>>,
    next_uid: Cell<u32>,
    stats: RefCell<FileManagerStats>,
}

impl FileManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `path` to its canonical directory entry, or `None` if it
    /// does not exist (or is not a directory). Negative results are
    /// cached under `path`.
    pub fn get_directory(&self, path: &Path) -> FileManagerResult<Option<Rc<DirectoryEntry>>> {
        self.stats.borrow_mut().dir_lookups += 1;
        if let Some(cached) = self.dir_cache.borrow().get(path) {
            return Ok(cached.clone());
        }
        self.stats.borrow_mut().dir_cache_misses += 1;

        let resolved = match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => {
                let (device, inode) = dev_inode(&meta);
                let entry = self
                    .unique_dirs
                    .borrow_mut()
                    .entry((device, inode))
                    .or_insert_with(|| {
                        Rc::new(DirectoryEntry { path: path.to_path_buf(), device, inode })
                    })
                    .clone();
                Some(entry)
            }
            Ok(_) => None, // exists but is not a directory
            Err(e) if is_not_found(&e) => None,
            Err(e) => {
                return Err(FileManagerError::Stat { path: path.to_path_buf(), source: e });
            }
        };

        self.dir_cache.borrow_mut().insert(path.to_path_buf(), resolved.clone());
        Ok(resolved)
    }

    /// Resolves `path` to its canonical file entry. A path ending in `/`
    /// never names a file and resolves to `None` without touching the
    /// filesystem. A `None` parent directory implies a `None` file.
    pub fn get_file(&self, path: &Path) -> FileManagerResult<Option<Rc<FileEntry>>> {
        self.stats.borrow_mut().file_lookups += 1;

        if path.as_os_str().to_string_lossy().ends_with('/') {
            return Ok(None);
        }
        if let Some(cached) = self.file_cache.borrow().get(path) {
            return Ok(cached.clone());
        }
        self.stats.borrow_mut().file_cache_misses += 1;

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => self.get_directory(p)?,
            _ => None,
        };
        if path.parent().map(|p| !p.as_os_str().is_empty()).unwrap_or(false) && parent.is_none() {
            self.file_cache.borrow_mut().insert(path.to_path_buf(), None);
            return Ok(None);
        }

        let resolved = match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {
                let (device, inode) = dev_inode(&meta);
                let already_known = self.unique_files.borrow().contains_key(&(device, inode));
                let entry = self
                    .unique_files
                    .borrow_mut()
                    .entry((device, inode))
                    .or_insert_with(|| {
                        let uid = FileUid(self.next_uid.get());
                        self.next_uid.set(self.next_uid.get() + 1);
                        Rc::new(FileEntry {
                            path: path.to_path_buf(),
                            size: meta.len(),
                            modified: meta.modified().ok(),
                            parent,
                            uid,
                            device,
                            inode,
                        })
                    })
                    .clone();
                debug_assert!(already_known || entry.uid.0 + 1 == self.next_uid.get());
                Some(entry)
            }
            Ok(_) => None, // exists but is not a regular file
            Err(e) if is_not_found(&e) => None,
            Err(e) => {
                return Err(FileManagerError::Stat { path: path.to_path_buf(), source: e });
            }
        };

        self.file_cache.borrow_mut().insert(path.to_path_buf(), resolved.clone());
        Ok(resolved)
    }

    pub fn stats(&self) -> FileManagerStats {
        *self.stats.borrow()
    }

    /// Renders the lookup/cache-miss counters, mirroring
    /// `FileManager::PrintStats`.
    pub fn print_stats(&self) -> String {
        let s = self.stats();
        format!(
            "directory lookups = {}, directory cache misses = {}, \
             file lookups = {}, file cache misses = {}",
            s.dir_lookups, s.dir_cache_misses, s.file_lookups, s.file_cache_misses
        )
    }
}

fn is_not_found(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotFound
}

#[cfg(unix)]
fn dev_inode(meta: &fs::Metadata) -> (u64, u64) {
    use std::os::unix::fs::MetadataExt;
    (meta.dev(), meta.ino())
}

#[cfg(not(unix))]
fn dev_inode(meta: &fs::Metadata) -> (u64, u64) {
    // No stable (device, inode) pair off Unix; fall back to a file-length /
    // modified-time proxy. Two distinct files could alias here, which is a
    // known limitation of non-Unix targets, not of this algorithm.
    let len = meta.len();
    let modified = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    (len, modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_none_not_error() {
        let fm = FileManager::new();
        let result = fm.get_file(Path::new("/nonexistent/path/that/does/not/exist.c"));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn negative_lookup_is_cached() {
        let fm = FileManager::new();
        let path = Path::new("/nonexistent/path/again.c");
        fm.get_file(path).unwrap();
        fm.get_file(path).unwrap();
        let stats = fm.stats();
        assert_eq!(stats.file_lookups, 2);
        assert_eq!(stats.file_cache_misses, 1);
    }

    #[test]
    fn trailing_slash_never_names_a_file() {
        let fm = FileManager::new();
        let result = fm.get_file(Path::new("/tmp/")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn same_inode_two_paths_share_entry() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.c");
        fs::File::create(&real).unwrap().write_all(b"int x;").unwrap();
        let link = dir.path().join("alias.c");
        #[cfg(unix)]
        std::os::unix::fs::symlink(&real, &link).unwrap();
        #[cfg(not(unix))]
        fs::copy(&real, &link).unwrap();

        let fm = FileManager::new();
        let a = fm.get_file(&real).unwrap().unwrap();
        let b = fm.get_file(&link).unwrap().unwrap();
        #[cfg(unix)]
        {
            assert_eq!(a.uid, b.uid);
            assert!(Rc::ptr_eq(&a, &b));
        }
    }

    #[test]
    fn uid_assigned_once_per_inode() {
        let dir = tempfile::tempdir().unwrap();
        let f1 = dir.path().join("a.c");
        let f2 = dir.path().join("b.c");
        fs::write(&f1, b"a").unwrap();
        fs::write(&f2, b"b").unwrap();

        let fm = FileManager::new();
        let a = fm.get_file(&f1).unwrap().unwrap();
        let b = fm.get_file(&f2).unwrap().unwrap();
        assert_ne!(a.uid, b.uid);

        let a_again = fm.get_file(&f1).unwrap().unwrap();
        assert_eq!(a.uid, a_again.uid);
    }
}
