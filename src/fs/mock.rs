// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
}

#[derive(Debug, Default)]
struct MockState {
    entries: BTreeMap<PathBuf, MockEntry>,
    /// Paths whose removal fails, simulating locked or protected entries.
    locked: BTreeSet<PathBuf>,
}

/// In-memory filesystem for tests.
///
/// Parent directories are created implicitly. Clones share state, so a test
/// can keep one handle while the code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        if let Some(parent) = path.parent() {
            ensure_dirs(&mut state.entries, parent);
        }
        state.entries.insert(path, MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        ensure_dirs(&mut state.entries, path.as_ref());
    }

    /// Make every removal of `path` (or of a directory containing it) fail.
    pub fn lock(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.locked.insert(path.as_ref().to_path_buf());
    }

    /// Snapshot of all paths currently present.
    pub fn paths(&self) -> Vec<PathBuf> {
        let state = self.state.lock().unwrap();
        state.entries.keys().cloned().collect()
    }
}

fn ensure_dirs(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        entries
            .entry(ancestor.to_path_buf())
            .or_insert(MockEntry::Dir);
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::File(content)) => Ok(String::from_utf8(content.clone())?),
            Some(MockEntry::Dir) => Err(anyhow!("is a directory: {:?}", path)),
            None => Err(anyhow!("file not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(MockEntry::File(_)) = state.entries.get(path) {
            return Err(anyhow!("a file already exists at {:?}", path));
        }
        ensure_dirs(&mut state.entries, path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.state.lock().unwrap().entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(
            self.state.lock().unwrap().entries.get(path),
            Some(MockEntry::File(_))
        )
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(
            self.state.lock().unwrap().entries.get(path),
            Some(MockEntry::Dir)
        )
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::Dir) => Ok(state
                .entries
                .keys()
                .filter(|p| p.parent() == Some(path))
                .cloned()
                .collect()),
            Some(MockEntry::File(_)) => Err(anyhow!("not a directory: {:?}", path)),
            None => Err(anyhow!("dir not found: {:?}", path)),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.locked.contains(path) {
            return Err(anyhow!("permission denied: {:?}", path));
        }
        match state.entries.get(path) {
            Some(MockEntry::File(_)) => {
                state.entries.remove(path);
                Ok(())
            }
            Some(MockEntry::Dir) => Err(anyhow!("is a directory: {:?}", path)),
            None => Err(anyhow!("file not found: {:?}", path)),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !matches!(state.entries.get(path), Some(MockEntry::Dir)) {
            return Err(anyhow!("dir not found: {:?}", path));
        }
        if let Some(locked) = state.locked.iter().find(|l| l.starts_with(path)) {
            return Err(anyhow!("permission denied: {:?}", locked));
        }
        state.entries.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}
