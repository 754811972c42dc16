use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// An error encountered while walking below the root directory.
#[derive(Debug)]
pub struct WalkError {
    pub path: PathBuf,
    pub source: io::Error,
}

/// A lazy, depth-first walk over the regular files below a directory.
///
/// Directories are read only when the walk reaches them. Symbolic links to
/// files are yielded; symbolic links to directories are not followed. A
/// directory that cannot be read yields one `Err` item and the walk goes on.
#[derive(Debug)]
pub struct FileWalker {
    pending_dirs: Vec<PathBuf>,
    current: Option<fs::ReadDir>,
}

impl FileWalker {
    /// Starts a walk at `root`. Fails if `root` itself cannot be read.
    pub fn new(root: &Path) -> io::Result<Self> {
        let current = fs::read_dir(root)?;
        Ok(Self {
            pending_dirs: Vec::new(),
            current: Some(current),
        })
    }

    fn classify(entry: &fs::DirEntry) -> io::Result<EntryKind> {
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            return Ok(EntryKind::Dir);
        }
        if file_type.is_file() {
            return Ok(EntryKind::File);
        }
        if file_type.is_symlink() && fs::metadata(entry.path())?.is_file() {
            return Ok(EntryKind::File);
        }
        Ok(EntryKind::Skip)
    }
}

enum EntryKind {
    Dir,
    File,
    Skip,
}

impl Iterator for FileWalker {
    type Item = Result<PathBuf, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(reader) = self.current.as_mut() else {
                let dir = self.pending_dirs.pop()?;
                match fs::read_dir(&dir) {
                    Ok(reader) => self.current = Some(reader),
                    Err(source) => return Some(Err(WalkError { path: dir, source })),
                }
                continue;
            };

            let Some(entry) = reader.next() else {
                self.current = None;
                continue;
            };

            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    return Some(Err(WalkError {
                        path: PathBuf::new(),
                        source,
                    }));
                }
            };

            let path = entry.path();
            match Self::classify(&entry) {
                Ok(EntryKind::Dir) => self.pending_dirs.push(path),
                Ok(EntryKind::File) => return Some(Ok(path)),
                Ok(EntryKind::Skip) => {}
                Err(source) => return Some(Err(WalkError { path, source })),
            }
        }
    }
}
