//! Workspace access used to locate and open series files.
//!
//! The loader only needs two capabilities: list the files matching a glob
//! and open one of them for reading. [`LocalWorkspace`] provides them over a
//! directory on disk, [`MemoryWorkspace`] over an in-memory map.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use regex::Regex;

/// A file found in a workspace, identified by its path relative to the root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileHandle {
    relative: String,
}

impl FileHandle {
    pub fn new(relative: impl Into<String>) -> Self {
        Self {
            relative: relative.into(),
        }
    }

    /// Path relative to the workspace root, `/`-separated.
    pub fn relative_path(&self) -> &str {
        &self.relative
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative)
    }
}

pub trait Workspace {
    /// All files matching `pattern`, sorted by relative path.
    fn list_matching(&self, pattern: &str) -> io::Result<Vec<FileHandle>>;

    /// Open a listed file. The reader is released when dropped.
    fn open(&self, file: &FileHandle) -> io::Result<Box<dyn Read + '_>>;

    /// Human readable name of the workspace root, for log messages.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// Glob patterns
// ---------------------------------------------------------------------------

/// A compiled glob: `*` and `?` stay within one path segment, `**` spans
/// any number of directories.
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
    max_depth: Option<usize>,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = normalize(pattern);
        let mut re = String::from(r"\A");
        let mut chars = pattern.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '*' if chars.peek() == Some(&'*') => {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        re.push_str("(?:[^/]*/)*");
                    } else {
                        re.push_str(".*");
                    }
                }
                '*' => re.push_str("[^/]*"),
                '?' => re.push_str("[^/]"),
                other => re.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        re.push_str(r"\z");

        let max_depth = if pattern.contains("**") {
            None
        } else {
            Some(pattern.split('/').count())
        };

        Ok(Self {
            regex: Regex::new(&re)?,
            pattern,
            max_depth,
        })
    }

    pub fn is_match(&self, relative: &str) -> bool {
        self.regex.is_match(relative)
    }

    /// True when the pattern names exactly one path.
    pub fn is_literal(&self) -> bool {
        !self.pattern.contains(['*', '?'])
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

fn normalize(pattern: &str) -> String {
    let pattern = pattern.trim().replace('\\', "/");
    pattern.trim_start_matches("./").to_string()
}

// ---------------------------------------------------------------------------
// LocalWorkspace – a directory on disk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LocalWorkspace {
    root: PathBuf,
}

impl LocalWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only a root that cannot be read is an error; unreadable entries
    /// below it are skipped.
    fn list_with(&self, glob: &Glob, read_dir: ReadDirFn<'_>) -> io::Result<Vec<FileHandle>> {
        let entries = read_dir(&self.root)?;
        let mut found = Vec::new();
        walk(entries, "", 1, glob, read_dir, &mut found);
        found.sort();
        Ok(found)
    }
}

type ReadDirFn<'a> = &'a dyn Fn(&Path) -> io::Result<fs::ReadDir>;

fn walk(
    entries: fs::ReadDir,
    prefix: &str,
    depth: usize,
    glob: &Glob,
    read_dir: ReadDirFn<'_>,
    found: &mut Vec<FileHandle>,
) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("skipping unreadable entry under '{prefix}': {e}");
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                log::debug!("skipping {relative}: {e}");
                continue;
            }
        };

        if file_type.is_dir() {
            if glob.max_depth.is_some_and(|max| depth + 1 > max) {
                continue;
            }
            match read_dir(&entry.path()) {
                Ok(sub) => walk(sub, &relative, depth + 1, glob, read_dir, found),
                Err(e) => log::debug!("skipping unreadable directory {relative}: {e}"),
            }
        } else if glob.is_match(&relative) {
            found.push(FileHandle::new(relative));
        }
    }
}

fn invalid_glob(e: regex::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, e)
}

impl Workspace for LocalWorkspace {
    fn list_matching(&self, pattern: &str) -> io::Result<Vec<FileHandle>> {
        let glob = Glob::new(pattern).map_err(invalid_glob)?;

        if glob.is_literal() {
            let candidate = self.root.join(glob.as_str());
            return Ok(if candidate.is_file() {
                vec![FileHandle::new(glob.as_str())]
            } else {
                Vec::new()
            });
        }

        self.list_with(&glob, &|dir: &Path| fs::read_dir(dir))
    }

    fn open(&self, file: &FileHandle) -> io::Result<Box<dyn Read + '_>> {
        let f = fs::File::open(self.root.join(file.relative_path()))?;
        Ok(Box::new(io::BufReader::new(f)))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// MemoryWorkspace – files held in memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryWorkspace {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, relative: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(relative, contents);
        self
    }

    pub fn insert(&mut self, relative: &str, contents: impl Into<Vec<u8>>) {
        self.files.insert(normalize(relative), contents.into());
    }
}

impl Workspace for MemoryWorkspace {
    fn list_matching(&self, pattern: &str) -> io::Result<Vec<FileHandle>> {
        let glob = Glob::new(pattern).map_err(invalid_glob)?;
        // BTreeMap keys are already sorted.
        Ok(self
            .files
            .keys()
            .filter(|name| glob.is_match(name))
            .map(FileHandle::new)
            .collect())
    }

    fn open(&self, file: &FileHandle) -> io::Result<Box<dyn Read + '_>> {
        let bytes = self.files.get(file.relative_path()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{file} not in workspace"))
        })?;
        Ok(Box::new(Cursor::new(bytes.as_slice())))
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
