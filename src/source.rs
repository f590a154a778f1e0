use crate::error::KtResult;
use glob::{MatchOptions, Pattern};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Capacity of the read buffer wrapped around each source file.
const READ_BUFFER_SIZE: usize = 64 * 1024;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A keystroke log found under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the root with `/` separators, or the file name when
    /// the root is itself a file.
    pub name: String,
    pub path: PathBuf,
}

impl SourceFile {
    pub fn open(&self) -> KtResult<BufReader<File>> {
        let file = File::open(&self.path)?;
        Ok(BufReader::with_capacity(READ_BUFFER_SIZE, file))
    }
}

/// Lazily walks `root` in file-name order, yielding regular files whose
/// relative path matches any of the glob patterns. No patterns means every
/// file. Symlinks are not followed.
pub fn iter_files<P: AsRef<Path>>(root: P, patterns: &[String]) -> KtResult<SourceFiles> {
    let patterns = patterns
        .iter()
        .map(|p| Pattern::new(p))
        .collect::<Result<Vec<_>, _>>()?;
    let root = root.as_ref().to_path_buf();
    let walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    Ok(SourceFiles {
        root,
        patterns,
        walker,
    })
}

pub struct SourceFiles {
    root: PathBuf,
    patterns: Vec<Pattern>,
    walker: walkdir::IntoIter,
}

impl SourceFiles {
    fn display_name(&self, path: &Path) -> String {
        let rel = match path.strip_prefix(&self.root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel,
            _ => path.file_name().map(Path::new).unwrap_or(path),
        };
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn matches(&self, name: &str) -> bool {
        self.patterns.is_empty()
            || self
                .patterns
                .iter()
                .any(|p| p.matches_with(name, MATCH_OPTIONS))
    }
}

impl Iterator for SourceFiles {
    type Item = KtResult<SourceFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = self.display_name(entry.path());
            if self.matches(&name) {
                return Some(Ok(SourceFile {
                    name,
                    path: entry.into_path(),
                }));
            }
        }
    }
}
