//! Recursive snapshot of a remote directory.

use tracing::warn;

use crate::domain::file_tree::has_source_extension;
use crate::domain::{FileMeta, FileNode};
use crate::ports::{ContentEntry, EntryKind, ForgePort};

/// What the walk records for each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// Names only.
    Structure,
    /// Names plus decoded content, size, and blob SHA.
    Source,
}

/// A path whose listing or content could not be read for a reason other than absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPath {
    pub path: String,
    pub reason: String,
}

/// Result of a walk. `nodes` may be partial; `skipped` says where.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeWalk {
    pub nodes: Vec<FileNode>,
    pub skipped: Vec<SkippedPath>,
}

impl TreeWalk {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn skipped_paths(&self) -> Vec<String> {
        self.skipped.iter().map(|s| s.path.clone()).collect()
    }
}

/// Walk the subtree at `path` (`""` is the repository root).
///
/// Never fails: a missing path yields an empty walk, and any other listing
/// failure empties that subtree and is recorded in `skipped`. Recursion depth
/// equals directory depth; there is no cycle guard.
pub fn walk<F: ForgePort + ?Sized>(forge: &F, path: &str, mode: WalkMode) -> TreeWalk {
    Walker { forge, mode, extensions: None, skipped: Vec::new() }.run(path)
}

/// Source walk that only downloads files whose extension is in `extensions`.
///
/// Other files keep their listing size and SHA with no content.
pub fn walk_sources<F: ForgePort + ?Sized>(
    forge: &F,
    path: &str,
    extensions: &[String],
) -> TreeWalk {
    Walker { forge, mode: WalkMode::Source, extensions: Some(extensions), skipped: Vec::new() }
        .run(path)
}

struct Walker<'a, F: ForgePort + ?Sized> {
    forge: &'a F,
    mode: WalkMode,
    extensions: Option<&'a [String]>,
    skipped: Vec<SkippedPath>,
}

impl<F: ForgePort + ?Sized> Walker<'_, F> {
    fn run(mut self, path: &str) -> TreeWalk {
        let nodes = self.walk_dir(path);
        TreeWalk { nodes, skipped: self.skipped }
    }

    fn wants_content(&self, entry: &ContentEntry) -> bool {
        self.mode == WalkMode::Source
            && entry.kind == EntryKind::File
            && self.extensions.is_none_or(|exts| has_source_extension(&entry.name, exts))
    }

    fn walk_dir(&mut self, path: &str) -> Vec<FileNode> {
        let entries = match self.forge.list_directory(path, None) {
            Ok(entries) => entries,
            Err(err) if err.is_not_found() => return Vec::new(),
            Err(err) => {
                warn!(path, error = %err, "could not list directory; subtree left empty");
                self.skip(path, err.to_string());
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .map(|entry| match entry.kind {
                EntryKind::Dir => {
                    let children = self.walk_dir(&entry.path);
                    FileNode::directory(&entry.path, children)
                }
                _ => self.file_node(entry),
            })
            .collect()
    }

    fn file_node(&mut self, entry: ContentEntry) -> FileNode {
        let mut meta = FileMeta { size: entry.size, sha: entry.sha.clone(), content: None };
        if self.wants_content(&entry) {
            match self.forge.get_file(&entry.path, None) {
                Ok(file) => {
                    meta.size = file.size;
                    meta.sha = file.sha.clone();
                    meta.content = file.text();
                }
                Err(err) => {
                    warn!(path = %entry.path, error = %err, "could not fetch file content");
                    self.skip(&entry.path, err.to_string());
                }
            }
        }
        FileNode::file(&entry.path, meta)
    }

    fn skip(&mut self, path: &str, reason: String) {
        self.skipped.push(SkippedPath { path: path.to_string(), reason });
    }
}
