//! In-memory snapshot of a remote directory tree.

use serde_yaml::{Mapping, Value};

/// Sentinel rendered for files in the lightweight structure view.
pub const FILE_SENTINEL: &str = "file";

/// Node in a remote directory snapshot.
///
/// `name` is always the final segment of `path`; the constructors derive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    path: String,
    name: String,
    kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File(FileMeta),
    Directory { children: Vec<FileNode> },
}

/// File payload. `content` is only populated by source-mode walks and stays
/// `None` for binary blobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMeta {
    pub size: u64,
    pub sha: String,
    pub content: Option<String>,
}

impl FileNode {
    pub fn file(path: &str, meta: FileMeta) -> Self {
        Self { path: path.to_string(), name: final_segment(path), kind: NodeKind::File(meta) }
    }

    pub fn directory(path: &str, children: Vec<FileNode>) -> Self {
        Self {
            path: path.to_string(),
            name: final_segment(path),
            kind: NodeKind::Directory { children },
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

fn extension_of(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() { None } else { Some(ext) }
}

/// Whether the extension of `name` is one of `extensions` (case-insensitive).
pub fn has_source_extension(name: &str, extensions: &[String]) -> bool {
    extension_of(name).is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

fn final_segment(path: &str) -> String {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default().to_string()
}

/// Render nodes as `name -> "file" | nested mapping`.
pub fn structure_value(nodes: &[FileNode]) -> Value {
    let mut map = Mapping::new();
    for node in nodes {
        let value = match node.kind() {
            NodeKind::Directory { children } => structure_value(children),
            NodeKind::File(_) => Value::from(FILE_SENTINEL),
        };
        map.insert(Value::from(node.name()), value);
    }
    Value::Mapping(map)
}

/// Render nodes as a full tree with type, size, sha, and content for files.
pub fn tree_value(nodes: &[FileNode]) -> Value {
    let mut map = Mapping::new();
    for node in nodes {
        let mut entry = Mapping::new();
        match node.kind() {
            NodeKind::Directory { children } => {
                entry.insert("type".into(), "dir".into());
                entry.insert("children".into(), tree_value(children));
            }
            NodeKind::File(meta) => {
                entry.insert("type".into(), FILE_SENTINEL.into());
                append_file_fields(&mut entry, meta);
            }
        }
        map.insert(Value::from(node.name()), Value::Mapping(entry));
    }
    Value::Mapping(map)
}

/// Render every file whose extension is listed as a flat `path -> {content, size, sha}` map.
pub fn source_files_value(nodes: &[FileNode], extensions: &[String]) -> Value {
    let mut map = Mapping::new();
    collect_source_files(nodes, extensions, &mut map);
    Value::Mapping(map)
}

fn collect_source_files(nodes: &[FileNode], extensions: &[String], out: &mut Mapping) {
    for node in nodes {
        match node.kind() {
            NodeKind::Directory { children } => collect_source_files(children, extensions, out),
            NodeKind::File(meta) => {
                if has_source_extension(node.name(), extensions) {
                    let mut entry = Mapping::new();
                    append_file_fields(&mut entry, meta);
                    out.insert(Value::from(node.path()), Value::Mapping(entry));
                }
            }
        }
    }
}

fn append_file_fields(entry: &mut Mapping, meta: &FileMeta) {
    let content = meta.content.clone().map(Value::from).unwrap_or(Value::Null);
    entry.insert("content".into(), content);
    entry.insert("size".into(), Value::from(meta.size));
    entry.insert("sha".into(), Value::from(meta.sha.as_str()));
}
