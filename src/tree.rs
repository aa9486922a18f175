//! Listing of editable files under the settings root.

use crate::dialect::Dialect;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("failed to list {path}: {source}")]
    Walk {
        path: String,
        source: walkdir::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    /// Root-relative, forward slashes.
    pub path: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

/// Every file below `nodes`, depth first.
pub fn flatten_files(nodes: &[TreeNode]) -> Vec<&TreeNode> {
    let mut out = Vec::new();
    collect_files(nodes, &mut out);
    out
}

fn collect_files<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a TreeNode>) {
    for node in nodes {
        match node.kind {
            NodeKind::File => out.push(node),
            NodeKind::Folder => collect_files(&node.children, out),
        }
    }
}

/// List `root` recursively.
///
/// Folders are always listed; files only when their extension maps to a
/// [`Dialect`]. Entries are sorted by name. An unreadable subfolder is listed
/// without children; only an unreadable root is an error.
pub fn build_tree(root: impl AsRef<Path>) -> Result<Vec<TreeNode>, TreeError> {
    let root = root.as_ref();
    list_dir(root, root, true)
}

fn list_dir(root: &Path, dir: &Path, is_root: bool) -> Result<Vec<TreeNode>, TreeError> {
    let mut nodes = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if is_root && source.depth() == 0 => {
                return Err(TreeError::Walk {
                    path: dir.display().to_string(),
                    source,
                });
            }
            Err(err) => {
                tracing::debug!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        let path = relative_path(root, entry.path());

        if entry.file_type().is_dir() {
            let children = list_dir(root, entry.path(), false).unwrap_or_default();
            nodes.push(TreeNode {
                name,
                path,
                kind: NodeKind::Folder,
                children,
            });
        } else if Dialect::from_path(entry.path()).is_some() {
            nodes.push(TreeNode {
                name,
                path,
                kind: NodeKind::File,
                children: Vec::new(),
            });
        }
    }

    Ok(nodes)
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_tree_lists_supported_files_and_all_folders() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Core/Nested")).unwrap();
        fs::create_dir_all(root.join("Empty")).unwrap();
        fs::write(root.join("Core/Server.cfg"), "").unwrap();
        fs::write(root.join("Core/Nested/Loot.xml"), "").unwrap();
        fs::write(root.join("Core/readme.txt"), "").unwrap();
        fs::write(root.join("Main.CFG"), "").unwrap();

        let tree = build_tree(root).unwrap();
        let names: Vec<_> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Core", "Empty", "Main.CFG"]);

        let core = &tree[0];
        assert_eq!(core.kind, NodeKind::Folder);
        let core_children: Vec<_> = core.children.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(core_children, vec!["Core/Nested", "Core/Server.cfg"]);

        let files: Vec<_> = flatten_files(&tree).iter().map(|n| n.path.clone()).collect();
        assert_eq!(files, vec!["Core/Nested/Loot.xml", "Core/Server.cfg", "Main.CFG"]);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(build_tree(temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_serialized_tree_omits_empty_children() {
        let node = TreeNode {
            name: "a.cfg".to_string(),
            path: "a.cfg".to_string(),
            kind: NodeKind::File,
            children: Vec::new(),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "file");
        assert!(json.get("children").is_none());
    }
}
