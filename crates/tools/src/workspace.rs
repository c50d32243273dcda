//! Workspace inspection — file-tree listing and the cached snapshot.
//!
//! Every THINKING step splices the current project file tree into the
//! system prompt so the model is never blind to what exists on disk. The
//! listing is cached and only rescanned after a mutating tool call marks
//! it dirty.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Directories skipped during the walk so dependency trees and VCS
/// internals don't blow up the context window.
const IGNORE_DIRS: &[&str] = &[
    ".venv",
    "venv",
    "env",
    "__pycache__",
    ".git",
    "node_modules",
    ".idea",
    ".vscode",
    "target",
];

/// Resolve a model-supplied relative path inside the workspace root.
///
/// Rejects anything that lexically escapes the root (`..` traversal,
/// absolute paths). Returns the joined absolute path; existence is the
/// caller's concern.
pub fn resolve_in_workspace(root: &Path, relative: &str) -> Result<PathBuf, String> {
    let candidate = Path::new(relative);
    if candidate.is_absolute() {
        return Err(format!("Error: \"{relative}\" is not in the working directory."));
    }

    let mut resolved = root.to_path_buf();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => {
                return Err(format!(
                    "Error: \"{relative}\" is not in the working directory."
                ))
            }
        }
    }

    if !resolved.starts_with(root) {
        return Err(format!(
            "Error: \"{relative}\" is not in the working directory."
        ));
    }
    Ok(resolved)
}

/// Produce the recursive file listing for a directory inside the root.
///
/// Paths are reported relative to the workspace root — exactly the
/// strings the model must feed back into the other tools.
pub fn list_files(root: &Path, directory: &str) -> String {
    let abs_dir = match resolve_in_workspace(root, directory) {
        Ok(p) => p,
        Err(e) => return e,
    };

    if !abs_dir.exists() {
        return format!("Error: The directory '{directory}' does not exist.");
    }
    if !abs_dir.is_dir() {
        return format!("Error: '{directory}' is a file, not a directory.");
    }

    let mut lines: Vec<String> = Vec::new();
    walk(root, &abs_dir, &mut lines);

    if lines.is_empty() {
        return format!("The directory '{directory}' is completely empty.");
    }

    lines.sort();
    let mut out = String::from("Project Structure (Relative to Workspace Root):\n\n");
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn walk(root: &Path, dir: &Path, lines: &mut Vec<String>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        if path.is_dir() {
            if !IGNORE_DIRS.contains(&name.as_str()) {
                walk(root, &path, lines);
            }
        } else if let Ok(rel) = path.strip_prefix(root) {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            lines.push(format!("- {} (Size: {} bytes)", rel.display(), size));
        }
    }
}

/// A cached workspace listing with a dirty flag.
///
/// Shared between the dispatcher (which marks it dirty after successful
/// mutations) and the ReAct loop (which refreshes before each THINKING
/// step).
pub struct WorkspaceSnapshot {
    root: PathBuf,
    cache: Mutex<String>,
    dirty: AtomicBool,
}

impl WorkspaceSnapshot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(String::new()),
            dirty: AtomicBool::new(true),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mark the cached listing stale; the next `listing()` rescans.
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Current listing, rescanning the filesystem only when dirty.
    pub fn listing(&self) -> String {
        if self.dirty.swap(false, Ordering::SeqCst) {
            debug!(root = %self.root.display(), "Rescanning workspace file tree");
            let fresh = list_files(&self.root, ".");
            *self.cache.lock().unwrap() = fresh;
        }
        self.cache.lock().unwrap().clone()
    }
}
