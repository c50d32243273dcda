//! File edit tool — exact search/replace on an existing file.
//!
//! The search block must match exactly once; zero matches and ambiguous
//! (multiple) matches are both rejected so the model is forced to supply
//! a uniquely identifying block.

use crate::workspace::resolve_in_workspace;
use async_trait::async_trait;
use codecrew_core::error::ToolError;
use codecrew_core::tool::{Tool, ToolResult};
use std::path::PathBuf;

pub struct FileEditTool {
    root: PathBuf,
}

impl FileEditTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Tool for FileEditTool {
    fn name(&self) -> &str {
        "edit_file"
    }

    fn description(&self) -> &str {
        "Edit an existing file by search/replace. PREFERRED for modifications — provide the exact text block to find and its replacement."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to edit, relative to the workspace root"
                },
                "search": {
                    "type": "string",
                    "description": "Exact text block to find (including whitespace and indentation)"
                },
                "replace": {
                    "type": "string",
                    "description": "Replacement text"
                }
            },
            "required": ["file_path", "search", "replace"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let file_path = arguments["file_path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'file_path' argument".into()))?;
        let search = arguments["search"].as_str().unwrap_or_default();
        let replace = arguments["replace"].as_str().unwrap_or_default();

        let abs = match resolve_in_workspace(&self.root, file_path) {
            Ok(p) => p,
            Err(e) => return Ok(ToolResult::err(e)),
        };

        if !abs.is_file() {
            return Ok(ToolResult::err(format!(
                "Error: '{file_path}' does not exist. Use `write_file` to create a new file."
            )));
        }

        let content = match tokio::fs::read_to_string(&abs).await {
            Ok(c) => c,
            Err(e) => {
                return Ok(ToolResult::err(format!(
                    "Error reading '{file_path}': {e}"
                )))
            }
        };

        let count = content.matches(search).count();
        if search.is_empty() || count == 0 {
            return Ok(ToolResult::err(format!(
                "Error: The exact search string was not found in '{file_path}'. \
                 Make sure your 'search' string perfectly matches the file text \
                 including spaces and indentation."
            )));
        }
        if count > 1 {
            return Ok(ToolResult::err(format!(
                "Error: The search string occurs {count} times in the file. \
                 Provide a more specific search string that uniquely identifies \
                 the block to replace."
            )));
        }

        let new_content = content.replacen(search, replace, 1);
        match tokio::fs::write(&abs, &new_content).await {
            Ok(()) => Ok(ToolResult::ok(format!(
                "Successfully edited \"{file_path}\". Replaced a {} char block with a {} char block.",
                search.len(),
                replace.len()
            ))),
            Err(e) => Ok(ToolResult::err(format!(
                "Error writing '{file_path}': {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn edit(
        tool: &FileEditTool,
        file_path: &str,
        search: &str,
        replace: &str,
    ) -> ToolResult {
        tool.execute(serde_json::json!({
            "file_path": file_path,
            "search": search,
            "replace": replace,
        }))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn unique_match_replaced() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("m.py"), "x = 1\ny = 2\n").unwrap();

        let tool = FileEditTool::new(dir.path());
        let result = edit(&tool, "m.py", "y = 2", "y = 3").await;
        assert!(result.success);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("m.py")).unwrap(),
            "x = 1\ny = 3\n"
        );
    }

    #[tokio::test]
    async fn zero_matches_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("m.py"), "x = 1\n").unwrap();

        let tool = FileEditTool::new(dir.path());
        let result = edit(&tool, "m.py", "not here", "z").await;
        assert!(!result.success);
        assert!(result.output.contains("was not found"));
    }

    #[tokio::test]
    async fn ambiguous_matches_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("m.py"), "pass\npass\n").unwrap();

        let tool = FileEditTool::new(dir.path());
        let result = edit(&tool, "m.py", "pass", "return").await;
        assert!(!result.success);
        assert!(result.output.contains("2 times"));
        // File untouched.
        assert_eq!(
            std::fs::read_to_string(dir.path().join("m.py")).unwrap(),
            "pass\npass\n"
        );
    }

    #[tokio::test]
    async fn missing_file_suggests_write() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FileEditTool::new(dir.path());
        let result = edit(&tool, "ghost.py", "a", "b").await;
        assert!(!result.success);
        assert!(result.output.contains("write_file"));
    }
}
