//! File delete tool.

use crate::workspace::resolve_in_workspace;
use async_trait::async_trait;
use codecrew_core::error::ToolError;
use codecrew_core::tool::{Tool, ToolResult};
use std::path::PathBuf;

pub struct FileDeleteTool {
    root: PathBuf,
}

impl FileDeleteTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Tool for FileDeleteTool {
    fn name(&self) -> &str {
        "delete_file"
    }

    fn description(&self) -> &str {
        "Delete an existing file."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to delete, relative to the workspace root"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let file_path = arguments["file_path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'file_path' argument".into()))?;

        let abs = match resolve_in_workspace(&self.root, file_path) {
            Ok(p) => p,
            Err(e) => return Ok(ToolResult::err(e)),
        };

        if !abs.is_file() {
            return Ok(ToolResult::err(format!(
                "Error: '{file_path}' is not a valid file."
            )));
        }

        match tokio::fs::remove_file(&abs).await {
            Ok(()) => Ok(ToolResult::ok(format!(
                "Successfully deleted \"{file_path}\"."
            ))),
            Err(e) => Ok(ToolResult::err(format!(
                "Error deleting '{file_path}': {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delete_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gone.py"), "x").unwrap();

        let tool = FileDeleteTool::new(dir.path());
        let result = tool
            .execute(serde_json::json!({"file_path": "gone.py"}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(!dir.path().join("gone.py").exists());
    }

    #[tokio::test]
    async fn missing_file_is_error_text() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FileDeleteTool::new(dir.path());
        let result = tool
            .execute(serde_json::json!({"file_path": "nope.py"}))
            .await
            .unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn traversal_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FileDeleteTool::new(dir.path());
        let result = tool
            .execute(serde_json::json!({"file_path": "../../important.txt"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("not in the working directory"));
    }
}
