//! File write tool — create or fully overwrite a file.

use crate::workspace::resolve_in_workspace;
use async_trait::async_trait;
use codecrew_core::error::ToolError;
use codecrew_core::tool::{Tool, ToolResult};
use std::path::PathBuf;

pub struct FileWriteTool {
    root: PathBuf,
}

impl FileWriteTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Create or overwrite a file. Provide the ENTIRE file content. Use ONLY for new files or full rewrites."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to write, relative to the workspace root"
                },
                "content": {
                    "type": "string",
                    "description": "The complete file content"
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let file_path = arguments["file_path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'file_path' argument".into()))?;
        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'content' argument".into()))?;

        let abs = match resolve_in_workspace(&self.root, file_path) {
            Ok(p) => p,
            Err(e) => return Ok(ToolResult::err(e)),
        };

        if let Some(parent) = abs.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return Ok(ToolResult::err(format!(
                    "Error: could not create parent directory for '{file_path}': {e}"
                )));
            }
        }

        match tokio::fs::write(&abs, content).await {
            Ok(()) => Ok(ToolResult::ok(format!(
                "Successfully wrote {} characters to \"{file_path}\".",
                content.len()
            ))),
            Err(e) => Ok(ToolResult::err(format!(
                "Error writing '{file_path}': {e}"
            ))),
        }
    }
}
