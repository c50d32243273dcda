//! Directory creation tool.

use crate::workspace::resolve_in_workspace;
use async_trait::async_trait;
use codecrew_core::error::ToolError;
use codecrew_core::tool::{Tool, ToolResult};
use std::path::PathBuf;

pub struct MakeDirTool {
    root: PathBuf,
}

impl MakeDirTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Tool for MakeDirTool {
    fn name(&self) -> &str {
        "create_directory"
    }

    fn description(&self) -> &str {
        "Create a directory (including parents) BEFORE writing files into it."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "directory_path": {
                    "type": "string",
                    "description": "Path of the directory to create, relative to the workspace root"
                }
            },
            "required": ["directory_path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let directory_path = arguments["directory_path"].as_str().ok_or_else(|| {
            ToolError::InvalidArguments("Missing 'directory_path' argument".into())
        })?;

        let abs = match resolve_in_workspace(&self.root, directory_path) {
            Ok(p) => p,
            Err(e) => return Ok(ToolResult::err(e)),
        };

        if abs.is_dir() {
            return Ok(ToolResult::ok(format!(
                "Directory \"{directory_path}\" already exists."
            )));
        }

        match tokio::fs::create_dir_all(&abs).await {
            Ok(()) => Ok(ToolResult::ok(format!(
                "Successfully created directory \"{directory_path}\"."
            ))),
            Err(e) => Ok(ToolResult::err(format!(
                "Error creating directory '{directory_path}': {e}"
            ))),
        }
    }
}
