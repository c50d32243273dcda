//! Directory listing tool — maps out the project structure.

use crate::workspace::list_files;
use async_trait::async_trait;
use codecrew_core::error::ToolError;
use codecrew_core::tool::{Tool, ToolResult};
use std::path::PathBuf;

pub struct FilesInfoTool {
    root: PathBuf,
}

impl FilesInfoTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Tool for FilesInfoTool {
    fn name(&self) -> &str {
        "get_files_info"
    }

    fn description(&self) -> &str {
        "Map out the directory structure and discover files. Hidden/vendor folders are skipped."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "Directory to list, relative to the workspace root (default '.')"
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let directory = arguments["directory"].as_str().unwrap_or(".");
        let listing = list_files(&self.root, directory);
        let success = !listing.starts_with("Error:");
        Ok(ToolResult {
            success,
            output: listing,
        })
    }
}
