//! File read tool — returns a file's contents with a truncation cap.

use crate::workspace::resolve_in_workspace;
use async_trait::async_trait;
use codecrew_core::error::ToolError;
use codecrew_core::tool::{Tool, ToolResult};
use std::path::PathBuf;

/// Longest content returned before truncation kicks in.
const MAX_CONTENT_CHARS: usize = 10_000;

pub struct FileReadTool {
    root: PathBuf,
}

impl FileReadTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "get_file_content"
    }

    fn description(&self) -> &str {
        "Read and return the text content of a file. ALWAYS do this before modifying an existing file."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to read, relative to the workspace root"
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

        match tokio::fs::read_to_string(&abs).await {
            Ok(content) => {
                if content.len() > MAX_CONTENT_CHARS {
                    let mut cut = MAX_CONTENT_CHARS;
                    while !content.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    Ok(ToolResult::ok(format!(
                        "{}\n[... truncated '{file_path}' at {MAX_CONTENT_CHARS} characters]",
                        &content[..cut]
                    )))
                } else {
                    Ok(ToolResult::ok(content))
                }
            }
            Err(e) => Ok(ToolResult::err(format!(
                "Error reading '{file_path}': {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.py"), "print('hi')\n").unwrap();

        let tool = FileReadTool::new(dir.path());
        let result = tool
            .execute(serde_json::json!({"file_path": "hello.py"}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "print('hi')\n");
    }

    #[tokio::test]
    async fn missing_file_is_error_text() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FileReadTool::new(dir.path());
        let result = tool
            .execute(serde_json::json!({"file_path": "nope.py"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.starts_with("Error:"));
    }

    #[tokio::test]
    async fn traversal_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FileReadTool::new(dir.path());
        let result = tool
            .execute(serde_json::json!({"file_path": "../../etc/passwd"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("not in the working directory"));
    }

    #[tokio::test]
    async fn long_file_truncated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.txt"), "a".repeat(20_000)).unwrap();

        let tool = FileReadTool::new(dir.path());
        let result = tool
            .execute(serde_json::json!({"file_path": "big.txt"}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("truncated"));
        assert!(result.output.len() < 11_000);
    }

    #[tokio::test]
    async fn missing_argument() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FileReadTool::new(dir.path());
        assert!(tool.execute(serde_json::json!({})).await.is_err());
    }
}
