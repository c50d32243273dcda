//! Syntax check tool — compile a Python file without executing it.

use crate::workspace::resolve_in_workspace;
use async_trait::async_trait;
use codecrew_core::error::ToolError;
use codecrew_core::tool::{Tool, ToolResult};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

pub struct CheckSyntaxTool {
    root: PathBuf,
}

impl CheckSyntaxTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Tool for CheckSyntaxTool {
    fn name(&self) -> &str {
        "check_syntax"
    }

    fn description(&self) -> &str {
        "Syntax-check a Python file without executing it. ALWAYS do this before running new code; the only way to test GUI applications."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to check, relative to the workspace root"
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
        if !file_path.ends_with(".py") {
            return Ok(ToolResult::err(format!(
                "Error: '{file_path}' is not a Python file."
            )));
        }

        let output = match Command::new("python3")
            .args(["-m", "py_compile"])
            .arg(&abs)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                return Ok(ToolResult::err(format!(
                    "Error compiling '{file_path}': {e}"
                )))
            }
        };

        if output.status.success() {
            Ok(ToolResult::ok(format!(
                "Syntax OK: '{file_path}' compiled without errors."
            )))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Ok(ToolResult::err(format!(
                "Syntax errors in '{file_path}':\n{stderr}"
            )))
        }
    }
}
