//! Script execution tool — subprocess with a hard wall-clock timeout.
//!
//! Runs a Python file, captures stdout/stderr (tail-truncated so huge
//! prints don't bloat the context), reports the exit code, and kills the
//! process if it outlives the timeout, returning a timeout-kind result
//! string instead of hanging the loop.

use crate::workspace::resolve_in_workspace;
use async_trait::async_trait;
use codecrew_core::error::ToolError;
use codecrew_core::tool::{Tool, ToolResult};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Lines of stdout/stderr kept after truncation. Tracebacks put the real
/// error at the end, so the tail is what matters.
const MAX_OUTPUT_LINES: usize = 50;

pub struct RunScriptTool {
    root: PathBuf,
    interpreter: String,
    timeout: Duration,
}

impl RunScriptTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            interpreter: "python3".into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the interpreter binary (tests use `sh`).
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    fn truncate_tail(text: &str) -> String {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() <= MAX_OUTPUT_LINES {
            return text.to_string();
        }
        let dropped = lines.len() - MAX_OUTPUT_LINES;
        format!(
            "... (truncated {dropped} previous lines) ...\n{}",
            lines[dropped..].join("\n")
        )
    }
}

#[async_trait]
impl Tool for RunScriptTool {
    fn name(&self) -> &str {
        "run_script"
    }

    fn description(&self) -> &str {
        "Execute a Python script and return its STDOUT/STDERR. NEVER run GUI apps or blocking servers."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the script to run, relative to the workspace root"
                },
                "args": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Optional command-line arguments"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let file_path = arguments["file_path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'file_path' argument".into()))?;

        let args: Vec<String> = arguments["args"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

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

        debug!(script = file_path, timeout_secs = self.timeout.as_secs(), "Running script");

        let mut child = match Command::new(&self.interpreter)
            .arg(&abs)
            .args(&args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return Ok(ToolResult::err(format!(
                    "Error executing '{file_path}': {e}"
                )))
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Ok(ToolResult::err(format!(
                    "Error executing '{file_path}': {e}"
                )))
            }
            Err(_) => {
                warn!(script = file_path, "Script exceeded timeout, killed");
                return Ok(ToolResult::err(format!(
                    "Error: Execution timed out after {} seconds. The script might contain \
                     an infinite loop or require user input.",
                    self.timeout.as_secs()
                )));
            }
        };

        let stdout = Self::truncate_tail(&String::from_utf8_lossy(&output.stdout));
        let stderr = Self::truncate_tail(&String::from_utf8_lossy(&output.stderr));

        let mut result = format!("STDOUT: {stdout}\nSTDERR: {stderr}\n");
        if stdout.is_empty() && stderr.is_empty() {
            result.push_str("No Output Produced.\n");
        }

        let success = output.status.success();
        if !success {
            result.push_str(&format!(
                "Process exited with code {}.",
                output.status.code().unwrap_or(-1)
            ));
        }

        Ok(ToolResult {
            success,
            output: result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The tests drive the tool through `sh` so they don't depend on a
    // Python toolchain; the tool itself only cares about the subprocess
    // contract.
    fn sh_tool(dir: &tempfile::TempDir) -> RunScriptTool {
        RunScriptTool::new(dir.path()).with_interpreter("sh")
    }

    #[tokio::test]
    async fn captures_stdout_and_exit_zero() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ok.py"), "echo hello\n").unwrap();

        let result = sh_tool(&dir)
            .execute(serde_json::json!({"file_path": "ok.py"}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("STDOUT: hello"));
    }

    #[tokio::test]
    async fn reports_nonzero_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fail.py"), "echo bad >&2\nexit 3\n").unwrap();

        let result = sh_tool(&dir)
            .execute(serde_json::json!({"file_path": "fail.py"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("bad"));
        assert!(result.output.contains("exited with code 3"));
    }

    #[tokio::test]
    async fn timeout_kills_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hang.py"), "sleep 30\n").unwrap();

        let result = sh_tool(&dir)
            .with_timeout(Duration::from_millis(200))
            .execute(serde_json::json!({"file_path": "hang.py"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("timed out"));
    }

    #[tokio::test]
    async fn rejects_non_python_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("script.sh"), "echo no\n").unwrap();

        let result = sh_tool(&dir)
            .execute(serde_json::json!({"file_path": "script.sh"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("not a Python file"));
    }

    #[tokio::test]
    async fn missing_file_is_error_text() {
        let dir = tempfile::tempdir().unwrap();
        let result = sh_tool(&dir)
            .execute(serde_json::json!({"file_path": "ghost.py"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("not a valid file"));
    }

    #[test]
    fn tail_truncation_keeps_the_end() {
        let many: String = (0..120).map(|i| format!("line{i}\n")).collect();
        let truncated = RunScriptTool::truncate_tail(&many);
        assert!(truncated.contains("truncated 70 previous lines"));
        assert!(truncated.contains("line119"));
        assert!(!truncated.contains("line0\n"));
    }
}
