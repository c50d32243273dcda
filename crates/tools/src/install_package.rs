//! Dependency install tool — pip install of one named package.

use async_trait::async_trait;
use codecrew_core::error::ToolError;
use codecrew_core::tool::{Tool, ToolResult};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};

pub struct InstallPackageTool {
    root: PathBuf,
    timeout: Duration,
}

impl InstallPackageTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn valid_package_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '[' | ']'))
    }
}

#[async_trait]
impl Tool for InstallPackageTool {
    fn name(&self) -> &str {
        "install_package"
    }

    fn description(&self) -> &str {
        "Install a PyPI package. Use when execution fails with ModuleNotFoundError."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "package_name": {
                    "type": "string",
                    "description": "The name of the package to install"
                }
            },
            "required": ["package_name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let package_name = arguments["package_name"].as_str().ok_or_else(|| {
            ToolError::InvalidArguments("Missing 'package_name' argument".into())
        })?;

        if !Self::valid_package_name(package_name) {
            return Ok(ToolResult::err(format!(
                "Error: '{package_name}' is not a valid package name."
            )));
        }

        info!(package = package_name, "Installing package");

        let child = Command::new("python3")
            .args(["-m", "pip", "install", package_name])
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                return Ok(ToolResult::err(format!(
                    "Error installing '{package_name}': {e}"
                )))
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Ok(ToolResult::err(format!(
                    "Error installing '{package_name}': {e}"
                )))
            }
            Err(_) => {
                warn!(package = package_name, "Package install timed out, killed");
                return Ok(ToolResult::err(format!(
                    "Error: Installation of '{package_name}' timed out after {} seconds.",
                    self.timeout.as_secs()
                )));
            }
        };

        if output.status.success() {
            Ok(ToolResult::ok(format!(
                "Successfully installed '{package_name}'."
            )))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Ok(ToolResult::err(format!(
                "Error installing '{package_name}':\n{stderr}"
            )))
        }
    }
}
