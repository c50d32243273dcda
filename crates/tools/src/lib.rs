//! Workspace tool implementations for codecrew.
//!
//! Each collaborator is a function of (workspace root, structured
//! arguments) → text result; it never raises — every failure mode is
//! encoded as a human-readable string the model can read and recover
//! from. The dispatcher routes calls, applies the approval gate to
//! mutating tools, and keeps the cached workspace listing honest.

pub mod check_syntax;
pub mod dispatcher;
pub mod file_delete;
pub mod file_edit;
pub mod file_read;
pub mod file_write;
pub mod files_info;
pub mod install_package;
pub mod make_dir;
pub mod run_script;
pub mod web_search;
pub mod workspace;

pub use dispatcher::{Dispatcher, ASK_USER, MUTATING_TOOLS};
pub use workspace::{list_files, resolve_in_workspace, WorkspaceSnapshot};

use codecrew_core::tool::ToolRegistry;
use std::path::Path;
use std::time::Duration;

/// Tools available to the top-level interactive agent.
pub fn agent_registry(root: &Path, script_timeout: Duration) -> ToolRegistry {
    let mut registry = worker_registry(root, script_timeout);
    registry.register(Box::new(file_edit::FileEditTool::new(root)));
    registry
}

/// Tools available to a delegated worker (full rewrites, no edit_file).
pub fn worker_registry(root: &Path, script_timeout: Duration) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(files_info::FilesInfoTool::new(root)));
    registry.register(Box::new(file_read::FileReadTool::new(root)));
    registry.register(Box::new(file_write::FileWriteTool::new(root)));
    registry.register(Box::new(file_delete::FileDeleteTool::new(root)));
    registry.register(Box::new(make_dir::MakeDirTool::new(root)));
    registry.register(Box::new(
        run_script::RunScriptTool::new(root).with_timeout(script_timeout),
    ));
    registry.register(Box::new(check_syntax::CheckSyntaxTool::new(root)));
    registry.register(Box::new(install_package::InstallPackageTool::new(root)));
    registry.register(Box::new(web_search::WebSearchTool));
    registry
}

/// Tools available to a subagent (same surface as the agent).
pub fn subagent_registry(root: &Path, script_timeout: Duration) -> ToolRegistry {
    agent_registry(root, script_timeout)
}

/// Tools available to the lead: read-only inspection; planning and
/// delegation are intercepted by the coordinator itself.
pub fn lead_registry(root: &Path) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(file_read::FileReadTool::new(root)));
    registry
}
