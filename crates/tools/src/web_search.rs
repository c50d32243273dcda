//! Web search tool — stub that returns deterministic results.
//!
//! In production this would call a real search API. The stub returns
//! plausible results so the agent loops can be exercised end-to-end
//! without network access.

use async_trait::async_trait;
use codecrew_core::error::ToolError;
use codecrew_core::tool::{Tool, ToolResult};

pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for docs, APIs, or tutorials. Returns result titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 3)",
                    "default": 3
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let num_results = arguments["num_results"].as_u64().unwrap_or(3).min(5) as usize;

        let mut output = format!("Search results for '{query}':\n");
        for i in 1..=num_results {
            output.push_str(&format!(
                "{i}. Result {i} for: {query}\n   https://example.com/search?q={}&p={i}\n   \
                 Placeholder search result; wire a real search API for live content.\n",
                query.replace(' ', "+"),
            ));
        }

        Ok(ToolResult::ok(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_returns_results() {
        let tool = WebSearchTool;
        let result = tool
            .execute(serde_json::json!({"query": "tkinter grid layout"}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("tkinter grid layout"));
        assert!(result.output.contains("1."));
    }

    #[tokio::test]
    async fn respects_num_results() {
        let tool = WebSearchTool;
        let result = tool
            .execute(serde_json::json!({"query": "x", "num_results": 2}))
            .await
            .unwrap();
        assert!(result.output.contains("2."));
        assert!(!result.output.contains("3."));
    }

    #[tokio::test]
    async fn missing_query_returns_error() {
        let tool = WebSearchTool;
        assert!(tool.execute(serde_json::json!({})).await.is_err());
    }
}
