//! Case report search tool

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use casebot_core::{SearchConfig, Tool, VectorDocument, VectorStore};

/// Documents included in a search result
pub const SEARCH_RESULT_LIMIT: usize = 3;

/// Searches the case report store and returns the best matches as text
pub struct VectorSearchTool<V: VectorStore + ?Sized> {
    store: Arc<V>,
}

impl<V: VectorStore + ?Sized> VectorSearchTool<V> {
    pub fn new(store: Arc<V>) -> Self {
        Self { store }
    }

    /// Accepts `{"query": "..."}` or a bare string
    fn query_from(args: &Value) -> Option<&str> {
        let query = match args {
            Value::String(query) => Some(query.as_str()),
            Value::Object(map) => map.get("query").and_then(Value::as_str),
            _ => None,
        };
        query.map(str::trim).filter(|q| !q.is_empty())
    }

    fn format_results(documents: &[VectorDocument]) -> String {
        documents
            .iter()
            .take(SEARCH_RESULT_LIMIT)
            .enumerate()
            .map(|(i, doc)| {
                format!(
                    "Document {} (relevance score: {:.3}):\n{}\n",
                    i + 1,
                    doc.score.unwrap_or(0.0),
                    doc.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl<V: VectorStore + ?Sized + 'static> Tool for VectorSearchTool<V> {
    fn name(&self) -> &str {
        "vector_search"
    }

    fn description(&self) -> &str {
        "Search the healthcare vector database for relevant case reports and medical information. \
         Input should be a search query string."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search the case reports for"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> String {
        let Some(query) = Self::query_from(&args) else {
            return "Error searching vector database: a non-empty 'query' argument is required"
                .to_string();
        };

        let config = SearchConfig {
            top_k: SEARCH_RESULT_LIMIT,
            score_threshold: None,
        };
        match self.store.similarity_search_with_score(query, &config).await {
            Ok(result) if result.is_empty() => {
                "No relevant documents found in the vector database.".to_string()
            }
            Ok(result) => {
                debug!(query, hits = result.documents.len(), "vector_search");
                Self::format_results(&result.documents)
            }
            Err(e) => format!("Error searching vector database: {}", e),
        }
    }
}
