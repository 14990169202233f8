use crate::llm::TextCompletion;
use crate::query::prompt;
use serde_json::{Map, Value};
use tracing::error;

/// Asks the LLM for a 1-2 sentence answer over the flattened results.
/// Degrades to a deterministic row-count sentence on any failure; this
/// function cannot fail the request.
pub async fn summarize(
    llm: &dyn TextCompletion,
    user_query: &str,
    results: &[Map<String, Value>],
) -> String {
    let fallback = format!("Returned {} rows.", results.len());

    let results_json = match serde_json::to_string_pretty(results) {
        Ok(json) => json,
        Err(e) => {
            error!("failed to serialize results for summary: {}", e);
            return fallback;
        }
    };

    match llm.complete(&prompt::summary_prompt(user_query, &results_json)).await {
        Ok(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
        Ok(_) => fallback,
        Err(e) => {
            error!("LLM summary generation error: {}", e);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use serde_json::json;

    struct CannedLlm(Result<String, ()>);

    #[async_trait]
    impl TextCompletion for CannedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.0
                .clone()
                .map_err(|_| LlmError::ConnectionError("connection refused".to_string()))
        }
        fn name(&self) -> &str {
            "canned"
        }
    }

    fn rows(n: usize) -> Vec<Map<String, Value>> {
        (0..n)
            .map(|i| match json!({"id": i}) {
                Value::Object(map) => map,
                _ => unreachable!(),
            })
            .collect()
    }

    #[tokio::test]
    async fn successful_completion_is_returned_trimmed() {
        let llm = CannedLlm(Ok("  There are 3 users.  ".to_string()));
        assert_eq!(
            summarize(&llm, "how many users?", &rows(3)).await,
            "There are 3 users."
        );
    }

    #[tokio::test]
    async fn backend_failure_falls_back_to_row_count() {
        let llm = CannedLlm(Err(()));
        assert_eq!(
            summarize(&llm, "how many users?", &rows(2)).await,
            "Returned 2 rows."
        );
    }

    #[tokio::test]
    async fn blank_completion_falls_back_to_row_count() {
        let llm = CannedLlm(Ok("   ".to_string()));
        assert_eq!(summarize(&llm, "q", &rows(0)).await, "Returned 0 rows.");
    }
}
