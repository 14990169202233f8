use crate::db::dialect::Dialect;
use crate::error::AppError;
use crate::llm::TextCompletion;
use crate::query::{guard, prompt};
use tracing::{debug, info};

/// Turns a user question into candidate SQL: guard the raw user text, build
/// the prompt, call the bound provider, then scan the generated text for
/// injection idioms. Statement-type validation happens after this returns.
pub async fn generate_sql(
    llm: &dyn TextCompletion,
    dialect: &Dialect,
    user_query: &str,
    schema: &str,
) -> Result<String, AppError> {
    guard::check_user_text(user_query)?;

    let prompt = prompt::sql_prompt(dialect, schema, user_query);
    debug!("SQL generation prompt:\n{}", prompt);

    let response = llm
        .complete(&prompt)
        .await
        .map_err(|e| AppError::GenerationBackend(e.to_string()))?;

    let response = response.trim();
    if response.is_empty() {
        return Err(AppError::GenerationBackend(
            "generated SQL query is empty".to_string(),
        ));
    }

    guard::check_generated_sql(response)?;

    info!("generated SQL: {}", response);
    Ok(response.to_string())
}
