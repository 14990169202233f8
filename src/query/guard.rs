use crate::error::AppError;
use regex::Regex;
use tracing::warn;

/// Coarse substring scan over the raw user text. A question merely mentioning
/// "dropdown" trips it too; that false positive is accepted behavior.
const FORBIDDEN_KEYWORDS: [&str; 7] = [
    "add", "insert", "update", "delete", "drop", "alter", "truncate",
];

pub fn check_user_text(user_query: &str) -> Result<(), AppError> {
    let lowered = user_query.to_lowercase();
    if FORBIDDEN_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        warn!("blocked potentially harmful user query: {}", user_query);
        return Err(AppError::GenerationRejected(
            "Only read-only queries are allowed. Mutating queries are not supported.".to_string(),
        ));
    }
    Ok(())
}

/// Textual scan of the generated SQL for common injection idioms. This is
/// pattern matching, not parsing; statement-type enforcement happens later.
pub fn check_generated_sql(sql: &str) -> Result<(), AppError> {
    let dangerous_patterns = [r";\s*--", r";\s*/\*", r"(?i)EXEC\s+", r"(?i)DROP\s+TABLE"];
    for pattern in dangerous_patterns {
        let re = Regex::new(pattern).unwrap();
        if re.is_match(sql) {
            warn!("dangerous pattern {:?} matched in generated SQL", pattern);
            return Err(AppError::GenerationRejected(
                "Potentially dangerous SQL detected".to_string(),
            ));
        }
    }
    Ok(())
}
