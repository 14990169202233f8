//! Pipeline tests for the generate -> validate -> flatten -> export flow,
//! driven by mock completion providers. No database or network required.

use async_trait::async_trait;
use querygen::db::dialect::Dialect;
use querygen::error::AppError;
use querygen::llm::{LlmError, LlmManager, TextCompletion};
use querygen::query::{export, flatten, generate, summary, validate};
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};

const USERS_SCHEMA: &str = "Table: users\nColumns: id (integer), name (text)";

struct MockLlm {
    response: String,
    calls: AtomicUsize,
}

impl MockLlm {
    fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextCompletion for MockLlm {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

struct FailingLlm;

#[async_trait]
impl TextCompletion for FailingLlm {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::ConnectionError("connection refused".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

#[tokio::test]
async fn forbidden_keyword_rejects_before_any_backend_call() {
    let llm = MockLlm::new("SELECT 1");
    let err = generate::generate_sql(&llm, &Dialect::postgres(), "insert a new user", USERS_SCHEMA)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::GenerationRejected(_)));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn dangerous_generated_text_rejects_before_validation() {
    let llm = MockLlm::new("SELECT * FROM \"users\"; DROP TABLE \"users\"");
    let err = generate::generate_sql(&llm, &Dialect::postgres(), "show me all users", USERS_SCHEMA)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::GenerationRejected(_)));
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn backend_failure_maps_to_a_generation_backend_error() {
    let err = generate::generate_sql(
        &FailingLlm,
        &Dialect::postgres(),
        "show me all users",
        USERS_SCHEMA,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::GenerationBackend(_)));
}

#[tokio::test]
async fn empty_backend_response_is_a_generation_backend_error() {
    let llm = MockLlm::new("   \n  ");
    let err = generate::generate_sql(&llm, &Dialect::postgres(), "show me all users", USERS_SCHEMA)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::GenerationBackend(_)));
}

#[tokio::test]
async fn fenced_response_cleans_and_validates() {
    let llm = MockLlm::new("```sql\nSELECT \"id\", \"name\" FROM \"users\";\n```");
    let raw = generate::generate_sql(&llm, &Dialect::postgres(), "show me all users", USERS_SCHEMA)
        .await
        .unwrap();

    let sql = validate::strip_code_fences(&raw);
    assert_eq!(sql, "SELECT \"id\", \"name\" FROM \"users\";");
    assert!(validate::is_safe_select(&sql, &Dialect::postgres()));
}

#[tokio::test]
async fn unfenced_select_passes_straight_through() {
    let llm = MockLlm::new("SELECT \"id\", \"name\" FROM \"users\"");
    let raw = generate::generate_sql(&llm, &Dialect::postgres(), "show me all users", USERS_SCHEMA)
        .await
        .unwrap();

    let sql = validate::strip_code_fences(&raw);
    assert!(validate::is_safe_select(&sql, &Dialect::postgres()));
    assert!(sql.contains("FROM \"users\""));
}

#[tokio::test]
async fn manager_wrapped_provider_drives_the_same_pipeline() {
    let manager = LlmManager::with_provider(Box::new(MockLlm::new(
        "SELECT count(*) AS \"user_count\" FROM \"users\"",
    )));
    let raw = generate::generate_sql(
        &manager,
        &Dialect::postgres(),
        "how many users are there?",
        USERS_SCHEMA,
    )
    .await
    .unwrap();

    assert!(validate::is_safe_select(
        &validate::strip_code_fences(&raw),
        &Dialect::postgres()
    ));
}

#[tokio::test]
async fn flattened_rows_export_and_summarize_end_to_end() {
    // Simulated execution result for "show me all users"
    let rows = vec![
        object(json!({"id": 1, "name": "alice"})),
        object(json!({"id": 2, "name": "bob"})),
    ];
    let flat: Vec<Map<String, Value>> = rows.iter().map(flatten::flatten_record).collect();

    let keys: Vec<&str> = flat[0].keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["id", "name"]);

    let csv = export::export(&flat).unwrap().expect("rows should export");
    let text = String::from_utf8(csv.bytes.clone()).unwrap();
    assert!(text.starts_with("id,name\n"));
    assert!(!csv.base64().is_empty());
    assert!(csv.filename.starts_with("result_"));

    let text_summary = summary::summarize(&FailingLlm, "show me all users", &flat).await;
    assert_eq!(text_summary, "Returned 2 rows.");
}

#[tokio::test]
async fn zero_rows_produce_empty_csv_fields_and_a_zero_summary() {
    let flat: Vec<Map<String, Value>> = Vec::new();

    assert!(export::export(&flat).unwrap().is_none());

    let text_summary = summary::summarize(&FailingLlm, "show me all users", &flat).await;
    assert_eq!(text_summary, "Returned 0 rows.");
}

#[tokio::test]
async fn nested_json_columns_flatten_into_dotted_keys() {
    let rows = vec![object(json!({
        "id": 7,
        "profile": {"city": "Oslo", "contact": {"email": "a@example.com"}}
    }))];
    let flat: Vec<Map<String, Value>> = rows.iter().map(flatten::flatten_record).collect();

    assert_eq!(flat[0]["profile.city"], json!("Oslo"));
    assert_eq!(flat[0]["profile.contact.email"], json!("a@example.com"));
    assert!(flat[0].values().all(|v| !v.is_object()));
}
