use crate::db::dialect::Dialect;

/// Builds the generation prompt: dialect, schema, fixed rule list, user text.
/// Purely string formatting; safety is enforced downstream.
pub fn sql_prompt(dialect: &Dialect, schema: &str, user_query: &str) -> String {
    format!(
        r#"Convert the following user intent into a read-only {db} query.
Schema Information:
{schema}

Rules:
- ONLY generate SELECT statements. Do NOT generate INSERT, UPDATE, DELETE, or DDL queries. If the user's query is not a read-only query, return an error message.
- Use double quotes for table and column names
- Ensure SQL is secure against injection
- Return only the SQL query
- {syntax}

User Query: {user_query}
"#,
        db = dialect.name(),
        schema = schema,
        syntax = dialect.prompt_syntax(),
        user_query = user_query,
    )
}

/// Prompt for the post-execution natural-language summary.
pub fn summary_prompt(user_query: &str, results_json: &str) -> String {
    format!(
        "You are an expert SQL assistant. A user asks a question about a database, and you've \
         already shown the relevant table or data. Now, summarize the answer in 1-2 clear, \
         non-technical lines that directly answer the user's question based on the shown data. \
         Be concise, helpful, and avoid repeating the full table unless necessary.\n\n\
         The user's question is {user_query} and the results are {results_json}, so provide an \
         answer to the user's question based on the results."
    )
}
