use crate::db::dialect::Dialect;
use regex::Regex;
use sqlparser::ast::Statement;
use sqlparser::parser::Parser;
use tracing::debug;

/// Removes the markdown code-fence wrapping LLMs commonly add
/// (```` ```sql ... ``` ````, with or without a language tag).
pub fn strip_code_fences(sql: &str) -> String {
    let re = Regex::new(r"^```[a-zA-Z]*\s*|\s*```$").unwrap();
    re.replace_all(sql.trim(), "").trim().to_string()
}

/// True only if the text parses into a non-empty statement list in which
/// every statement is a query. Parse failures and empty input (for example
/// all-whitespace after fence stripping) reject rather than passing
/// vacuously.
pub fn is_safe_select(sql: &str, dialect: &Dialect) -> bool {
    let parser_dialect = dialect.parser_dialect();
    let statements = match Parser::parse_sql(parser_dialect.as_ref(), sql) {
        Ok(statements) => statements,
        Err(e) => {
            debug!("generated SQL failed to parse: {}", e);
            return false;
        }
    };

    !statements.is_empty() && statements.iter().all(|s| matches!(s, Statement::Query(_)))
}
