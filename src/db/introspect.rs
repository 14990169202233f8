use crate::db::dialect::Dialect;
use crate::db::pool::DbPool;
use crate::error::AppError;

/// Builds a fresh human-readable schema description from the catalog.
/// Never cached: schema drift is always reflected, at the cost of one extra
/// round trip per request.
pub async fn get_schema(pool: &DbPool, dialect: &Dialect) -> Result<String, AppError> {
    let rows = pool
        .fetch_schema_rows(dialect.schema_query(), dialect.schema_filter())
        .await
        .map_err(|e| AppError::SchemaFetch(e.to_string()))?;
    Ok(format_schema(&rows))
}

/// Groups (table, column, type) triples into text blocks:
///
/// ```text
/// Table: users
/// Columns: id (integer), name (text)
/// ```
///
/// Rows arrive ordered by table name, so grouping consecutive rows is enough.
pub fn format_schema(rows: &[(String, String, String)]) -> String {
    let mut tables: Vec<(&str, Vec<String>)> = Vec::new();
    for (table, column, data_type) in rows {
        if tables.last().map(|(t, _)| *t != table.as_str()).unwrap_or(true) {
            tables.push((table.as_str(), Vec::new()));
        }
        if let Some((_, columns)) = tables.last_mut() {
            columns.push(format!("{column} ({data_type})"));
        }
    }

    tables
        .iter()
        .map(|(table, columns)| format!("Table: {}\nColumns: {}\n", table, columns.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(t: &str, c: &str, d: &str) -> (String, String, String) {
        (t.to_string(), c.to_string(), d.to_string())
    }

    #[test]
    fn groups_columns_under_their_table() {
        let rows = vec![
            triple("orders", "id", "integer"),
            triple("orders", "total", "numeric"),
            triple("users", "id", "integer"),
            triple("users", "name", "text"),
        ];
        let schema = format_schema(&rows);
        assert_eq!(
            schema,
            "Table: orders\nColumns: id (integer), total (numeric)\n\n\
             Table: users\nColumns: id (integer), name (text)"
        );
    }

    #[test]
    fn single_table_has_no_trailing_blank_line() {
        let rows = vec![triple("users", "id", "integer")];
        assert_eq!(format_schema(&rows), "Table: users\nColumns: id (integer)");
    }

    #[test]
    fn empty_catalog_renders_empty_schema() {
        assert_eq!(format_schema(&[]), "");
    }
}
