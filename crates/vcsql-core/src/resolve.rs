//! Table references of an expression

use vcsql_ast::tokenize;

use crate::error::TranslateError;

/// Distinct tables accessed through `table.id` or `table.val`, in first-occurrence order.
pub fn referenced_tables(expression: &str) -> Result<Vec<String>, TranslateError> {
    let mut tables: Vec<String> = Vec::new();
    for token in tokenize(expression)? {
        if let Some(table) = token.value_table() {
            if !tables.iter().any(|t| t == table) {
                tables.push(table.to_string());
            }
        }
    }
    Ok(tables)
}
