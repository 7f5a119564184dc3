//! Show how an update-and-send line is classified and which tables its
//! expressions read through `.id` / `.val`.
//!
//! cargo run -p vcsql-ast --example debug_tokens -- "send(out, next.val / out_cnts.cnt)"

use vcsql_ast::{parse_statement, rewrite_placeholders, tokenize, Statement};

fn show_expression(label: &str, expression: &str) {
    let expression = rewrite_placeholders(expression, "cur");
    println!("{}: {}", label, expression);
    match tokenize(&expression) {
        Ok(tokens) => {
            for token in tokens {
                match token.value_table() {
                    Some(table) => println!("  {:<40} -> reads {}", format!("{:?}", token), table),
                    None => println!("  {:?}", token),
                }
            }
        }
        Err(e) => println!("  tokenize error: {}", e),
    }
}

fn main() {
    let line = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "changed = getAggregationVal() < getVal() AND -cur.val <= 3".to_string());

    let statement = match parse_statement(&line, 1) {
        Ok(statement) => statement,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };
    println!("{:?}", statement.kind());

    match statement {
        Statement::BeginIf { condition } => println!("context: {}", condition),
        Statement::MutateValue { value } => show_expression("value", &value),
        Statement::Send { direction, content } => {
            println!("direction: {}", direction);
            show_expression("content", &content);
        }
        Statement::EndIf => {}
        Statement::Assignment { target, expression } => {
            println!("target: {}", target);
            show_expression("predicate", &expression);
        }
    }
}
