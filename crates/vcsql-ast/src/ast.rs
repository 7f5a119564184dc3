//! AST types for the update-and-send mini-language
//!
//! Statements stay close to their source text: expressions are kept as
//! strings because they are spliced verbatim into generated SQL. The token
//! stream is only used to analyse which tables an expression touches.

use serde::{Deserialize, Serialize};

/// One lexical token of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// `table.field`
    Qualified { table: String, field: String },
    /// Zero-argument call such as `getVal()`
    Placeholder(String),
    /// `AND`, `OR`, `NOT`
    Keyword(String),
    Number(String),
    Str(String),
    Ident(String),
    Operator(String),
    LParen,
    RParen,
    Comma,
}

impl Token {
    /// Table name of a `table.id` / `table.val` access.
    pub fn value_table(&self) -> Option<&str> {
        match self {
            Token::Qualified { table, field } if field == "id" || field == "val" => Some(table),
            _ => None,
        }
    }
}

/// Statement shapes, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    BeginIf,
    MutateValue,
    SendMsg,
    EndIf,
    Assignment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// `if (flag) {`
    BeginIf { condition: String },
    /// `setVal(expr)`
    MutateValue { value: String },
    /// `send(direction, content)`
    Send { direction: String, content: String },
    /// `}`
    EndIf,
    /// `name = expr`
    Assignment { target: String, expression: String },
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::BeginIf { .. } => StatementKind::BeginIf,
            Statement::MutateValue { .. } => StatementKind::MutateValue,
            Statement::Send { .. } => StatementKind::SendMsg,
            Statement::EndIf => StatementKind::EndIf,
            Statement::Assignment { .. } => StatementKind::Assignment,
        }
    }
}

/// A statement together with its 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatement {
    pub line: usize,
    pub statement: Statement,
}
