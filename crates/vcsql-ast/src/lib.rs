//! VCSQL AST - tokenizer and statement parser for the update-and-send mini-language

pub mod ast;
mod parser;

pub use ast::*;
pub use parser::{
    classify, is_identifier, parse_program, parse_statement, qualify_identifier, repoint_table, rewrite_placeholders,
    tokenize, ExprParser, ParseError, Rule, AGGREGATION_PLACEHOLDER, VALUE_PLACEHOLDER, VALUE_TABLE,
};
