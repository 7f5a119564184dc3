//! Pest-based tokenizer and line-oriented statement parser

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use crate::ast::*;

#[derive(Parser)]
#[grammar = "vcsql.pest"]
pub struct ExprParser;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Pest error: {0}")]
    Pest(#[from] pest::error::Error<Rule>),

    #[error("Malformed statement at line {line}: {reason}")]
    MalformedStatement { line: usize, reason: String },
}

/// Stands for the combined incoming message value of the vertex in scope.
pub const AGGREGATION_PLACEHOLDER: &str = "getAggregationVal()";

/// Stands for the vertex value carried over from the previous superstep.
pub const VALUE_PLACEHOLDER: &str = "getVal()";

/// Table holding per-vertex values across supersteps.
pub const VALUE_TABLE: &str = "next";

/// Split an expression into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut pairs = ExprParser::parse(Rule::expression, source)?;
    let expression = pairs
        .next()
        .ok_or_else(|| ParseError::Syntax("Empty input".to_string()))?;

    expression
        .into_inner()
        .filter(|pair| pair.as_rule() != Rule::EOI)
        .map(parse_token)
        .collect()
}

fn parse_token(pair: Pair<Rule>) -> Result<Token, ParseError> {
    let text = pair.as_str().to_string();
    match pair.as_rule() {
        Rule::qualified => {
            let mut inner = pair.into_inner();
            match (inner.next(), inner.next()) {
                (Some(table), Some(field)) => Ok(Token::Qualified {
                    table: table.as_str().to_string(),
                    field: field.as_str().to_string(),
                }),
                _ => Err(ParseError::Syntax(format!("Invalid qualified name: {}", text))),
            }
        }
        Rule::placeholder => {
            let name = pair
                .into_inner()
                .next()
                .map(|ident| ident.as_str().to_string())
                .unwrap_or(text);
            Ok(Token::Placeholder(name))
        }
        Rule::keyword => Ok(Token::Keyword(text)),
        Rule::number => Ok(Token::Number(text)),
        Rule::string => Ok(Token::Str(text[1..text.len() - 1].to_string())),
        Rule::ident => Ok(Token::Ident(text)),
        Rule::operator => Ok(Token::Operator(text)),
        Rule::lparen => Ok(Token::LParen),
        Rule::rparen => Ok(Token::RParen),
        Rule::comma => Ok(Token::Comma),
        rule => Err(ParseError::Syntax(format!("Unexpected {:?}: {}", rule, text))),
    }
}

/// Replace the mini-language placeholders with table-qualified values.
///
/// `getAggregationVal()` reads the value column of the scope `context`,
/// `getVal()` reads the value carried in `next`.
pub fn rewrite_placeholders(source: &str, context: &str) -> String {
    source
        .replace(AGGREGATION_PLACEHOLDER, &format!("{}.val", context))
        .replace(VALUE_PLACEHOLDER, &format!("{}.val", VALUE_TABLE))
}

/// Re-point every `from.<field>` reference at `to.<field>`.
///
/// Only the table part of qualified names is touched, so identifiers that
/// merely contain `from` as a substring are left alone.
pub fn repoint_table(source: &str, from: &str, to: &str) -> Result<String, ParseError> {
    let mut pairs = ExprParser::parse(Rule::expression, source)?;
    let expression = pairs
        .next()
        .ok_or_else(|| ParseError::Syntax("Empty input".to_string()))?;

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for pair in expression.into_inner().filter(|p| p.as_rule() == Rule::qualified) {
        if let Some(table) = pair.into_inner().next() {
            if table.as_str() == from {
                let span = table.as_span();
                out.push_str(&source[cursor..span.start()]);
                out.push_str(to);
                cursor = span.end();
            }
        }
    }
    out.push_str(&source[cursor..]);

    Ok(out)
}

/// Qualify every bare `name` token as `name.field`.
pub fn qualify_identifier(source: &str, name: &str, field: &str) -> Result<String, ParseError> {
    let mut pairs = ExprParser::parse(Rule::expression, source)?;
    let expression = pairs
        .next()
        .ok_or_else(|| ParseError::Syntax("Empty input".to_string()))?;

    let mut out = String::with_capacity(source.len() + field.len());
    let mut cursor = 0;
    for pair in expression.into_inner() {
        if pair.as_rule() == Rule::ident && pair.as_str() == name {
            let end = pair.as_span().end();
            out.push_str(&source[cursor..end]);
            out.push('.');
            out.push_str(field);
            cursor = end;
        }
    }
    out.push_str(&source[cursor..]);

    Ok(out)
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !matches!(text, "AND" | "OR" | "NOT")
}

/// Classify a trimmed statement line by its leading shape.
pub fn classify(line: &str) -> StatementKind {
    let line = line.trim();
    if starts_with_keyword(line, "if") {
        StatementKind::BeginIf
    } else if starts_with_call(line, "setVal") {
        StatementKind::MutateValue
    } else if starts_with_call(line, "send") {
        StatementKind::SendMsg
    } else if line.starts_with('}') {
        StatementKind::EndIf
    } else {
        StatementKind::Assignment
    }
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    line.strip_prefix(keyword)
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_'))
}

fn starts_with_call(line: &str, name: &str) -> bool {
    line.strip_prefix(name)
        .is_some_and(|rest| rest.trim_start().starts_with('('))
}

/// Text between the first `(` and the last `)`, provided nothing follows it.
fn call_arguments(text: &str) -> Option<&str> {
    let open = text.find('(')?;
    let close = text.rfind(')')?;
    if close < open || !text[close + 1..].trim().is_empty() {
        return None;
    }
    Some(text[open + 1..close].trim())
}

/// Parse a single statement line. `line` is the 1-based source line used in errors.
pub fn parse_statement(source: &str, line: usize) -> Result<Statement, ParseError> {
    let malformed = |reason: &str| ParseError::MalformedStatement {
        line,
        reason: reason.to_string(),
    };

    let text = source.trim();
    let text = text.strip_suffix(';').unwrap_or(text).trim_end();

    match classify(text) {
        StatementKind::BeginIf => {
            let open = text.find('(').ok_or_else(|| malformed("expected '(' after 'if'"))?;
            if !text[2..open].trim().is_empty() {
                return Err(malformed("expected '(' after 'if'"));
            }
            let close = text[open..]
                .find(')')
                .map(|i| open + i)
                .ok_or_else(|| malformed("unterminated condition"))?;
            if text[close + 1..].trim() != "{" {
                return Err(malformed("expected '{' after condition"));
            }
            let condition = text[open + 1..close].trim();
            if !is_identifier(condition) {
                return Err(malformed("condition must name a single flow-control table"));
            }
            Ok(Statement::BeginIf {
                condition: condition.to_string(),
            })
        }
        StatementKind::MutateValue => {
            let value = call_arguments(text).ok_or_else(|| malformed("expected 'setVal(<expression>)'"))?;
            if value.is_empty() {
                return Err(malformed("setVal needs a value expression"));
            }
            Ok(Statement::MutateValue {
                value: value.to_string(),
            })
        }
        StatementKind::SendMsg => {
            let args = call_arguments(text)
                .ok_or_else(|| malformed("expected 'send(<direction>, <content>)'"))?;
            let (direction, content) = args
                .split_once(',')
                .map(|(d, c)| (d.trim(), c.trim()))
                .ok_or_else(|| malformed("send needs a direction and a content expression"))?;
            if direction.is_empty() || content.is_empty() {
                return Err(malformed("send needs a direction and a content expression"));
            }
            Ok(Statement::Send {
                direction: direction.to_string(),
                content: content.to_string(),
            })
        }
        StatementKind::EndIf => {
            if text != "}" {
                return Err(malformed("unexpected text after '}'"));
            }
            Ok(Statement::EndIf)
        }
        StatementKind::Assignment => {
            let eq = text.find('=').ok_or_else(|| malformed("expected 'name = expression'"))?;
            if text[eq + 1..].starts_with('=') {
                return Err(malformed("expected 'name = expression'"));
            }
            let target = text[..eq].trim();
            if !is_identifier(target) {
                return Err(malformed("assignment target must be an identifier"));
            }
            let expression = text[eq + 1..].trim();
            if expression.is_empty() {
                return Err(malformed("assignment needs an expression"));
            }
            Ok(Statement::Assignment {
                target: target.to_string(),
                expression: expression.to_string(),
            })
        }
    }
}

/// Parse a newline-separated update-and-send program.
///
/// Blank lines and `//` or `#` comment lines are skipped.
pub fn parse_program(source: &str) -> Result<Vec<SourceStatement>, ParseError> {
    let mut statements = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let text = raw.trim();
        if text.is_empty() || text.starts_with("//") || text.starts_with('#') {
            continue;
        }
        let line = index + 1;
        statements.push(SourceStatement {
            line,
            statement: parse_statement(text, line)?,
        });
    }

    Ok(statements)
}
