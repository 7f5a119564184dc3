//! Update-and-send program driver
//!
//! Statements run strictly in textual order. Conditionals compile into
//! relational filters, so there is no branching at translation time beyond
//! entering and leaving scopes.

use tracing::debug;
use vcsql_ast::{parse_program, repoint_table, rewrite_placeholders, Statement};
use vcsql_ir::BlockKind;

use crate::error::TranslateError;
use crate::resolve::referenced_tables;
use crate::scope::DEFAULT_CONTEXT;
use crate::send::Direction;
use crate::state::{keys, TranslationState};

impl TranslationState {
    /// Compile every statement of an update-and-send program.
    pub fn run_update_and_send(&mut self, source: &str) -> Result<(), TranslateError> {
        for statement in parse_program(source)? {
            debug!(line = statement.line, kind = ?statement.statement.kind(), "statement");
            self.run_statement(statement.statement)?;
        }
        self.scope.finish()
    }

    fn run_statement(&mut self, statement: Statement) -> Result<(), TranslateError> {
        match statement {
            Statement::BeginIf { condition } => self.enter_scope(&condition),
            Statement::MutateValue { value } => self.mutate_value(&value),
            Statement::Send { direction, content } => {
                let direction: Direction = direction.parse()?;
                self.converted.set(keys::MSG_DIR, direction.to_string());
                self.converted.set(keys::SEND_MSG_DIR, direction.to_string());
                let content = rewrite_placeholders(&content, self.scope.current());
                self.plan_send(direction, &content)
            }
            Statement::EndIf => self.leave_scope(),
            Statement::Assignment { target, expression } => self.compile_assignment(&target, &expression),
        }
    }

    /// `setVal(value)`: overwrite the value of every vertex in scope.
    pub fn mutate_value(&mut self, value: &str) -> Result<(), TranslateError> {
        let context = self.scope.current().to_string();
        let value = rewrite_placeholders(value, &context);
        self.check_references(&referenced_tables(&value)?)?;

        self.emitter.emit(
            "setVal",
            BlockKind::UpdateVertex {
                context: context.clone(),
                value: value.clone(),
            },
        );

        let carried = repoint_table(&value, DEFAULT_CONTEXT, vcsql_ast::VALUE_TABLE)?;
        let audience = if context == DEFAULT_CONTEXT { "all" } else { "notAll" };
        self.converted.set(keys::SET_VAL_CONTEXT, context);
        self.converted.set(keys::SET_VAL_NEW_VAL, carried);
        self.converted.set(keys::IS_SENDER, audience);
        Ok(())
    }
}
