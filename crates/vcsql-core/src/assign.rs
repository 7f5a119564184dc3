//! `name = expression` statements

use vcsql_ast::rewrite_placeholders;
use vcsql_ir::{BlockKind, SelectInto};

use crate::error::TranslateError;
use crate::lifecycle::{is_base, is_protected};
use crate::resolve::referenced_tables;
use crate::scope::DEFAULT_CONTEXT;
use crate::state::TranslationState;

/// Names a program may not assign: tables the controller writes and the input graph.
fn is_reserved(table: &str) -> bool {
    is_protected(table) || is_base(table) || table == DEFAULT_CONTEXT
}

impl TranslationState {
    /// Materialise the vertices in scope that satisfy `expression` as table `target`.
    ///
    /// Outside any `if` an expression over a single table projects that
    /// table's id/val pair; otherwise the context supplies it.
    pub fn compile_assignment(&mut self, target: &str, expression: &str) -> Result<(), TranslateError> {
        if is_reserved(target) {
            return Err(TranslateError::ReservedTable(target.to_string()));
        }

        let context = self.scope.current().to_string();
        let expression = rewrite_placeholders(expression, &context);

        let tables = referenced_tables(&expression)?;
        if tables.is_empty() {
            return Err(TranslateError::UnresolvedTableReference(expression));
        }
        self.check_references(&tables)?;

        let source = match tables.as_slice() {
            [only] if self.scope.is_default() => only.clone(),
            _ => context,
        };

        let mut from = tables;
        if !from.contains(&source) {
            from.push(source.clone());
        }

        let select = SelectInto {
            attrs: vec![
                format!("{}.id AS id", source),
                format!("{}.val AS val", source),
            ],
            target: Some(target.to_string()),
            from,
            predicate: expression,
            id_join: true,
            group_by: None,
        };
        self.emitter.emit("genVar", BlockKind::SelectInto(select));
        self.tables.create(target)
    }
}
