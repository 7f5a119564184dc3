//! Nested `if` contexts
//!
//! A context is the table whose rows are the vertices in scope for the
//! statements that follow. Outside any `if` it is `cur`, the combined
//! messages of the current superstep.

use tracing::trace;

use crate::error::TranslateError;
use crate::lifecycle::is_base;
use crate::state::TranslationState;

/// Context outside of any `if` block.
pub const DEFAULT_CONTEXT: &str = "cur";

#[derive(Debug, Clone)]
pub struct ScopeStack {
    enclosing: Vec<String>,
    current: String,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            enclosing: Vec::new(),
            current: DEFAULT_CONTEXT.to_string(),
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn is_default(&self) -> bool {
        self.current == DEFAULT_CONTEXT
    }

    /// Number of unmatched `if` blocks.
    pub fn depth(&self) -> usize {
        self.enclosing.len()
    }

    /// Make `context` current, remembering the enclosing one.
    pub fn push(&mut self, context: String) {
        let outer = std::mem::replace(&mut self.current, context);
        self.enclosing.push(outer);
    }

    /// Restore the enclosing context.
    pub fn leave(&mut self) -> Result<(), TranslateError> {
        let outer = self
            .enclosing
            .pop()
            .ok_or_else(|| TranslateError::UnbalancedScope("'}' without a matching 'if'".to_string()))?;
        self.current = outer;
        Ok(())
    }

    /// Fail if any `if` block is still open.
    pub fn finish(&self) -> Result<(), TranslateError> {
        match self.depth() {
            0 => Ok(()),
            open => Err(TranslateError::UnbalancedScope(format!(
                "{} 'if' block(s) never closed",
                open
            ))),
        }
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationState {
    /// Open an `if (flow_control) {` block.
    ///
    /// At top level the flow-control table itself becomes the context. Nested
    /// blocks intersect the outer context with the flow-control table into a
    /// fresh table.
    pub fn enter_scope(&mut self, flow_control: &str) -> Result<(), TranslateError> {
        if is_base(flow_control) {
            return Err(TranslateError::ReservedTable(flow_control.to_string()));
        }
        self.tables.check_live(flow_control)?;

        let context = if self.scope.is_default() {
            flow_control.to_string()
        } else {
            let target = self.fresh_table_name();
            let tables = [self.scope.current().to_string(), flow_control.to_string()];
            self.join(&target, &tables, "", flow_control)?;
            target
        };

        self.scope.push(context);
        trace!(context = self.scope.current(), depth = self.scope.depth(), "entered scope");
        Ok(())
    }

    /// Close the innermost `if` block.
    pub fn leave_scope(&mut self) -> Result<(), TranslateError> {
        self.scope.leave()?;
        trace!(context = self.scope.current(), depth = self.scope.depth(), "left scope");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::SequentialNames;
    use vcsql_ir::BlockKind;

    fn state_with(tables: &[&str]) -> TranslationState {
        let mut state = TranslationState::new(Box::new(SequentialNames::default()));
        for t in tables {
            state.tables.create(t).unwrap();
        }
        state
    }

    #[test]
    fn test_stack_push_and_leave() {
        let mut scope = ScopeStack::new();
        assert_eq!(scope.current(), "cur");

        scope.push("a".to_string());
        scope.push("b".to_string());
        assert_eq!(scope.depth(), 2);
        assert!(scope.finish().is_err());

        scope.leave().unwrap();
        assert_eq!(scope.current(), "a");
        scope.leave().unwrap();
        assert_eq!(scope.current(), "cur");
        assert!(scope.finish().is_ok());

        assert!(matches!(scope.leave(), Err(TranslateError::UnbalancedScope(_))));
    }

    #[test]
    fn test_top_level_if_uses_flow_control_table() {
        let mut state = state_with(&["cur", "changed"]);
        state.enter_scope("changed").unwrap();

        assert_eq!(state.scope.current(), "changed");
        assert!(state.emitter.blocks().is_empty());
    }

    #[test]
    fn test_nested_if_joins_contexts() {
        let mut state = state_with(&["cur", "outer", "inner"]);
        state.enter_scope("outer").unwrap();
        state.enter_scope("inner").unwrap();

        assert_eq!(state.scope.current(), "scope_0");
        assert_eq!(state.scope.depth(), 2);
        assert!(state.tables.contains("scope_0"));

        let blocks = state.emitter.blocks();
        assert_eq!(blocks.len(), 1);
        match &blocks[0].kind {
            BlockKind::SelectInto(select) => {
                assert_eq!(select.target.as_deref(), Some("scope_0"));
                assert_eq!(select.from, vec!["outer", "inner"]);
                assert_eq!(select.attrs, vec!["outer.id AS id", "inner.val AS val"]);
                assert!(select.id_join);
            }
            other => panic!("expected a join, got {:?}", other),
        }

        state.leave_scope().unwrap();
        assert_eq!(state.scope.current(), "outer");
        state.leave_scope().unwrap();
        assert_eq!(state.scope.current(), "cur");
    }

    #[test]
    fn test_flow_control_table_must_exist() {
        let mut state = state_with(&["cur"]);
        assert!(matches!(state.enter_scope("changed"), Err(TranslateError::UnknownTable(_))));
    }

    #[test]
    fn test_input_relations_are_not_conditions() {
        let mut state = state_with(&["cur"]);
        assert!(matches!(state.enter_scope("edge"), Err(TranslateError::ReservedTable(t)) if t == "edge"));
        assert!(matches!(state.enter_scope("vertex"), Err(TranslateError::ReservedTable(_))));
        assert_eq!(state.scope.depth(), 0);
    }
}
