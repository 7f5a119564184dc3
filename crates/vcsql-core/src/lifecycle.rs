//! Working set of relational tables live in the current superstep

use tracing::trace;

use crate::error::TranslateError;

/// Tables that survive superstep boundaries.
pub const PROTECTED_TABLES: [&str; 4] = ["message", "next", "in_cnts", "out_cnts"];

/// Input relations that always exist and are never created or dropped.
pub const BASE_TABLES: [&str; 2] = ["vertex", "edge"];

pub fn is_protected(table: &str) -> bool {
    PROTECTED_TABLES.contains(&table)
}

pub fn is_base(table: &str) -> bool {
    BASE_TABLES.contains(&table)
}

/// Live tables in creation order.
#[derive(Debug, Clone, Default)]
pub struct TableLifecycle {
    live: Vec<String>,
}

impl TableLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.live.iter().any(|t| t == table)
    }

    pub fn tables(&self) -> &[String] {
        &self.live
    }

    /// Record that `table` now exists.
    ///
    /// Protected tables may be recreated; any other name is single-writer.
    pub fn create(&mut self, table: &str) -> Result<(), TranslateError> {
        if self.contains(table) {
            if is_protected(table) {
                return Ok(());
            }
            return Err(TranslateError::TableRedefined(table.to_string()));
        }
        trace!(table, "table created");
        self.live.push(table.to_string());
        Ok(())
    }

    /// Record that `table` was dropped. Returns whether it was live.
    pub fn remove(&mut self, table: &str) -> bool {
        let before = self.live.len();
        self.live.retain(|t| t != table);
        before != self.live.len()
    }

    /// Fail unless `table` is live or a base relation.
    pub fn check_live(&self, table: &str) -> Result<(), TranslateError> {
        if self.contains(table) || is_base(table) {
            Ok(())
        } else {
            Err(TranslateError::UnknownTable(table.to_string()))
        }
    }

    /// Remove and return every transient table, keeping the protected ones.
    pub fn drain_transient(&mut self) -> Vec<String> {
        let (kept, dropped): (Vec<String>, Vec<String>) =
            self.live.drain(..).partition(|t| is_protected(t));
        self.live = kept;
        trace!(dropped = ?dropped, "transient tables drained");
        dropped
    }
}
