//! Synthetic table names

use crate::lifecycle::TableLifecycle;

/// Source of fresh table names for intermediate relations.
///
/// Implementations must return a name that is not live in `tables` and must
/// be deterministic for a given sequence of calls.
pub trait TableNameSource {
    fn next_name(&mut self, tables: &TableLifecycle) -> String;
}

/// Counter-based names: `scope_0`, `scope_1`, ...
#[derive(Debug, Clone)]
pub struct SequentialNames {
    prefix: String,
    counter: usize,
}

impl SequentialNames {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }
}

impl Default for SequentialNames {
    fn default() -> Self {
        Self::new("scope_")
    }
}

impl TableNameSource for SequentialNames {
    fn next_name(&mut self, tables: &TableLifecycle) -> String {
        loop {
            let name = format!("{}{}", self.prefix, self.counter);
            self.counter += 1;
            if !tables.contains(&name) {
                return name;
            }
        }
    }
}
