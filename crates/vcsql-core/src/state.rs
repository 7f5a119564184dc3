//! Single-owner state of one translation

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use vcsql_ir::{BlockKind, SelectInto};

use crate::emitter::BlockEmitter;
use crate::error::TranslateError;
use crate::lifecycle::TableLifecycle;
use crate::names::TableNameSource;
use crate::scope::ScopeStack;
use crate::Translation;

/// Keys of the converted-options map.
pub mod keys {
    pub const AGG_FUNC: &str = "aggFunc";
    pub const CONTENT_STR: &str = "contentStr";
    pub const SET_VAL_CONTEXT: &str = "setValContext";
    pub const SET_VAL_NEW_VAL: &str = "setValNewVal";
    pub const IS_SENDER: &str = "isSender";
    pub const MSG_DIR: &str = "msgDir";
    pub const SEND_MSG_DIR: &str = "SendMsgDir";
}

/// Values derived during translation for downstream consumers.
///
/// Keys are only ever added or overwritten, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConvertedOptions(BTreeMap<String, String>);

impl ConvertedOptions {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Accumulators of one translation run.
///
/// Each compilation step borrows the state mutably; nothing is shared
/// between runs.
pub struct TranslationState {
    pub(crate) emitter: BlockEmitter,
    pub(crate) tables: TableLifecycle,
    pub(crate) scope: ScopeStack,
    pub(crate) senders: BTreeSet<String>,
    pub(crate) converted: ConvertedOptions,
    names: Box<dyn TableNameSource>,
}

impl TranslationState {
    pub fn new(names: Box<dyn TableNameSource>) -> Self {
        Self {
            emitter: BlockEmitter::new(),
            tables: TableLifecycle::new(),
            scope: ScopeStack::new(),
            senders: BTreeSet::new(),
            converted: ConvertedOptions::default(),
            names,
        }
    }

    pub fn emitter(&self) -> &BlockEmitter {
        &self.emitter
    }

    pub fn tables(&self) -> &TableLifecycle {
        &self.tables
    }

    pub fn scope(&self) -> &ScopeStack {
        &self.scope
    }

    pub(crate) fn fresh_table_name(&mut self) -> String {
        self.names.next_name(&self.tables)
    }

    /// Fail on the first table that is not live.
    pub(crate) fn check_references(&self, tables: &[String]) -> Result<(), TranslateError> {
        tables.iter().try_for_each(|t| self.tables.check_live(t))
    }

    /// Emit a select of `tables` joined on id into `target`, projecting the
    /// id of the first table and the value of `value_source`.
    pub fn join(
        &mut self,
        target: &str,
        tables: &[String],
        predicate: &str,
        value_source: &str,
    ) -> Result<(), TranslateError> {
        let first = tables
            .first()
            .ok_or_else(|| TranslateError::UnresolvedTableReference(format!("join into {}", target)))?;

        let select = SelectInto {
            attrs: vec![
                format!("{}.id AS id", first),
                format!("{}.val AS val", value_source),
            ],
            target: Some(target.to_string()),
            from: tables.to_vec(),
            predicate: predicate.to_string(),
            id_join: true,
            group_by: None,
        };
        self.emitter.emit("join", BlockKind::SelectInto(select));
        self.tables.create(target)
    }

    pub(crate) fn into_translation(self) -> Translation {
        Translation {
            blocks: self.emitter.into_blocks(),
            converted_options: self.converted,
            senders: self.senders,
        }
    }
}
