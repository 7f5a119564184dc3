//! VCSQL Core - vertex-centric program to SQL block translator
//!
//! A [`Translator`] takes the option dictionary of one vertex-centric
//! algorithm and produces, in a single pass, the ordered code blocks of an
//! iterative SQL program together with the values derived along the way.
//!
//! ```text
//! init -> beginWhile -> superstep -> endWhile
//! ```
//!
//! The generated loop runs any number of supersteps at execution time; the
//! translation itself runs exactly once.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::info;
use vcsql_ir::{Block, RenderError};

mod assign;
mod controller;
mod emitter;
mod error;
mod lifecycle;
mod names;
mod options;
mod program;
mod resolve;
mod scope;
mod send;
mod state;

pub use emitter::BlockEmitter;
pub use error::TranslateError;
pub use lifecycle::{is_base, is_protected, TableLifecycle, BASE_TABLES, PROTECTED_TABLES};
pub use names::{SequentialNames, TableNameSource};
pub use options::*;
pub use resolve::referenced_tables;
pub use scope::{ScopeStack, DEFAULT_CONTEXT};
pub use send::{Direction, EDGE_TABLE, IN_COUNTS, MESSAGE_TABLE, OUT_COUNTS};
pub use state::{keys, ConvertedOptions, TranslationState};

/// One-shot translator for a single option dictionary.
pub struct Translator {
    options: AlgorithmOptions,
    names: Box<dyn TableNameSource>,
}

impl Translator {
    pub fn new(options: AlgorithmOptions) -> Self {
        Self {
            options,
            names: Box::new(SequentialNames::default()),
        }
    }

    pub fn from_map(options: &HashMap<String, String>) -> Result<Self, TranslateError> {
        Ok(Self::new(AlgorithmOptions::from_map(options)?))
    }

    /// Replace the source of synthetic table names.
    pub fn with_name_source(mut self, names: impl TableNameSource + 'static) -> Self {
        self.names = Box::new(names);
        self
    }

    pub fn options(&self) -> &AlgorithmOptions {
        &self.options
    }

    /// Run the translation. The first error aborts it; no partial output is returned.
    pub fn translate(self) -> Result<Translation, TranslateError> {
        let termination = self.options.termination()?;
        let mut state = TranslationState::new(self.names);

        state.init(&self.options)?;
        state.begin_while(&termination);
        state.superstep(&self.options)?;
        state.end_while(termination);

        let translation = state.into_translation();
        info!(
            blocks = translation.blocks.len(),
            senders = translation.senders.len(),
            "translation finished"
        );
        Ok(translation)
    }
}

/// Result of one translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub(crate) blocks: Vec<Block>,
    pub(crate) converted_options: ConvertedOptions,
    pub(crate) senders: BTreeSet<String>,
}

impl Translation {
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn converted_options(&self) -> &ConvertedOptions {
        &self.converted_options
    }

    /// Tables whose values appear in the content of any send statement.
    pub fn senders(&self) -> &BTreeSet<String> {
        &self.senders
    }

    /// Number of descriptors, counting union sub-plans.
    pub fn descriptor_count(&self) -> usize {
        self.blocks.iter().map(Block::descriptor_count).sum()
    }

    /// SHA-256 over the canonical JSON form of the whole translation.
    pub fn fingerprint(&self) -> String {
        vcsql_ir::fingerprint(self)
    }

    pub fn render(&self) -> Result<String, RenderError> {
        vcsql_ir::render(&self.blocks)
    }
}
