//! VCSQL Intermediate Representation (IR)
//!
//! Code-block descriptors emitted by the translator and consumed by a
//! renderer. The set of block kinds is closed; every consumer matches on
//! [`BlockKind`] exhaustively. All types are deterministically serializable
//! so two translations can be compared by fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

mod render;
mod types;

pub use render::{render, RenderError};
pub use types::*;

/// One generated code block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Diagnostic tag naming the step that produced the block
    pub stage: String,
    /// Loop nesting depth, for formatting only
    pub depth: usize,
    #[serde(flatten)]
    pub kind: BlockKind,
}

impl Block {
    pub fn new(stage: impl Into<String>, depth: usize, kind: BlockKind) -> Self {
        Self {
            stage: stage.into(),
            depth,
            kind,
        }
    }

    /// Table written by this block, if any.
    pub fn target_table(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::CreateTable { table, .. } | BlockKind::Insert { table, .. } => Some(table),
            BlockKind::SelectInto(select) => select.target.as_deref(),
            BlockKind::Union(union) => Some(&union.target),
            BlockKind::UpdateVertex { .. } => Some(VERTEX_VALUES),
            BlockKind::Statement { .. }
            | BlockKind::DropTable { .. }
            | BlockKind::BeginWhile { .. }
            | BlockKind::EndWhile { .. } => None,
        }
    }

    /// Number of descriptors this block stands for, counting nested sub-plans.
    pub fn descriptor_count(&self) -> usize {
        match &self.kind {
            BlockKind::Union(_) => 3,
            _ => 1,
        }
    }
}

/// Table that update-vertex blocks write to.
pub const VERTEX_VALUES: &str = "next";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum BlockKind {
    /// Verbatim SQL statement
    Statement { sql: String },
    CreateTable { table: String, columns: Vec<String> },
    DropTable { table: String },
    Insert { table: String, source: InsertSource },
    SelectInto(SelectInto),
    Union(SelectUnion),
    /// `UPDATE next SET val = value` for the vertices in `context`
    UpdateVertex { context: String, value: String },
    BeginWhile { flag_init: i64, condition: String },
    /// Closes the loop; `artifact` is the relation re-checked for termination
    EndWhile { termination: Termination, artifact: String },
}

/// SHA-256 over the canonical JSON form of `value`.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> String {
    let json = serde_json::to_string(value).expect("IR should always serialize");
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}
