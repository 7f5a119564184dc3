//! Payload types shared by block descriptors

use serde::{Deserialize, Serialize};

/// Name of the loop variable declared by the generated program.
pub const LOOP_FLAG: &str = "flag";

/// Set operator combining the two sub-plans of a union select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetOperator {
    Union,
    UnionAll,
}

impl SetOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SetOperator::Union => "UNION",
            SetOperator::UnionAll => "UNION ALL",
        }
    }
}

/// Rows written by an insert descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InsertSource {
    /// `INSERT INTO t SELECT attrs FROM from`
    Select { attrs: Vec<String>, from: String },
    /// `INSERT INTO t VALUES (values)`
    Values { values: Vec<String> },
}

/// When the generated loop stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Termination {
    /// Loop while the message relation still has rows.
    NoMessage,
    /// Loop a fixed number of supersteps.
    Countdown { label: String, supersteps: i64 },
}

impl Termination {
    /// Initial value of the loop flag.
    pub fn flag_init(&self) -> i64 {
        match self {
            Termination::NoMessage => -1,
            Termination::Countdown { supersteps, .. } => *supersteps,
        }
    }
}

/// `SELECT attrs [INTO target] FROM from WHERE predicate [GROUP BY group_by]`
///
/// With `id_join` set, every vertex-keyed table of `from` is joined on `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectInto {
    pub attrs: Vec<String>,
    pub target: Option<String>,
    pub from: Vec<String>,
    #[serde(default)]
    pub predicate: String,
    pub id_join: bool,
    pub group_by: Option<String>,
}

/// A nested, anonymous select feeding a union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubPlan {
    pub stage: String,
    pub depth: usize,
    pub select: SelectInto,
}

/// `SELECT attrs INTO target FROM (lhs <op> rhs)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectUnion {
    pub attrs: Vec<String>,
    pub target: String,
    pub lhs: Box<SubPlan>,
    pub rhs: Box<SubPlan>,
    pub op: SetOperator,
}
