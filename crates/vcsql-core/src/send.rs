//! `send(direction, content)` statements
//!
//! Messages travel along the `edge(src, dest)` relation. The plan selects the
//! edges leaving (or entering) the vertices in scope and writes one message
//! row per recipient into `message`, which the next superstep combines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vcsql_ir::{BlockKind, SelectInto, SelectUnion, SetOperator};

use crate::error::TranslateError;
use crate::resolve::referenced_tables;
use crate::state::{keys, TranslationState};

pub const MESSAGE_TABLE: &str = "message";
pub const EDGE_TABLE: &str = "edge";
pub const IN_COUNTS: &str = "in_cnts";
pub const OUT_COUNTS: &str = "out_cnts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Recipients are the sources of edges entering the sender.
    In,
    /// Recipients are the destinations of edges leaving the sender.
    Out,
    /// Both of the above.
    All,
    /// No message is produced.
    No,
}

impl FromStr for Direction {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            "all" => Ok(Direction::All),
            "no" => Ok(Direction::No),
            other => Err(TranslateError::UnknownDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::All => "all",
            Direction::No => "no",
        };
        f.write_str(s)
    }
}

/// Edge columns for a single-direction pattern: (recipient, sender).
fn endpoints(direction: Direction) -> (&'static str, &'static str) {
    match direction {
        Direction::In => ("src", "dest"),
        _ => ("dest", "src"),
    }
}

/// Shared pieces of every select a send statement produces.
struct SendPlan<'a> {
    content: &'a str,
    context: &'a str,
    from: Vec<String>,
    degree_join: String,
}

impl SendPlan<'_> {
    fn pattern(&self, direction: Direction, target: Option<&str>) -> SelectInto {
        let (recipient, sender) = endpoints(direction);
        SelectInto {
            attrs: vec![
                format!("{}.{} AS id", EDGE_TABLE, recipient),
                format!("{} AS val", self.content),
            ],
            target: target.map(str::to_string),
            from: self.from.clone(),
            predicate: format!(
                "{}.{} = {}.id{}",
                EDGE_TABLE, sender, self.context, self.degree_join
            ),
            id_join: true,
            group_by: Some(recipient.to_string()),
        }
    }
}

impl TranslationState {
    /// Plan the message relation produced by one send statement.
    ///
    /// `content` must already have its placeholders rewritten.
    pub fn plan_send(&mut self, direction: Direction, content: &str) -> Result<(), TranslateError> {
        let context = self.scope.current().to_string();

        let referenced = referenced_tables(content)?;
        self.check_references(&referenced)?;
        self.senders.extend(referenced.iter().cloned());

        let mut from = referenced;
        if !from.contains(&context) {
            from.push(context.clone());
        }
        from.push(EDGE_TABLE.to_string());

        let mut degree_join = String::new();
        for counts in [OUT_COUNTS, IN_COUNTS] {
            if content.contains(counts) {
                if !from.iter().any(|t| t == counts) {
                    from.push(counts.to_string());
                }
                degree_join.push_str(&format!(" AND {}.id = {}.id", counts, context));
            }
        }

        let plan = SendPlan {
            content,
            context: &context,
            from,
            degree_join,
        };

        match direction {
            Direction::In | Direction::Out => {
                let select = plan.pattern(direction, Some(MESSAGE_TABLE));
                self.emitter.emit("sendMsg", BlockKind::SelectInto(select));
            }
            Direction::All => {
                let lhs = self.emitter.sub_plan("genMsg0", plan.pattern(Direction::In, None));
                let rhs = self.emitter.sub_plan("genMsg1", plan.pattern(Direction::Out, None));
                let union = SelectUnion {
                    attrs: vec!["*".to_string()],
                    target: MESSAGE_TABLE.to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    op: SetOperator::UnionAll,
                };
                self.emitter.emit("sendMsg", BlockKind::Union(union));
            }
            Direction::No => {}
        }

        // Registered for every direction so `message` is always droppable downstream.
        self.tables.create(MESSAGE_TABLE)?;
        self.converted.set(keys::CONTENT_STR, content);
        Ok(())
    }
}
