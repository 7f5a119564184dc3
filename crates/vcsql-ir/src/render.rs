//! PL/pgSQL renderer for block sequences
//!
//! The whole sequence becomes one anonymous `DO` block. Loop flags are
//! hoisted into its `DECLARE` section; everything else renders in place,
//! indented by descriptor depth.

use thiserror::Error;

use crate::{Block, BlockKind, InsertSource, SelectInto, SelectUnion, Termination, LOOP_FLAG, VERTEX_VALUES};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Loop end without matching loop begin (stage {stage})")]
    UnbalancedLoop { stage: String },

    #[error("Loop opened but never closed")]
    UnclosedLoop,

    #[error("Top-level select has no target table (stage {stage})")]
    AnonymousSelect { stage: String },
}

/// Edge relation; every other relation is keyed by vertex id.
const EDGE_TABLE: &str = "edge";

const INDENT: &str = "    ";

/// Render a block sequence into a single executable program.
pub fn render(blocks: &[Block]) -> Result<String, RenderError> {
    let mut declarations = Vec::new();
    let mut body = Vec::new();
    let mut open_loops = 0usize;

    for block in blocks {
        let indent = INDENT.repeat(block.depth + 1);
        match &block.kind {
            BlockKind::Statement { sql } => body.push(format!("{}{}", indent, sql)),
            BlockKind::CreateTable { table, columns } => {
                body.push(format!("{}CREATE TABLE {} ({});", indent, table, columns.join(", ")));
            }
            BlockKind::DropTable { table } => {
                body.push(format!("{}DROP TABLE IF EXISTS {};", indent, table));
            }
            BlockKind::Insert { table, source } => {
                let rows = match source {
                    InsertSource::Select { attrs, from } => {
                        format!("SELECT {} FROM {}", attrs.join(", "), from)
                    }
                    InsertSource::Values { values } => format!("VALUES ({})", values.join(", ")),
                };
                body.push(format!("{}INSERT INTO {} {};", indent, table, rows));
            }
            BlockKind::SelectInto(select) => {
                let target = select.target.as_deref().ok_or_else(|| RenderError::AnonymousSelect {
                    stage: block.stage.clone(),
                })?;
                body.push(format!("{}CREATE TABLE {} AS {};", indent, target, render_select(select)));
            }
            BlockKind::Union(union) => body.push(render_union(union, &indent)),
            BlockKind::UpdateVertex { context, value } => {
                body.push(format!(
                    "{}UPDATE {vertex} SET val = {} FROM {ctx} WHERE {vertex}.id = {ctx}.id;",
                    indent,
                    value,
                    vertex = VERTEX_VALUES,
                    ctx = context,
                ));
            }
            BlockKind::BeginWhile { flag_init, condition } => {
                let declaration = format!("{} integer := {};", LOOP_FLAG, flag_init);
                if !declarations.contains(&declaration) {
                    declarations.push(declaration);
                }
                body.push(format!("{}WHILE {} LOOP", indent, condition));
                open_loops += 1;
            }
            BlockKind::EndWhile { termination, artifact } => {
                if open_loops == 0 {
                    return Err(RenderError::UnbalancedLoop {
                        stage: block.stage.clone(),
                    });
                }
                open_loops -= 1;
                let inner = INDENT.repeat(block.depth + 2);
                let update = match termination {
                    Termination::NoMessage => {
                        format!("SELECT COUNT(*) INTO {} FROM {};", LOOP_FLAG, artifact)
                    }
                    Termination::Countdown { .. } => format!("{0} := {0} - 1;", LOOP_FLAG),
                };
                body.push(format!("{}{}", inner, update));
                body.push(format!("{}END LOOP;", indent));
            }
        }
    }

    if open_loops != 0 {
        return Err(RenderError::UnclosedLoop);
    }

    let mut out = String::from("DO $$\n");
    if !declarations.is_empty() {
        out.push_str("DECLARE\n");
        for declaration in &declarations {
            out.push_str(INDENT);
            out.push_str(declaration);
            out.push('\n');
        }
    }
    out.push_str("BEGIN\n");
    for line in &body {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("END $$;\n");

    Ok(out)
}

/// `SELECT ... FROM ... [WHERE ...] [GROUP BY ...]` without a target.
pub(crate) fn render_select(select: &SelectInto) -> String {
    let mut sql = format!("SELECT {}", select.attrs.join(", "));
    if !select.from.is_empty() {
        sql.push_str(" FROM ");
        sql.push_str(&select.from.join(", "));
    }

    let mut conditions = Vec::new();
    if select.id_join {
        let mut keyed = select.from.iter().filter(|t| t.as_str() != EDGE_TABLE);
        if let Some(first) = keyed.next() {
            for other in keyed {
                conditions.push(format!("{}.id = {}.id", first, other));
            }
        }
    }
    if !select.predicate.trim().is_empty() {
        conditions.push(select.predicate.trim().to_string());
    }
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    if let Some(group_by) = &select.group_by {
        sql.push_str(" GROUP BY ");
        sql.push_str(group_by);
    }

    sql
}

fn render_union(union: &SelectUnion, indent: &str) -> String {
    let nested = |depth: usize| INDENT.repeat(depth + 1);
    format!(
        "{indent}CREATE TABLE {} AS SELECT {} FROM (\n{}{}\n{}{}\n{}{}\n{indent}) AS combined;",
        union.target,
        union.attrs.join(", "),
        nested(union.lhs.depth),
        render_select(&union.lhs.select),
        nested(union.lhs.depth),
        union.op.as_sql(),
        nested(union.rhs.depth),
        render_select(&union.rhs.select),
        indent = indent,
    )
}
