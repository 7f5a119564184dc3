//! Iteration controller
//!
//! Lays out the generated program: initial tables, one loop whose body is a
//! single superstep, and the per-iteration cleanup.

use vcsql_ast::qualify_identifier;
use vcsql_ir::{BlockKind, InsertSource, SelectInto, Termination, LOOP_FLAG};

use crate::error::TranslateError;
use crate::lifecycle::BASE_TABLES;
use crate::options::{AlgorithmOptions, InitialMessage};
use crate::scope::DEFAULT_CONTEXT;
use crate::send::{EDGE_TABLE, IN_COUNTS, MESSAGE_TABLE, OUT_COUNTS};
use crate::state::{keys, TranslationState};

const VERTEX_TABLE: &str = BASE_TABLES[0];

/// Tables dropped unconditionally before anything is created.
const INITIAL_DROPS: [(&str, &str); 4] = [
    ("initdropcur", DEFAULT_CONTEXT),
    ("initdropmsg", MESSAGE_TABLE),
    ("initdropnext", vcsql_ast::VALUE_TABLE),
    ("initdropoutcnts", OUT_COUNTS),
];

impl TranslationState {
    /// Create the relations that exist before the first superstep.
    pub fn init(&mut self, options: &AlgorithmOptions) -> Result<(), TranslateError> {
        for (stage, table) in INITIAL_DROPS {
            self.emitter.emit(stage, BlockKind::DropTable { table: table.to_string() });
        }

        let copy = SelectInto {
            attrs: vec![
                "id AS id".to_string(),
                format!(
                    "CAST({} AS {}) AS val",
                    options.initial_value().as_sql(),
                    options.vertex_val_type()
                ),
            ],
            target: Some(vcsql_ast::VALUE_TABLE.to_string()),
            from: vec![VERTEX_TABLE.to_string()],
            predicate: String::new(),
            id_join: false,
            group_by: None,
        };
        self.emitter.emit("copyVertex", BlockKind::SelectInto(copy));
        self.tables.create(vcsql_ast::VALUE_TABLE)?;

        let message_type = &options.message_val_type;
        self.emitter.emit(
            "createMsg",
            BlockKind::CreateTable {
                table: MESSAGE_TABLE.to_string(),
                columns: vec!["id int".to_string(), format!("val {}", message_type)],
            },
        );
        self.tables.create(MESSAGE_TABLE)?;

        let source = match options.initial_message()? {
            InitialMessage::AllVertices { value } => InsertSource::Select {
                attrs: vec!["id".to_string(), format!("CAST({} AS {})", value, message_type)],
                from: VERTEX_TABLE.to_string(),
            },
            InitialMessage::Single { id, value } => InsertSource::Values {
                values: vec![id, format!("CAST({} AS {})", value, message_type)],
            },
        };
        self.emitter.emit(
            "initMsg",
            BlockKind::Insert {
                table: MESSAGE_TABLE.to_string(),
                source,
            },
        );

        if options.program_mentions(IN_COUNTS) {
            self.emitter.emit("initdropincnts", BlockKind::DropTable { table: IN_COUNTS.to_string() });
            self.generate_counts(true)?;
        }
        if options.program_mentions(OUT_COUNTS) {
            self.generate_counts(false)?;
        }
        Ok(())
    }

    /// Per-vertex edge counts: incoming into `in_cnts`, outgoing into `out_cnts`.
    pub fn generate_counts(&mut self, incoming: bool) -> Result<(), TranslateError> {
        let (table, key, counted) = if incoming {
            (IN_COUNTS, "dest", "src")
        } else {
            (OUT_COUNTS, "src", "dest")
        };

        let select = SelectInto {
            attrs: vec![format!("{} AS id", key), format!("COUNT({}) AS cnt", counted)],
            target: Some(table.to_string()),
            from: vec![EDGE_TABLE.to_string()],
            predicate: String::new(),
            id_join: false,
            group_by: Some(key.to_string()),
        };
        self.emitter.emit("genCnt", BlockKind::SelectInto(select));
        self.tables.create(table)
    }

    pub fn begin_while(&mut self, termination: &Termination) {
        self.emitter.emit(
            "beginWhile",
            BlockKind::BeginWhile {
                flag_init: termination.flag_init(),
                condition: format!("{} != 0", LOOP_FLAG),
            },
        );
        self.emitter.enter_loop();
    }

    /// Combine incoming messages, consume them, then run the program body.
    pub fn superstep(&mut self, options: &AlgorithmOptions) -> Result<(), TranslateError> {
        let aggregate = qualify_identifier(&options.combine_message, MESSAGE_TABLE, "val")?;

        let combine = SelectInto {
            attrs: vec![
                format!("{}.id AS id", MESSAGE_TABLE),
                format!("{} AS val", aggregate),
            ],
            target: Some(DEFAULT_CONTEXT.to_string()),
            from: vec![MESSAGE_TABLE.to_string()],
            predicate: String::new(),
            id_join: false,
            group_by: Some("id".to_string()),
        };
        self.emitter.emit("combineMsg", BlockKind::SelectInto(combine));
        self.converted.set(keys::AGG_FUNC, aggregate);
        self.tables.create(DEFAULT_CONTEXT)?;

        self.emitter.emit(
            &format!("drop{}", MESSAGE_TABLE),
            BlockKind::DropTable { table: MESSAGE_TABLE.to_string() },
        );
        self.tables.remove(MESSAGE_TABLE);

        self.run_update_and_send(&options.update_and_send)
    }

    /// Drop this iteration's transient tables and close the loop.
    pub fn end_while(&mut self, termination: Termination) {
        for table in self.tables.drain_transient() {
            self.emitter.emit(&format!("drop{}", table), BlockKind::DropTable { table });
        }
        self.emitter.leave_loop();
        self.emitter.emit(
            "endWhile",
            BlockKind::EndWhile {
                termination,
                artifact: MESSAGE_TABLE.to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::SequentialNames;
    use crate::options::{COMBINE_MESSAGE, END, INITIAL_MESSAGE, INITIATE_VAL, MESSAGE_VAL_TYPE, UPDATE_AND_SEND};
    use std::collections::HashMap;

    fn options(program: &str, initial_message: &str) -> AlgorithmOptions {
        let map: HashMap<String, String> = [
            (END, "NO_MESSAGE"),
            (INITIATE_VAL, "0"),
            (INITIAL_MESSAGE, initial_message),
            (MESSAGE_VAL_TYPE, "float8"),
            (COMBINE_MESSAGE, "SUM(message)"),
            (UPDATE_AND_SEND, program),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        AlgorithmOptions::from_map(&map).unwrap()
    }

    fn stages(state: &TranslationState) -> Vec<&str> {
        state.emitter.blocks().iter().map(|b| b.stage.as_str()).collect()
    }

    #[test]
    fn test_init_seeds_every_vertex() {
        let mut state = TranslationState::new(Box::new(SequentialNames::default()));
        state.init(&options("send(out, getVal())", "ALL, 1.0")).unwrap();

        assert_eq!(
            stages(&state),
            vec!["initdropcur", "initdropmsg", "initdropnext", "initdropoutcnts", "copyVertex", "createMsg", "initMsg"]
        );
        match &state.emitter.blocks()[6].kind {
            BlockKind::Insert { table, source: InsertSource::Select { attrs, from } } => {
                assert_eq!(table, "message");
                assert_eq!(attrs[1], "CAST(1.0 AS float8)");
                assert_eq!(from, "vertex");
            }
            other => panic!("expected insert-select, got {:?}", other),
        }
        assert_eq!(state.tables.tables(), ["next", "message"]);
    }

    #[test]
    fn test_init_generates_mentioned_counts() {
        let mut state = TranslationState::new(Box::new(SequentialNames::default()));
        state
            .init(&options("send(out, getVal() / out_cnts.cnt + in_cnts.cnt)", "Init(1, 0)"))
            .unwrap();

        let tail: Vec<_> = stages(&state)[7..].to_vec();
        assert_eq!(tail, vec!["initdropincnts", "genCnt", "genCnt"]);
        assert_eq!(state.emitter.blocks()[8].target_table(), Some("in_cnts"));
        assert_eq!(state.emitter.blocks()[9].target_table(), Some("out_cnts"));
        match &state.emitter.blocks()[8].kind {
            BlockKind::SelectInto(select) => {
                assert_eq!(select.attrs, vec!["dest AS id", "COUNT(src) AS cnt"]);
                assert_eq!(select.group_by.as_deref(), Some("dest"));
            }
            other => panic!("expected select-into, got {:?}", other),
        }
    }

    #[test]
    fn test_superstep_combines_and_consumes_messages() {
        let mut state = TranslationState::new(Box::new(SequentialNames::default()));
        let opts = options("setVal(getAggregationVal())", "Init(1, 0)");
        state.init(&opts).unwrap();
        state.begin_while(&Termination::NoMessage);
        state.superstep(&opts).unwrap();

        let combine = state.emitter.blocks().iter().find(|b| b.stage == "combineMsg").unwrap();
        assert_eq!(combine.depth, 1);
        match &combine.kind {
            BlockKind::SelectInto(select) => {
                assert_eq!(select.attrs, vec!["message.id AS id", "SUM(message.val) AS val"]);
                assert_eq!(select.target.as_deref(), Some("cur"));
                assert_eq!(select.group_by.as_deref(), Some("id"));
            }
            other => panic!("expected select-into, got {:?}", other),
        }
        assert_eq!(state.converted.get(keys::AGG_FUNC), Some("SUM(message.val)"));
        assert!(!state.tables.contains("message"));
        assert!(state.tables.contains("cur"));
    }

    #[test]
    fn test_end_while_drains_transient_tables() {
        let mut state = TranslationState::new(Box::new(SequentialNames::default()));
        let opts = options("changed = getAggregationVal() < getVal()\nsend(out, getVal())", "Init(1, 0)");
        state.init(&opts).unwrap();
        state.begin_while(&Termination::NoMessage);
        state.superstep(&opts).unwrap();
        state.end_while(Termination::NoMessage);

        let stages = stages(&state);
        assert_eq!(stages[stages.len() - 3..], ["dropcur", "dropchanged", "endWhile"]);
        assert_eq!(state.emitter.blocks().last().unwrap().depth, 0);
        assert_eq!(state.tables.tables(), ["next", "message"]);
    }
}
