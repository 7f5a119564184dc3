//! Option dictionary
//!
//! The caller hands over a flat map of option name to raw string. Only the
//! shape of each value is interpreted here; expressions stay opaque text.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vcsql_ir::Termination;

use crate::error::TranslateError;

pub const END: &str = "End";
pub const INITIATE_VAL: &str = "InitiateVal";
pub const INITIAL_MESSAGE: &str = "InitialMessage";
pub const MESSAGE_VAL_TYPE: &str = "MessageValType";
pub const VERTEX_VAL_TYPE: &str = "VertexValType";
pub const COMBINE_MESSAGE: &str = "CombineMessage";
pub const UPDATE_AND_SEND: &str = "UpdateAndSend";

/// `End` value meaning "run until no messages are left".
pub const NO_MESSAGE: &str = "NO_MESSAGE";

/// Marker in `InitialMessage` seeding every vertex.
pub const ALL_VERTICES: &str = "ALL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmOptions {
    #[serde(rename = "End")]
    pub end: String,

    #[serde(rename = "InitiateVal")]
    pub initiate_val: String,

    #[serde(rename = "InitialMessage")]
    pub initial_message: String,

    #[serde(rename = "MessageValType")]
    pub message_val_type: String,

    /// Defaults to `MessageValType`
    #[serde(rename = "VertexValType", default, skip_serializing_if = "Option::is_none")]
    pub vertex_val_type: Option<String>,

    #[serde(rename = "CombineMessage")]
    pub combine_message: String,

    #[serde(rename = "UpdateAndSend")]
    pub update_and_send: String,
}

impl AlgorithmOptions {
    /// Build from a raw option dictionary. Unknown keys are ignored.
    pub fn from_map(options: &HashMap<String, String>) -> Result<Self, TranslateError> {
        let required = |key: &str| {
            options
                .get(key)
                .cloned()
                .ok_or_else(|| TranslateError::MissingOption(key.to_string()))
        };

        Ok(Self {
            end: required(END)?,
            initiate_val: required(INITIATE_VAL)?,
            initial_message: required(INITIAL_MESSAGE)?,
            message_val_type: required(MESSAGE_VAL_TYPE)?,
            vertex_val_type: options.get(VERTEX_VAL_TYPE).cloned(),
            combine_message: required(COMBINE_MESSAGE)?,
            update_and_send: required(UPDATE_AND_SEND)?,
        })
    }

    pub fn vertex_val_type(&self) -> &str {
        self.vertex_val_type
            .as_deref()
            .unwrap_or(&self.message_val_type)
    }

    pub fn initial_value(&self) -> InitialValue {
        InitialValue::parse(&self.initiate_val)
    }

    pub fn termination(&self) -> Result<Termination, TranslateError> {
        let end = self.end.trim();
        if end == NO_MESSAGE {
            return Ok(Termination::NoMessage);
        }

        let invalid = |reason: &str| TranslateError::InvalidOption {
            key: END.to_string(),
            reason: reason.to_string(),
        };
        let (label, args) = split_call(end)
            .ok_or_else(|| invalid("expected NO_MESSAGE or Name(arg, supersteps)"))?;
        let supersteps = args
            .split(',')
            .nth(1)
            .map(str::trim)
            .ok_or_else(|| invalid("missing superstep count"))?;
        let supersteps = supersteps
            .parse::<i64>()
            .map_err(|_| invalid("superstep count must be an integer"))?;

        Ok(Termination::Countdown {
            label: label.to_string(),
            supersteps,
        })
    }

    pub fn initial_message(&self) -> Result<InitialMessage, TranslateError> {
        let text = self.initial_message.trim();
        let args = split_call(text).map(|(_, args)| args).unwrap_or(text);
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();

        match parts.as_slice() {
            [id, value] if !id.is_empty() && !value.is_empty() => {
                if *id == ALL_VERTICES {
                    Ok(InitialMessage::AllVertices {
                        value: value.to_string(),
                    })
                } else {
                    Ok(InitialMessage::Single {
                        id: id.to_string(),
                        value: value.to_string(),
                    })
                }
            }
            _ => Err(TranslateError::InvalidOption {
                key: INITIAL_MESSAGE.to_string(),
                reason: "expected two comma-separated values".to_string(),
            }),
        }
    }

    /// Whether the update-and-send program mentions `table` anywhere.
    pub fn program_mentions(&self, table: &str) -> bool {
        self.update_and_send.contains(table)
    }
}

/// `Name(args)` split into `Name` and the text between the outer parentheses.
fn split_call(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    let close = text.rfind(')')?;
    if close < open {
        return None;
    }
    Some((text[..open].trim(), text[open + 1..close].trim()))
}

/// Initial per-vertex value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialValue {
    IntMax,
    IntMin,
    DblMax,
    DblMin,
    Literal(String),
}

impl InitialValue {
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "INT_MAX" => InitialValue::IntMax,
            "INT_MIN" => InitialValue::IntMin,
            "DBL_MAX" => InitialValue::DblMax,
            "DBL_MIN" => InitialValue::DblMin,
            other => InitialValue::Literal(other.to_string()),
        }
    }

    pub fn as_sql(&self) -> &str {
        match self {
            InitialValue::IntMax => "2147483647",
            InitialValue::IntMin => "-2147483648",
            InitialValue::DblMax => "1.7976931348623157E+308",
            InitialValue::DblMin => "2.2250738585072014E-308",
            InitialValue::Literal(text) => text,
        }
    }
}

/// Messages present before the first superstep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialMessage {
    AllVertices { value: String },
    Single { id: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn complete() -> HashMap<String, String> {
        options(&[
            (END, NO_MESSAGE),
            (INITIATE_VAL, "INT_MAX"),
            (INITIAL_MESSAGE, "Init(1, 0)"),
            (MESSAGE_VAL_TYPE, "int"),
            (COMBINE_MESSAGE, "MIN(message)"),
            (UPDATE_AND_SEND, "setVal(getAggregationVal())"),
        ])
    }

    #[test]
    fn test_from_map_reports_missing_key() {
        let mut map = complete();
        map.remove(COMBINE_MESSAGE);
        let err = AlgorithmOptions::from_map(&map).unwrap_err();
        assert!(matches!(err, TranslateError::MissingOption(key) if key == COMBINE_MESSAGE));
    }

    #[test]
    fn test_vertex_type_defaults_to_message_type() {
        let mut opts = AlgorithmOptions::from_map(&complete()).unwrap();
        assert_eq!(opts.vertex_val_type(), "int");
        opts.vertex_val_type = Some("float8".to_string());
        assert_eq!(opts.vertex_val_type(), "float8");
    }

    #[test]
    fn test_initial_value_sentinels() {
        assert_eq!(InitialValue::parse("INT_MAX").as_sql(), "2147483647");
        assert_eq!(InitialValue::parse("INT_MIN").as_sql(), "-2147483648");
        assert_eq!(InitialValue::parse(" DBL_MAX ").as_sql(), "1.7976931348623157E+308");
        assert_eq!(InitialValue::parse("0.15").as_sql(), "0.15");
    }

    #[test]
    fn test_termination() {
        let mut opts = AlgorithmOptions::from_map(&complete()).unwrap();
        assert_eq!(opts.termination().unwrap(), Termination::NoMessage);

        opts.end = "MAX_SUPERSTEPS(flag, 30)".to_string();
        assert_eq!(
            opts.termination().unwrap(),
            Termination::Countdown { label: "MAX_SUPERSTEPS".to_string(), supersteps: 30 }
        );

        opts.end = "MAX_SUPERSTEPS(30)".to_string();
        assert!(matches!(opts.termination(), Err(TranslateError::InvalidOption { .. })));
    }

    #[test]
    fn test_initial_message_shapes() {
        let mut opts = AlgorithmOptions::from_map(&complete()).unwrap();
        assert_eq!(
            opts.initial_message().unwrap(),
            InitialMessage::Single { id: "1".to_string(), value: "0".to_string() }
        );

        opts.initial_message = "ALL, 1.0".to_string();
        assert_eq!(
            opts.initial_message().unwrap(),
            InitialMessage::AllVertices { value: "1.0".to_string() }
        );

        opts.initial_message = "Init(ALL)".to_string();
        assert!(matches!(opts.initial_message(), Err(TranslateError::InvalidOption { .. })));
    }
}
