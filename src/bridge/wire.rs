//! Wire shapes: what goes in, what comes back.

use serde::Serialize;
use serde_json::Value;

use crate::core::action::{Effect, Outcome};
use crate::core::error::{ErrorKind, NavigationError};
use crate::core::registry::ComponentSnapshot;
use crate::core::types::{ComponentId, PopResult, PushResult};

// ============================================================================
// Results
// ============================================================================

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum CommandResult {
    /// `create`, `setRoot`, `present`, `dismiss`
    Id { id: ComponentId },
    Pushed(PushResult),
    Popped(PopResult),
    /// `get`
    Snapshot(ComponentSnapshot),
    /// Commands with nothing to report: `{}`
    Empty {},
}

impl From<Outcome> for CommandResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Created { id }
            | Outcome::RootSet { id }
            | Outcome::Presented { id }
            | Outcome::Dismissed { id } => CommandResult::Id { id },
            Outcome::Pushed(result) => CommandResult::Pushed(result),
            Outcome::Popped(result) => CommandResult::Popped(result),
            Outcome::Done => CommandResult::Empty {},
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&NavigationError> for ErrorPayload {
    fn from(error: &NavigationError) -> Self {
        // Internal details stay in the log.
        let message = if error.is_internal() {
            "invalid state: navigation state is inconsistent".to_string()
        } else {
            error.to_string()
        };
        ErrorPayload {
            kind: error.kind(),
            message,
            field: error.field().map(str::to_string),
        }
    }
}

// ============================================================================
// Lines
// ============================================================================

/// One inbound command line: `{"call": <any>, "command": "...", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Opaque correlation value, echoed back untouched.
    pub call: Value,
    pub command: String,
    pub payload: Value,
}

impl Call {
    /// Parses a line. When it cannot be used, the error comes back with
    /// whatever `call` value could be recovered so the reply still
    /// correlates.
    pub fn parse(line: &str) -> Result<Call, (Value, NavigationError)> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| (Value::Null, NavigationError::invalid("line", e)))?;
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => return Err((Value::Null, NavigationError::invalid("line", other))),
        };

        let call = obj.remove("call").unwrap_or(Value::Null);
        let command = match obj.remove("command") {
            Some(Value::String(command)) => command,
            None | Some(Value::Null) => {
                return Err((call, NavigationError::missing("command")));
            }
            Some(other) => return Err((call, NavigationError::invalid("command", other))),
        };
        let payload = obj.remove("payload").unwrap_or(Value::Null);

        Ok(Call {
            call,
            command,
            payload,
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Reply {
    Result { call: Value, result: CommandResult },
    Error { call: Value, error: ErrorPayload },
}

impl Reply {
    pub fn new(call: Value, outcome: Result<CommandResult, ErrorPayload>) -> Self {
        match outcome {
            Ok(result) => Reply::Result { call, result },
            Err(error) => Reply::Error { call, error },
        }
    }
}

/// A render effect echoed to the caller: `{"event": {...}}`.
#[derive(Serialize, Debug)]
pub struct EventLine<'a> {
    pub event: &'a Effect,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_shapes() {
        let id = serde_json::to_value(CommandResult::Id { id: "a".into() }).unwrap();
        assert_eq!(id, json!({ "id": "a" }));

        let empty = serde_json::to_value(CommandResult::from(Outcome::Done)).unwrap();
        assert_eq!(empty, json!({}));

        let popped = serde_json::to_value(CommandResult::Popped(PopResult {
            stack: "s".into(),
            id: None,
            count: 0,
        }))
        .unwrap();
        assert_eq!(popped, json!({ "stack": "s", "count": 0 }));
    }

    #[test]
    fn test_error_payload_carries_field() {
        let payload = ErrorPayload::from(&NavigationError::missing("tabs[1].path"));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "MissingParameter");
        assert_eq!(json["field"], "tabs[1].path");
        assert_eq!(json["message"], "missing parameter: tabs[1].path");
    }

    #[test]
    fn test_error_payload_hides_internals() {
        let payload = ErrorPayload::from(&NavigationError::internal("x has view y as its parent"));
        assert_eq!(payload.kind, ErrorKind::InvalidState);
        assert!(!payload.message.contains("view y"));
        assert!(payload.field.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("field").is_none());
    }

    #[test]
    fn test_parse_call() {
        let call = Call::parse(r#"{"call": 7, "command": "pop", "payload": {"count": 2}}"#).unwrap();
        assert_eq!(call.call, json!(7));
        assert_eq!(call.command, "pop");
        assert_eq!(call.payload, json!({ "count": 2 }));

        let bare = Call::parse(r#"{"command": "reset"}"#).unwrap();
        assert!(bare.call.is_null());
        assert!(bare.payload.is_null());
    }

    #[test]
    fn test_parse_call_errors_keep_call_id() {
        let (call, err) = Call::parse(r#"{"call": "c1", "payload": {}}"#).unwrap_err();
        assert_eq!(call, json!("c1"));
        assert_eq!(err, NavigationError::missing("command"));

        let (call, err) = Call::parse(r#"{"call": "c2", "command": 5}"#).unwrap_err();
        assert_eq!(call, json!("c2"));
        assert_eq!(err, NavigationError::invalid("command", 5));

        let (call, err) = Call::parse("not json").unwrap_err();
        assert!(call.is_null());
        assert_eq!(err.field(), Some("line"));
    }

    #[test]
    fn test_reply_shapes() {
        let ok = Reply::new(json!(1), Ok(CommandResult::Empty {}));
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({ "call": 1, "result": {} }));

        let err = Reply::new(
            json!(2),
            Err(ErrorPayload::from(&NavigationError::not_found("ghost"))),
        );
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["call"], 2);
        assert_eq!(json["error"]["kind"], "NotFound");
    }
}
