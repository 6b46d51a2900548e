//! Request and response types for the notify endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::relay::{RoomEvent, WellKnownEvent};

/// Optional overrides carried in a notify request body.
///
/// The body is parsed leniently: an empty body, invalid JSON, or a JSON
/// value that is not an object all mean "no overrides". Fields of the wrong
/// type are ignored individually.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotifyOverrides {
    /// Replaces the default event name when non-blank.
    pub event: Option<String>,
    /// Replaces the default message, even when empty.
    pub message: Option<String>,
    /// Attached verbatim as `data`. Taken from `data`, else `payload`.
    pub data: Option<Value>,
}

impl NotifyOverrides {
    pub fn parse(body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::default();
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Self::from_fields(fields),
            Ok(_) => Self::default(),
            Err(e) => {
                tracing::debug!("Ignoring unparseable notify body: {}", e);
                Self::default()
            }
        }
    }

    fn from_fields(mut fields: Map<String, Value>) -> Self {
        let event = match fields.get("event") {
            Some(Value::String(name)) if !name.trim().is_empty() => Some(name.clone()),
            _ => None,
        };
        let message = match fields.get("message") {
            Some(Value::String(text)) => Some(text.clone()),
            _ => None,
        };
        let data = fields.remove("data").or_else(|| fields.remove("payload"));

        Self {
            event,
            message,
            data,
        }
    }

    /// Build the event to broadcast, starting from the `new_report` default.
    pub fn into_event(self) -> RoomEvent {
        let default = WellKnownEvent::NewReport;
        let event = RoomEvent::new(
            self.event.unwrap_or_else(|| default.name().to_string()),
            self.message.unwrap_or_else(|| default.message().to_string()),
        );

        match self.data {
            Some(data) => event.with_data(data),
            None => event,
        }
    }
}

/// Successful notify response: `{"status": "ok", "room": "<room>"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotifyResponse {
    pub status: String,
    pub room: String,
}

impl NotifyResponse {
    pub fn ok(room: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            room: room.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event_for(body: &str) -> Value {
        let event = NotifyOverrides::parse(body.as_bytes()).into_event();
        serde_json::to_value(event).unwrap()
    }

    #[test]
    fn empty_body_yields_default_event() {
        assert_eq!(
            event_for(""),
            json!({"event": "new_report", "message": "Se ha creado un nuevo reporte"})
        );
    }

    #[test]
    fn invalid_or_non_object_body_is_ignored() {
        let default = event_for("");
        assert_eq!(event_for("{not json"), default);
        assert_eq!(event_for("[1,2,3]"), default);
        assert_eq!(event_for("\"text\""), default);
    }

    #[test]
    fn overrides_event_message_and_data() {
        assert_eq!(
            event_for(r#"{"event":"report_closed","message":"done","data":{"id":3}}"#),
            json!({"event": "report_closed", "message": "done", "data": {"id": 3}})
        );
    }

    #[test]
    fn blank_event_keeps_default_but_empty_message_is_used() {
        assert_eq!(
            event_for(r#"{"event":"  ","message":""}"#),
            json!({"event": "new_report", "message": ""})
        );
    }

    #[test]
    fn wrong_typed_fields_are_ignored() {
        assert_eq!(
            event_for(r#"{"event":5,"message":{"x":1}}"#),
            json!({"event": "new_report", "message": "Se ha creado un nuevo reporte"})
        );
    }

    #[test]
    fn payload_is_used_when_data_is_absent() {
        assert_eq!(event_for(r#"{"payload":[1,2]}"#)["data"], json!([1, 2]));
    }

    #[test]
    fn data_wins_over_payload_even_when_null() {
        let event = event_for(r#"{"data":null,"payload":[1,2]}"#);
        assert_eq!(event["data"], Value::Null);
        assert!(event.as_object().unwrap().contains_key("data"));
    }

    #[test]
    fn notify_response_shape() {
        assert_eq!(
            serde_json::to_value(NotifyResponse::ok("ops")).unwrap(),
            json!({"status": "ok", "room": "ops"})
        );
    }
}
