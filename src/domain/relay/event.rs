//! Room event wire types.
//!
//! Defines what travels through a room:
//! - [`RoomEvent`] - structured `{event, message, data?}` notification
//! - [`WellKnownEvent`] - client shorthands expanded into a `RoomEvent`
//! - [`BroadcastMessage`] - an immutable (room, payload) pair queued for fan-out

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::RoomName;

/// Structured notification delivered to every member of a room.
///
/// Serialized as UTF-8 JSON with no envelope versioning:
/// `{"event": "<name>", "message": "<text>"}` plus an optional `data` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomEvent {
    pub event: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RoomEvent {
    /// Creates an event without auxiliary data.
    pub fn new(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Attaches an auxiliary payload, carried verbatim.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Encodes the event as the JSON frame sent to clients.
    pub fn to_payload(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}

/// Shorthand tokens a client may send instead of a full JSON event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownEvent {
    NewReport,
    UpdateReport,
    CommentAdded,
}

impl WellKnownEvent {
    /// All recognized shorthands.
    pub const ALL: [WellKnownEvent; 3] = [
        WellKnownEvent::NewReport,
        WellKnownEvent::UpdateReport,
        WellKnownEvent::CommentAdded,
    ];

    /// Matches a frame payload that is exactly one of the shorthand tokens.
    pub fn from_frame(payload: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name().as_bytes() == payload)
    }

    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            WellKnownEvent::NewReport => "new_report",
            WellKnownEvent::UpdateReport => "update_report",
            WellKnownEvent::CommentAdded => "comment_added",
        }
    }

    /// Fixed human-readable message for the event.
    pub fn message(&self) -> &'static str {
        match self {
            WellKnownEvent::NewReport => "Se ha creado un nuevo reporte",
            WellKnownEvent::UpdateReport => "Se ha actualizado un reporte",
            WellKnownEvent::CommentAdded => "Se agregó un comentario al reporte",
        }
    }

    pub fn to_event(self) -> RoomEvent {
        RoomEvent::new(self.name(), self.message())
    }
}

/// A client frame after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// The frame was a shorthand token and is re-emitted as a structured event.
    Event(WellKnownEvent),
    /// Anything else is relayed verbatim.
    Raw(Bytes),
}

impl InboundFrame {
    /// Classifies a client frame payload.
    pub fn classify(payload: Bytes) -> Self {
        match WellKnownEvent::from_frame(&payload) {
            Some(event) => InboundFrame::Event(event),
            None => InboundFrame::Raw(payload),
        }
    }

    /// Bytes to broadcast to the sender's room.
    pub fn into_payload(self) -> Result<Bytes, serde_json::Error> {
        match self {
            InboundFrame::Event(event) => event.to_event().to_payload(),
            InboundFrame::Raw(payload) => Ok(payload),
        }
    }
}

/// Immutable (room, payload) pair from enqueue to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    pub room: RoomName,
    pub payload: Bytes,
}

impl BroadcastMessage {
    pub fn new(room: RoomName, payload: impl Into<Bytes>) -> Self {
        Self {
            room,
            payload: payload.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn room_event_serializes_without_data() {
        let payload = RoomEvent::new("update_report", "x").to_payload().unwrap();
        let value: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(value, json!({"event": "update_report", "message": "x"}));
    }

    #[test]
    fn room_event_serializes_data_verbatim() {
        let event = RoomEvent::new("new_report", "m").with_data(json!({"report_id": 7}));
        let value: Value = serde_json::from_slice(&event.to_payload().unwrap()).unwrap();
        assert_eq!(value["data"], json!({"report_id": 7}));
    }

    #[test]
    fn explicit_null_data_is_kept() {
        let event = RoomEvent::new("new_report", "m").with_data(Value::Null);
        let value: Value = serde_json::from_slice(&event.to_payload().unwrap()).unwrap();
        assert!(value.as_object().unwrap().contains_key("data"));
    }

    #[test]
    fn shorthand_tokens_are_recognized() {
        assert_eq!(
            WellKnownEvent::from_frame(b"new_report"),
            Some(WellKnownEvent::NewReport)
        );
        assert_eq!(
            WellKnownEvent::from_frame(b"update_report"),
            Some(WellKnownEvent::UpdateReport)
        );
        assert_eq!(
            WellKnownEvent::from_frame(b"comment_added"),
            Some(WellKnownEvent::CommentAdded)
        );
    }

    #[test]
    fn shorthand_match_is_exact() {
        assert_eq!(WellKnownEvent::from_frame(b"new_report "), None);
        assert_eq!(WellKnownEvent::from_frame(b"NEW_REPORT"), None);
        assert_eq!(WellKnownEvent::from_frame(b""), None);
    }

    #[test]
    fn classify_expands_shorthand_into_structured_event() {
        let payload = InboundFrame::classify(Bytes::from_static(b"new_report"))
            .into_payload()
            .unwrap();
        let value: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(
            value,
            json!({"event": "new_report", "message": "Se ha creado un nuevo reporte"})
        );
    }

    #[test]
    fn classify_passes_other_payloads_through() {
        let raw = Bytes::from_static(br#"{"hello":"world"}"#);
        let frame = InboundFrame::classify(raw.clone());
        assert_eq!(frame, InboundFrame::Raw(raw.clone()));
        assert_eq!(frame.into_payload().unwrap(), raw);
    }
}
