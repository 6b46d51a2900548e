//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a live client connection.
///
/// Generated server-side when a client completes the upgrade. The room
/// registry keys its members by this id, so two handles to the same socket
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Creates a new random ConnectionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConnectionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Name of a broadcast room.
///
/// Rooms are free-form strings chosen by clients and producers. A missing
/// or empty name resolves to [`RoomName::DEFAULT`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    /// Room used when a request does not name one.
    pub const DEFAULT: &'static str = "general";

    /// Creates a room name, falling back to the default room when empty.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            Self::general()
        } else {
            Self(name)
        }
    }

    /// Resolves an optional request parameter into a room name.
    pub fn or_default(name: Option<&str>) -> Self {
        match name {
            Some(n) if !n.is_empty() => Self(n.to_string()),
            _ => Self::general(),
        }
    }

    /// The default `general` room.
    pub fn general() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RoomName {
    fn default() -> Self {
        Self::general()
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
