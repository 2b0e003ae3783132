//! Clip records and role definitions.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a clip, stable for the clip's lifetime.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    /// Generate a new random clip ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Narrative position of a clip inside a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClipRole {
    /// Opener
    Hook,
    /// Supporting content
    SellingPoint,
    /// Closer
    Cta,
}

impl ClipRole {
    /// All roles, in sequence order.
    pub const ALL: &'static [ClipRole] = &[ClipRole::Hook, ClipRole::SellingPoint, ClipRole::Cta];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClipRole::Hook => "hook",
            ClipRole::SellingPoint => "selling_point",
            ClipRole::Cta => "cta",
        }
    }
}

impl fmt::Display for ClipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClipRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hook" => Ok(ClipRole::Hook),
            "selling_point" | "selling-point" | "sellingpoint" | "point" => {
                Ok(ClipRole::SellingPoint)
            }
            "cta" => Ok(ClipRole::Cta),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown clip role: {0}")]
pub struct ParseRoleError(String);

/// Opaque reference to a clip's binary payload.
///
/// The payload itself is owned by a payload store; the registry only keeps
/// this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PayloadHandle(pub String);

impl PayloadHandle {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PayloadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A classified content unit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    /// Unique clip identifier
    pub id: ClipId,
    /// Display label derived from the original filename
    pub name: String,
    /// Duration in seconds (never negative)
    pub duration: f64,
    /// Narrative role
    pub role: ClipRole,
    /// Binary payload, if one has been attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<PayloadHandle>,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

impl Clip {
    /// Create a new clip with a fresh ID and no payload.
    ///
    /// Negative or non-finite durations are clamped to zero.
    pub fn new(name: impl Into<String>, duration: f64, role: ClipRole) -> Self {
        Self {
            id: ClipId::new(),
            name: name.into(),
            duration: sanitize_duration(duration),
            role,
            payload: None,
            created_at: Utc::now(),
        }
    }

    /// Use an explicit ID instead of a generated one.
    pub fn with_id(mut self, id: ClipId) -> Self {
        self.id = id;
        self
    }

    /// Attach a payload handle.
    pub fn with_payload(mut self, payload: PayloadHandle) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Reassign the clip's role.
    pub fn set_role(&mut self, role: ClipRole) {
        self.role = role;
    }

    pub fn is_role(&self, role: ClipRole) -> bool {
        self.role == role
    }

    /// Lowercase filename extension of the display name, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(|e| e.to_lowercase())
    }
}

fn sanitize_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("hook".parse::<ClipRole>().unwrap(), ClipRole::Hook);
        assert_eq!("CTA".parse::<ClipRole>().unwrap(), ClipRole::Cta);
        assert_eq!(
            "selling-point".parse::<ClipRole>().unwrap(),
            ClipRole::SellingPoint
        );
        assert!("outro".parse::<ClipRole>().is_err());
    }

    #[test]
    fn test_role_serde_names() {
        let json = serde_json::to_string(&ClipRole::SellingPoint).unwrap();
        assert_eq!(json, "\"selling_point\"");
        let back: ClipRole = serde_json::from_str("\"cta\"").unwrap();
        assert_eq!(back, ClipRole::Cta);
    }

    #[test]
    fn test_negative_duration_clamped() {
        assert_eq!(Clip::new("a.mp4", -3.0, ClipRole::Hook).duration, 0.0);
        assert_eq!(Clip::new("a.mp4", f64::NAN, ClipRole::Hook).duration, 0.0);
        assert_eq!(Clip::new("a.mp4", 2.5, ClipRole::Hook).duration, 2.5);
    }

    #[test]
    fn test_extension() {
        assert_eq!(
            Clip::new("Hook.MOV", 1.0, ClipRole::Hook).extension().as_deref(),
            Some("mov")
        );
        assert_eq!(Clip::new("noext", 1.0, ClipRole::Hook).extension(), None);
    }

    #[test]
    fn test_clip_ids_are_unique() {
        let a = Clip::new("a.mp4", 1.0, ClipRole::Hook);
        let b = Clip::new("a.mp4", 1.0, ClipRole::Hook);
        assert_ne!(a.id, b.id);
    }
}
