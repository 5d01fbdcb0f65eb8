//! The fixed-shape status record produced for a node on every successful fetch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bytes of proof-of-space storage per space unit, in GiB.
pub const GIB_PER_SPACE_UNIT: u64 = 64;

/// Metrics reported by one node.
///
/// A record is produced fresh each cycle and never mutated; the display keeps
/// its own rendered copy of the values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub name: String,
    pub version: String,
    pub host: String,
    pub connected_peers: u64,
    pub synced: bool,
    pub top_layer: u32,
    pub verified_layer: u32,
    pub synced_layer: u32,
    pub smeshing: bool,
    pub post_state: PostState,
    pub space_units: u32,
    pub size_gib: u64,
    pub assigned_layers_count: u32,
}

/// Proof-of-space setup state as reported by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum PostState {
    #[serde(rename = "STATE_NOT_STARTED")]
    NotStarted,
    #[serde(rename = "STATE_PREPARED")]
    Prepared,
    #[serde(rename = "STATE_IN_PROGRESS")]
    InProgress,
    #[serde(rename = "STATE_STOPPED")]
    Stopped,
    #[serde(rename = "STATE_COMPLETE")]
    Complete,
    #[serde(rename = "STATE_ERROR")]
    Error,
    #[default]
    #[serde(rename = "STATE_UNSPECIFIED")]
    Unspecified,
}

impl PostState {
    /// Short label for the table.
    pub fn label(&self) -> &'static str {
        match self {
            PostState::NotStarted => "Not started",
            PostState::Prepared => "Prepared",
            PostState::InProgress => "In progress",
            PostState::Stopped => "Stopped",
            PostState::Complete => "Complete",
            PostState::Error => "Error",
            PostState::Unspecified => "Unknown",
        }
    }
}

impl From<String> for PostState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "STATE_NOT_STARTED" => PostState::NotStarted,
            "STATE_PREPARED" => PostState::Prepared,
            "STATE_IN_PROGRESS" => PostState::InProgress,
            "STATE_STOPPED" => PostState::Stopped,
            "STATE_COMPLETE" => PostState::Complete,
            "STATE_ERROR" => PostState::Error,
            _ => PostState::Unspecified,
        }
    }
}

impl fmt::Display for PostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Total proof-of-space size for a number of space units.
pub fn size_gib(space_units: u32) -> u64 {
    u64::from(space_units) * GIB_PER_SPACE_UNIT
}
