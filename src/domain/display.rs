// Display state - The externally observable result of a poll cycle
use chrono::{DateTime, Local};
use serde::Serialize;

pub const LOADING_LABEL: &str = "...";
pub const LOADING_TOOLTIP: &str = "Click to refresh";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayKind {
    Loading,
    Ok,
    ConfigError,
    TransportError,
    EmptyResponse,
    DataError,
}

impl DisplayKind {
    pub fn is_error(&self) -> bool {
        !matches!(self, DisplayKind::Loading | DisplayKind::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub kind: DisplayKind,
    pub label: String,
    pub tooltip: String,
    pub last_update: Option<DateTime<Local>>,
}

impl DisplayState {
    pub fn loading() -> Self {
        Self {
            kind: DisplayKind::Loading,
            label: LOADING_LABEL.to_string(),
            tooltip: LOADING_TOOLTIP.to_string(),
            last_update: None,
        }
    }

    pub fn ok(label: String, tooltip: String, last_update: DateTime<Local>) -> Self {
        Self {
            kind: DisplayKind::Ok,
            label,
            tooltip,
            last_update: Some(last_update),
        }
    }

    /// Failed cycles carry the previous update time forward unchanged.
    pub fn failed(
        kind: DisplayKind,
        label: &str,
        tooltip: String,
        last_update: Option<DateTime<Local>>,
    ) -> Self {
        Self {
            kind,
            label: label.to_string(),
            tooltip,
            last_update,
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::loading()
    }
}
