// Display sink - Receives every applied display state
use crate::domain::display::DisplayState;

pub trait DisplaySink: Send + Sync {
    /// Called once per applied cycle, in apply order. Runs while the
    /// scheduler holds its publish lock, so it must not call back into the
    /// scheduler.
    fn on_display_update(&self, state: &DisplayState);
}

/// Default sink for the daemon: writes each update to the log.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

impl DisplaySink for LogSink {
    fn on_display_update(&self, state: &DisplayState) {
        if state.kind.is_error() {
            tracing::warn!(kind = ?state.kind, label = %state.label, "Display shows an error");
        } else {
            tracing::info!(kind = ?state.kind, label = %state.label, "Display updated");
        }
        tracing::debug!(tooltip = %state.tooltip, "Display tooltip");
    }
}
