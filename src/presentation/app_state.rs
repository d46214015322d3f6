// Application state for HTTP handlers
use crate::application::poll_scheduler::PollScheduler;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: PollScheduler,
}
