//! Poll list screen.

use tracing::debug;

use super::{Effect, Outcome, Screen, ScreenState};
use crate::types::Poll;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMsg {
    Load,
    /// Pull-to-refresh: like `Load`, but raises `is_refreshing` until done.
    Refresh,
    Completed(Outcome),
}

impl From<Outcome> for ListMsg {
    fn from(outcome: Outcome) -> Self {
        ListMsg::Completed(outcome)
    }
}

#[derive(Debug)]
pub struct PollListScreen {
    state: ScreenState<Vec<Poll>>,
    is_refreshing: bool,
}

impl Default for PollListScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl PollListScreen {
    pub fn new() -> Self {
        Self {
            state: ScreenState::Loading,
            is_refreshing: false,
        }
    }

    pub fn state(&self) -> &ScreenState<Vec<Poll>> {
        &self.state
    }

    pub fn is_refreshing(&self) -> bool {
        self.is_refreshing
    }
}

impl Screen for PollListScreen {
    type Msg = ListMsg;

    fn update(&mut self, msg: ListMsg) -> Option<Effect> {
        match msg {
            ListMsg::Load => {
                self.state = ScreenState::Loading;
                Some(Effect::ListPolls)
            }
            ListMsg::Refresh => {
                self.is_refreshing = true;
                self.state = ScreenState::Loading;
                Some(Effect::ListPolls)
            }
            ListMsg::Completed(Outcome::Polls(result)) => {
                self.is_refreshing = false;
                self.state = match result {
                    Ok(mut polls) => {
                        // Newest first; timestamps share one format so text order works.
                        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                        ScreenState::Success(polls)
                    }
                    Err(err) => ScreenState::Error(err.to_string()),
                };
                None
            }
            ListMsg::Completed(other) => {
                debug!(?other, "list screen ignored unrelated outcome");
                None
            }
        }
    }
}
