//! Poll detail screen with voting.

use std::sync::mpsc::{self, Receiver, Sender};

use tracing::debug;

use super::{Effect, Outcome, Screen, ScreenState};
use crate::error::ApiError;
use crate::expiration;
use crate::types::Poll;

pub const ALREADY_VOTED_MESSAGE: &str = "You have already voted on this poll.";
pub const POLL_CLOSED_MESSAGE: &str = "This poll is closed.";
pub const MISSING_NAME_MESSAGE: &str = "Enter your name before voting.";
pub const UNEXPECTED_VOTE_MESSAGE: &str = "Unexpected error while voting.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDetail {
    pub poll: Poll,
    pub is_voting: bool,
}

impl PollDetail {
    pub fn is_expired(&self) -> bool {
        expiration::is_expired(self.poll.expires_at.as_deref())
    }

    pub fn remaining_time(&self) -> Option<String> {
        expiration::remaining_time(self.poll.expires_at.as_deref())
    }

    pub fn can_vote(&self) -> bool {
        !self.is_voting && !self.is_expired()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteEvent {
    ShowMessage(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailMsg {
    Load(String),
    Vote { option_id: i64, participant: String },
    Completed(Outcome),
}

impl From<Outcome> for DetailMsg {
    fn from(outcome: Outcome) -> Self {
        DetailMsg::Completed(outcome)
    }
}

#[derive(Debug)]
pub struct PollDetailScreen {
    poll_id: Option<String>,
    state: ScreenState<PollDetail>,
    events: Sender<VoteEvent>,
}

impl PollDetailScreen {
    pub fn new() -> (Self, Receiver<VoteEvent>) {
        let (events, receiver) = mpsc::channel();
        let screen = Self {
            poll_id: None,
            state: ScreenState::Loading,
            events,
        };
        (screen, receiver)
    }

    pub fn state(&self) -> &ScreenState<PollDetail> {
        &self.state
    }

    pub fn poll_id(&self) -> Option<&str> {
        self.poll_id.as_deref()
    }

    fn start_vote(&mut self, option_id: i64, participant: String) -> Option<Effect> {
        let poll_id = self.poll_id.clone()?;
        let ScreenState::Success(detail) = &mut self.state else {
            return None;
        };
        if detail.is_voting {
            return None;
        }
        if detail.is_expired() {
            notify(&self.events, POLL_CLOSED_MESSAGE);
            return None;
        }
        let participant = participant.trim().to_string();
        if participant.is_empty() {
            notify(&self.events, MISSING_NAME_MESSAGE);
            return None;
        }
        detail.is_voting = true;
        Some(Effect::Vote {
            poll_id,
            option_id,
            participant,
        })
    }

    fn finish_load(&mut self, poll_id: String, result: Result<Poll, ApiError>) {
        if self.poll_id.as_deref() != Some(poll_id.as_str()) {
            debug!(poll_id = %poll_id, "discarded poll for a screen showing another poll");
            return;
        }
        self.state = match result {
            Ok(poll) => ScreenState::Success(PollDetail {
                poll,
                is_voting: false,
            }),
            Err(err) => ScreenState::Error(err.to_string()),
        };
    }

    /// Apply a vote result only to the poll it was cast on, and only while
    /// that vote is still in flight. Failures are always reported.
    fn finish_vote(&mut self, poll_id: String, result: Result<Poll, ApiError>) {
        let current = match &mut self.state {
            ScreenState::Success(detail)
                if detail.is_voting && self.poll_id.as_deref() == Some(poll_id.as_str()) =>
            {
                Some(detail)
            }
            _ => None,
        };
        match (current, result) {
            (Some(detail), Ok(poll)) => {
                detail.poll = poll;
                detail.is_voting = false;
            }
            (Some(detail), Err(err)) => {
                detail.is_voting = false;
                notify(&self.events, vote_failure_message(&err));
            }
            (None, Ok(_)) => {
                debug!(poll_id = %poll_id, "discarded vote result for a poll no longer shown");
            }
            (None, Err(err)) => notify(&self.events, vote_failure_message(&err)),
        }
    }
}

fn notify(events: &Sender<VoteEvent>, message: impl Into<String>) {
    // A closed receiver means the screen is gone; nothing left to tell.
    let _ = events.send(VoteEvent::ShowMessage(message.into()));
}

/// User-facing text for a failed vote. A 409 gets its own wording.
pub fn vote_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Conflict { .. } => ALREADY_VOTED_MESSAGE.to_string(),
        ApiError::NotFound | ApiError::Remote { .. } => {
            format!("Could not register your vote: {err}")
        }
        ApiError::Validation(validation) => validation.to_string(),
        ApiError::Transport(_) | ApiError::Decode(_) | ApiError::Encode(_) => {
            UNEXPECTED_VOTE_MESSAGE.to_string()
        }
    }
}

impl Screen for PollDetailScreen {
    type Msg = DetailMsg;

    fn update(&mut self, msg: DetailMsg) -> Option<Effect> {
        match msg {
            DetailMsg::Load(poll_id) => {
                self.poll_id = Some(poll_id.clone());
                self.state = ScreenState::Loading;
                Some(Effect::GetPoll { poll_id })
            }
            DetailMsg::Vote {
                option_id,
                participant,
            } => self.start_vote(option_id, participant),
            DetailMsg::Completed(Outcome::Poll { poll_id, result }) => {
                self.finish_load(poll_id, result);
                None
            }
            DetailMsg::Completed(Outcome::Voted { poll_id, result }) => {
                self.finish_vote(poll_id, result);
                None
            }
            DetailMsg::Completed(other) => {
                debug!(?other, "detail screen ignored unrelated outcome");
                None
            }
        }
    }
}
