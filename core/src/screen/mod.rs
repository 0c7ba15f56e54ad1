//! Per-screen state machines for hosts that render polls.
//!
//! # Design
//! Each screen owns its state and changes it only in `update`, which takes a
//! message and may return an `Effect` (a repository call). The host runs the
//! effect wherever it likes, typically on a worker thread, and feeds the
//! resulting `Outcome` back through `update`. Between the two calls the
//! screen shows its in-flight state (`Loading`, `is_voting`, `submitting`).
//!
//! One-shot notifications go through a `std::sync::mpsc` channel created
//! with the screen. Dropping the receiver is how a host tears a screen
//! down: effects already running complete, and their notifications are
//! discarded.

pub mod detail;
pub mod form;
pub mod list;

pub use detail::{DetailMsg, PollDetail, PollDetailScreen, VoteEvent};
pub use form::{FormEvent, FormMsg, PollFormScreen};
pub use list::{ListMsg, PollListScreen};

use crate::error::ApiError;
use crate::repository::PollRepository;
use crate::types::Poll;

/// Lifecycle of data a screen is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> ScreenState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            ScreenState::Success(data) => Some(data),
            _ => None,
        }
    }
}

/// A repository call requested by a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ListPolls,
    GetPoll {
        poll_id: String,
    },
    Vote {
        poll_id: String,
        option_id: i64,
        participant: String,
    },
    CreatePoll {
        title: String,
        option_texts: Vec<String>,
        duration_hours: u32,
    },
}

/// Result of running an `Effect`.
///
/// Per-poll outcomes echo the id they were requested for, so a screen can
/// tell a late answer for a poll it no longer shows from a current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Polls(Result<Vec<Poll>, ApiError>),
    Poll {
        poll_id: String,
        result: Result<Poll, ApiError>,
    },
    Voted {
        poll_id: String,
        result: Result<Poll, ApiError>,
    },
    Created(Result<Poll, ApiError>),
}

impl Effect {
    /// Perform the call. Blocks until the repository returns.
    pub fn run<R: PollRepository + ?Sized>(self, repository: &R) -> Outcome {
        match self {
            Effect::ListPolls => Outcome::Polls(repository.list_polls()),
            Effect::GetPoll { poll_id } => {
                let result = repository.get_poll(&poll_id);
                Outcome::Poll { poll_id, result }
            }
            Effect::Vote {
                poll_id,
                option_id,
                participant,
            } => {
                let result = repository.vote(&poll_id, option_id, &participant);
                Outcome::Voted { poll_id, result }
            }
            Effect::CreatePoll {
                title,
                option_texts,
                duration_hours,
            } => Outcome::Created(repository.create_poll(&title, &option_texts, Some(duration_hours))),
        }
    }
}

/// A screen driven by messages.
pub trait Screen {
    type Msg: From<Outcome>;

    fn update(&mut self, msg: Self::Msg) -> Option<Effect>;
}

/// Apply `msg` and run every resulting effect on the current thread until
/// the screen settles.
pub fn drive<S, R>(screen: &mut S, repository: &R, msg: S::Msg)
where
    S: Screen,
    R: PollRepository + ?Sized,
{
    let mut next = screen.update(msg);
    while let Some(effect) = next {
        let outcome = effect.run(repository);
        next = screen.update(outcome.into());
    }
}
