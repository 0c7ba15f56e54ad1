//! Poll repository: the seam presentation code depends on.
//!
//! `RemotePollRepository` only maps primitive parameters onto request
//! payloads and forwards to `PollApi`. Tests substitute their own
//! `PollRepository` to avoid the network.

use crate::api::PollApi;
use crate::error::ApiError;
use crate::http::Transport;
use crate::types::{CreatePollRequest, Poll, VoteRequest};

pub trait PollRepository {
    fn list_polls(&self) -> Result<Vec<Poll>, ApiError>;

    fn get_poll(&self, poll_id: &str) -> Result<Poll, ApiError>;

    fn vote(&self, poll_id: &str, option_id: i64, participant_id: &str) -> Result<Poll, ApiError>;

    fn create_poll(
        &self,
        title: &str,
        option_texts: &[String],
        duration_hours: Option<u32>,
    ) -> Result<Poll, ApiError>;
}

/// Repository backed by the remote API.
#[derive(Debug, Clone)]
pub struct RemotePollRepository<T> {
    api: PollApi<T>,
}

impl<T: Transport> RemotePollRepository<T> {
    pub fn new(api: PollApi<T>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &PollApi<T> {
        &self.api
    }
}

impl<T: Transport> PollRepository for RemotePollRepository<T> {
    fn list_polls(&self) -> Result<Vec<Poll>, ApiError> {
        self.api.list_polls()
    }

    fn get_poll(&self, poll_id: &str) -> Result<Poll, ApiError> {
        self.api.get_poll(poll_id)
    }

    fn vote(&self, poll_id: &str, option_id: i64, participant_id: &str) -> Result<Poll, ApiError> {
        let payload = VoteRequest {
            option_id,
            participant_id: participant_id.to_string(),
        };
        self.api.vote(poll_id, &payload)
    }

    fn create_poll(
        &self,
        title: &str,
        option_texts: &[String],
        duration_hours: Option<u32>,
    ) -> Result<Poll, ApiError> {
        let payload = CreatePollRequest {
            title: title.to_string(),
            option_texts: option_texts.to_vec(),
            duration_hours,
        };
        self.api.create_poll(&payload)
    }
}
