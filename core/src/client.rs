//! Stateless HTTP request builder and response parser for the poll API.
//!
//! # Design
//! `PollClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! `PollApi` glues the two halves to a `Transport`; hosts that do their own
//! I/O can use this type directly.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, ValidationError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreatePollRequest, Poll, VoteRequest};

const POLLS_PATH: &str = "api/enquetes";

/// Synchronous, stateless request builder for the poll API.
#[derive(Debug, Clone)]
pub struct PollClient {
    base_url: String,
}

impl PollClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_polls(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/{POLLS_PATH}/", self.base_url),
            headers: accept_json(),
            body: None,
        }
    }

    pub fn build_get_poll(&self, poll_id: &str) -> Result<HttpRequest, ApiError> {
        let poll_id = checked_poll_id(poll_id)?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/{POLLS_PATH}/{poll_id}/", self.base_url),
            headers: accept_json(),
            body: None,
        })
    }

    pub fn build_vote(&self, poll_id: &str, input: &VoteRequest) -> Result<HttpRequest, ApiError> {
        let poll_id = checked_poll_id(poll_id)?;
        self.json_post(format!("{}/{POLLS_PATH}/{poll_id}/votar/", self.base_url), input)
    }

    pub fn build_create_poll(&self, input: &CreatePollRequest) -> Result<HttpRequest, ApiError> {
        self.json_post(format!("{}/{POLLS_PATH}/", self.base_url), input)
    }

    pub fn parse_list_polls(&self, response: HttpResponse) -> Result<Vec<Poll>, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    pub fn parse_get_poll(&self, response: HttpResponse) -> Result<Poll, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    /// Parse the updated poll returned by a vote. A 409 means the participant
    /// already voted and becomes `ApiError::Conflict`.
    pub fn parse_vote(&self, response: HttpResponse) -> Result<Poll, ApiError> {
        if response.status == 409 {
            return Err(ApiError::Conflict {
                message: server_message(&response),
            });
        }
        check_status(&response)?;
        decode(&response)
    }

    /// Parse the created poll. A 400 means the server rejected the payload.
    pub fn parse_create_poll(&self, response: HttpResponse) -> Result<Poll, ApiError> {
        if response.status == 400 {
            return Err(ValidationError::Rejected(server_message(&response)).into());
        }
        check_status(&response)?;
        decode(&response)
    }

    fn json_post<B: Serialize>(&self, url: String, input: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Encode(e.to_string()))?;
        let mut headers = accept_json();
        headers.push(("content-type".to_string(), "application/json".to_string()));
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url,
            headers,
            body: Some(body),
        })
    }
}

fn accept_json() -> Vec<(String, String)> {
    vec![("accept".to_string(), "application/json".to_string())]
}

/// Reject ids that would produce a different path than intended.
fn checked_poll_id(poll_id: &str) -> Result<&str, ApiError> {
    let poll_id = poll_id.trim();
    if poll_id.is_empty() || poll_id.contains(['/', '?', '#']) {
        return Err(ValidationError::BlankPollId.into());
    }
    Ok(poll_id)
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Remote {
        status: response.status,
        message: server_message(response),
    })
}

/// Extract a human-readable message from an error body. Django REST style
/// `{"detail": "..."}` bodies are unwrapped; anything else is used verbatim.
fn server_message(response: &HttpResponse) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(&response.body) {
        for key in ["detail", "error", "message"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    response.body.trim().to_string()
}
