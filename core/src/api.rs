//! API client: the four remote poll operations over a `Transport`.

use tracing::debug;

use crate::client::PollClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::Transport;
use crate::transport::{RetryingTransport, UreqTransport};
use crate::types::{CreatePollRequest, Poll, VoteRequest};

/// Production transport stack: `ureq` with fixed-delay retries.
pub type DefaultTransport = RetryingTransport<UreqTransport>;

/// Executes poll operations end-to-end: validate, build, send, parse.
///
/// Each call is independent and blocks the calling thread until the
/// response arrives or the transport gives up.
#[derive(Debug, Clone)]
pub struct PollApi<T> {
    client: PollClient,
    transport: T,
}

impl PollApi<DefaultTransport> {
    pub fn from_config(config: &ClientConfig) -> Self {
        let transport = RetryingTransport::new(UreqTransport::new(config.timeout), config.retry);
        Self::new(&config.base_url, transport)
    }
}

impl<T: Transport> PollApi<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: PollClient::new(base_url),
            transport,
        }
    }

    pub fn client(&self) -> &PollClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn list_polls(&self) -> Result<Vec<Poll>, ApiError> {
        let request = self.client.build_list_polls();
        let response = self.transport.execute(&request)?;
        self.client.parse_list_polls(response)
    }

    pub fn get_poll(&self, poll_id: &str) -> Result<Poll, ApiError> {
        let request = self.client.build_get_poll(poll_id)?;
        let response = self.transport.execute(&request)?;
        self.client.parse_get_poll(response)
    }

    /// Cast a vote and return the poll with refreshed counts.
    pub fn vote(&self, poll_id: &str, input: &VoteRequest) -> Result<Poll, ApiError> {
        input.validate()?;
        let request = self.client.build_vote(poll_id, input)?;
        let response = self.transport.execute(&request)?;
        let poll = self.client.parse_vote(response)?;
        debug!(poll_id = poll.id, option_id = input.option_id, "vote accepted");
        Ok(poll)
    }

    /// Create a poll and return it with its server-assigned id.
    pub fn create_poll(&self, input: &CreatePollRequest) -> Result<Poll, ApiError> {
        input.validate()?;
        let request = self.client.build_create_poll(input)?;
        let response = self.transport.execute(&request)?;
        let poll = self.client.parse_create_poll(response)?;
        debug!(poll_id = poll.id, options = poll.options.len(), "poll created");
        Ok(poll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, ValidationError};
    use crate::http::{HttpRequest, HttpResponse};
    use std::sync::Mutex;

    /// Records requests and answers each one with the same canned outcome.
    struct RecordingTransport {
        outcome: Result<HttpResponse, TransportError>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingTransport {
        fn answering(status: u16, body: &str) -> Self {
            Self {
                outcome: Ok(HttpResponse {
                    status,
                    headers: Vec::new(),
                    body: body.to_string(),
                }),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: TransportError) -> Self {
            Self {
                outcome: Err(err),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            self.outcome.clone()
        }
    }

    const POLL: &str = r#"{"id":3,"titulo":"Color","data_criacao":"2025-03-01T12:00:00Z","expires_at":null,"delete_at":null,"opcoes":[{"id":1,"texto_opcao":"Red","votos":1},{"id":2,"texto_opcao":"Blue","votos":0}]}"#;

    fn create_input(title: &str, options: &[&str]) -> CreatePollRequest {
        CreatePollRequest {
            title: title.to_string(),
            option_texts: options.iter().map(|s| s.to_string()).collect(),
            duration_hours: Some(1),
        }
    }

    #[test]
    fn create_with_blank_title_never_reaches_transport() {
        let api = PollApi::new("http://api", RecordingTransport::answering(201, POLL));
        let err = api.create_poll(&create_input("", &["a", "b"])).unwrap_err();
        assert_eq!(err, ApiError::Validation(ValidationError::BlankTitle));
        assert!(api.transport().requests().is_empty());
    }

    #[test]
    fn create_with_one_option_never_reaches_transport() {
        let api = PollApi::new("http://api", RecordingTransport::answering(201, POLL));
        let err = api.create_poll(&create_input("T", &["only", " "])).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::TooFewOptions { found: 1 })
        ));
        assert!(api.transport().requests().is_empty());
    }

    #[test]
    fn vote_with_blank_participant_never_reaches_transport() {
        let api = PollApi::new("http://api", RecordingTransport::answering(200, POLL));
        let vote = VoteRequest {
            option_id: 1,
            participant_id: String::new(),
        };
        assert!(api.vote("3", &vote).is_err());
        assert!(api.transport().requests().is_empty());
    }

    #[test]
    fn create_sends_one_post() {
        let api = PollApi::new("http://api", RecordingTransport::answering(201, POLL));
        let poll = api.create_poll(&create_input("Color", &["Red", "Blue"])).unwrap();
        assert_eq!(poll.id, 3);
        let requests = api.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://api/api/enquetes/");
    }

    #[test]
    fn vote_conflict_surfaces_as_conflict() {
        let api = PollApi::new(
            "http://api",
            RecordingTransport::answering(409, r#"{"detail":"already voted"}"#),
        );
        let vote = VoteRequest {
            option_id: 1,
            participant_id: "ana".to_string(),
        };
        let err = api.vote("3", &vote).unwrap_err();
        assert!(matches!(err, ApiError::Conflict { .. }));
    }

    #[test]
    fn transport_failure_propagates_unchanged() {
        let api = PollApi::new(
            "http://api",
            RecordingTransport::failing(TransportError::Connect("refused".into())),
        );
        let err = api.list_polls().unwrap_err();
        assert_eq!(err, ApiError::Transport(TransportError::Connect("refused".into())));
    }

    #[test]
    fn get_poll_hits_detail_path() {
        let api = PollApi::new("http://api/", RecordingTransport::answering(200, POLL));
        let poll = api.get_poll("3").unwrap();
        assert_eq!(poll.title, "Color");
        assert_eq!(api.transport().requests()[0].url, "http://api/api/enquetes/3/");
    }

    #[test]
    fn from_config_keeps_retry_policy() {
        let mut config = ClientConfig::new("http://api");
        config.retry.max_attempts = 5;
        let api = PollApi::from_config(&config);
        assert_eq!(api.transport().policy().max_attempts, 5);
        assert_eq!(api.client().base_url(), "http://api");
    }
}
