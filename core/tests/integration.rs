//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every API
//! operation over real HTTP through the production transport stack
//! (`RetryingTransport<UreqTransport>`). A second group points the client
//! at a closed port to observe the retry policy against real connection
//! failures.

use std::net::{SocketAddr, TcpListener};
use std::time::{Duration, Instant};

use pollab_core::screen::{drive, DetailMsg, ListMsg, PollDetailScreen, PollListScreen, ScreenState, VoteEvent};
use pollab_core::{
    ApiError, ClientConfig, CreatePollRequest, PollApi, PollRepository, RemotePollRepository, RetryPolicy,
    Transport, ValidationError, VoteRequest,
};

/// Start the mock server on a background thread and return its address.
fn start_server() -> SocketAddr {
    let std_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// An address nothing listens on.
fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

fn config(addr: SocketAddr) -> ClientConfig {
    let mut config = ClientConfig::new(format!("http://{addr}"));
    config.retry.delay = Duration::from_millis(50);
    config.timeout = Duration::from_secs(5);
    config
}

fn lunch() -> CreatePollRequest {
    CreatePollRequest {
        title: "Lunch?".to_string(),
        option_texts: vec!["Pizza".to_string(), "Sushi".to_string()],
        duration_hours: Some(2),
    }
}

#[test]
fn poll_lifecycle() {
    let addr = start_server();
    let api = PollApi::from_config(&config(addr));

    // Step 1: list is empty.
    assert!(api.list_polls().unwrap().is_empty());

    // Step 2: create a poll.
    let created = api.create_poll(&lunch()).unwrap();
    assert_eq!(created.title, "Lunch?");
    assert_eq!(created.options.len(), 2);
    assert!(created.expires_at.is_some());
    assert!(!pollab_core::expiration::is_expired(created.expires_at.as_deref()));
    let remaining = pollab_core::expiration::remaining_time(created.expires_at.as_deref()).unwrap();
    assert!(remaining == "01h 59m" || remaining == "02h 00m", "{remaining}");

    // Step 3: the listed poll and the fetched poll are field-equal.
    let listed = api.list_polls().unwrap();
    let fetched = api.get_poll(&created.id.to_string()).unwrap();
    assert_eq!(listed, vec![fetched.clone()]);
    assert_eq!(fetched, created);

    // Step 4: vote.
    let pizza = created.options[0].id;
    let vote = VoteRequest {
        option_id: pizza,
        participant_id: "ana".to_string(),
    };
    let updated = api.vote(&created.id.to_string(), &vote).unwrap();
    assert_eq!(updated.option(pizza).unwrap().vote_count, 1);
    assert_eq!(updated.total_votes(), 1);

    // Step 5: voting twice is a conflict, not a generic failure.
    let err = api.vote(&created.id.to_string(), &vote).unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }), "{err:?}");

    // Step 6: unknown poll.
    let err = api.get_poll("999").unwrap_err();
    assert_eq!(err, ApiError::NotFound);

    // Step 7: voting for an option of another poll is a remote error.
    let err = api
        .vote(
            &created.id.to_string(),
            &VoteRequest {
                option_id: 12345,
                participant_id: "bia".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::Remote { status: 400, .. }), "{err:?}");
}

#[test]
fn server_rejection_of_create_is_validation_error() {
    let addr = start_server();
    let api = PollApi::from_config(&config(addr));

    // Bypass local validation to see the server's answer.
    let mut request = lunch();
    request.duration_hours = None;
    let http_request = api.client().build_create_poll(&request).unwrap();
    let response = api.transport().execute(&http_request).unwrap();
    assert_eq!(response.status, 400);
    let err = api.client().parse_create_poll(response).unwrap_err();
    assert!(matches!(err, ApiError::Validation(ValidationError::Rejected(_))), "{err:?}");
}

#[test]
fn screens_drive_the_live_repository() {
    let addr = start_server();
    let repo = RemotePollRepository::new(PollApi::from_config(&config(addr)));
    let options = vec!["Red".to_string(), "Blue".to_string()];
    let first = repo.create_poll("Color", &options, Some(1)).unwrap();
    repo.create_poll("Shape", &options, Some(1)).unwrap();

    let mut list = PollListScreen::new();
    drive(&mut list, &repo, ListMsg::Load);
    assert_eq!(list.state().data().map(Vec::len), Some(2));

    let (mut detail, events) = PollDetailScreen::new();
    drive(&mut detail, &repo, DetailMsg::Load(first.id.to_string()));
    let vote = DetailMsg::Vote {
        option_id: first.options[1].id,
        participant: "ana".to_string(),
    };
    drive(&mut detail, &repo, vote.clone());
    assert_eq!(detail.state().data().unwrap().poll.total_votes(), 1);
    assert!(events.try_recv().is_err());

    drive(&mut detail, &repo, vote);
    assert_eq!(
        events.try_recv().unwrap(),
        VoteEvent::ShowMessage("You have already voted on this poll.".to_string())
    );

    let (mut missing, _events) = PollDetailScreen::new();
    drive(&mut missing, &repo, DetailMsg::Load("4242".to_string()));
    assert!(matches!(missing.state(), ScreenState::Error(_)));
}

#[test]
fn unreachable_server_exhausts_every_attempt() {
    let mut config = config(closed_addr());
    config.retry = RetryPolicy {
        max_attempts: 3,
        delay: Duration::from_millis(100),
    };
    let api = PollApi::from_config(&config);

    let started = Instant::now();
    let err = api.list_polls().unwrap_err();
    let elapsed = started.elapsed();

    match err {
        ApiError::Transport(inner) => assert!(inner.is_retryable(), "{inner:?}"),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
}

#[test]
fn invalid_create_never_touches_the_network() {
    // Nothing listens here, so any request would surface as a transport error.
    let api = PollApi::from_config(&config(closed_addr()));
    let mut request = lunch();
    request.option_texts = vec!["Pizza".to_string(), "   ".to_string()];

    let started = Instant::now();
    let err = api.create_poll(&request).unwrap_err();
    assert_eq!(
        err,
        ApiError::Validation(ValidationError::TooFewOptions { found: 1 })
    );
    assert!(started.elapsed() < Duration::from_millis(50));
}
