//! Client core for the Pollab poll service.
//!
//! # Overview
//! Users browse active polls, open one to see live vote counts, cast a single
//! vote per poll while it is open, and create polls with a title, options and
//! a duration. All poll state lives on the server; this crate is the layer a
//! mobile host calls into.
//!
//! # Design
//! - `PollClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network.
//! - `Transport` executes requests. `UreqTransport` does real I/O and
//!   `RetryingTransport` retries connection-level failures with a fixed delay.
//! - `PollApi` ties the two together; `PollRepository` is the seam UI code
//!   depends on.
//! - `expiration` computes countdowns and the expired flag.
//! - `screen` holds message-driven state machines for the list, detail and
//!   form screens.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod expiration;
pub mod http;
pub mod repository;
pub mod screen;
pub mod transport;
pub mod types;

pub use api::{DefaultTransport, PollApi};
pub use client::PollClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, TransportError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use repository::{PollRepository, RemotePollRepository};
pub use transport::{RetryPolicy, RetryingTransport, UreqTransport};
pub use types::{CreatePollRequest, Poll, PollOption, VoteRequest};
