//! In-memory implementation of the `/api/enquetes/` REST API.
//!
//! Status codes follow the real backend: 201 on create, 400 with a
//! `{"detail": ...}` body on invalid input or a closed poll, 404 for unknown
//! polls and 409 when a participant votes twice on the same poll.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Opcao {
    pub id: i64,
    pub texto_opcao: String,
    pub votos: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enquete {
    pub id: i64,
    pub titulo: String,
    pub data_criacao: String,
    pub expires_at: Option<String>,
    pub delete_at: Option<String>,
    pub opcoes: Vec<Opcao>,
}

#[derive(Deserialize)]
pub struct CreateEnquete {
    pub titulo: String,
    pub opcoes_input: Vec<String>,
    pub duracao_horas: Option<i64>,
}

#[derive(Deserialize)]
pub struct Voto {
    pub id_opcao: i64,
    pub id_participante: String,
}

#[derive(Default)]
pub struct Store {
    polls: BTreeMap<i64, Enquete>,
    voters: HashSet<(i64, String)>,
    next_poll_id: i64,
    next_option_id: i64,
}

impl Store {
    /// Insert a poll directly, bypassing validation. Used to seed expired
    /// polls in tests.
    pub fn insert(&mut self, titulo: &str, opcoes: &[&str], expires_at: Option<DateTime<Utc>>) -> Enquete {
        self.next_poll_id += 1;
        let opcoes = opcoes
            .iter()
            .map(|texto| {
                self.next_option_id += 1;
                Opcao {
                    id: self.next_option_id,
                    texto_opcao: texto.to_string(),
                    votos: 0,
                }
            })
            .collect();
        let poll = Enquete {
            id: self.next_poll_id,
            titulo: titulo.to_string(),
            data_criacao: timestamp(Utc::now()),
            expires_at: expires_at.map(timestamp),
            delete_at: None,
            opcoes,
        };
        self.polls.insert(poll.id, poll.clone());
        poll
    }
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult<T> = Result<T, (StatusCode, Json<serde_json::Value>)>;

pub fn app() -> Router {
    app_with(Db::default())
}

/// Router over an existing store, so tests can seed data.
pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/api/enquetes/", get(list_polls).post(create_poll))
        .route("/api/enquetes/{id}/", get(get_poll))
        .route("/api/enquetes/{id}/votar/", post(vote))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn reject(status: StatusCode, detail: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!({ "detail": detail })))
}

fn is_closed(poll: &Enquete) -> bool {
    match poll.expires_at.as_deref().map(DateTime::parse_from_rfc3339) {
        Some(Ok(expires_at)) => expires_at.with_timezone(&Utc) <= Utc::now(),
        _ => false,
    }
}

async fn list_polls(State(db): State<Db>) -> Json<Vec<Enquete>> {
    let store = db.read().await;
    Json(store.polls.values().cloned().collect())
}

async fn create_poll(
    State(db): State<Db>,
    Json(input): Json<CreateEnquete>,
) -> ApiResult<(StatusCode, Json<Enquete>)> {
    if input.titulo.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "Title is required."));
    }
    let opcoes: Vec<&str> = input
        .opcoes_input
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .collect();
    if opcoes.len() < 2 {
        return Err(reject(StatusCode::BAD_REQUEST, "At least two options are required."));
    }
    let hours = match input.duracao_horas {
        Some(hours) if hours > 0 => hours,
        _ => return Err(reject(StatusCode::BAD_REQUEST, "Duration must be a positive number of hours.")),
    };
    let expires_at = TimeDelta::try_hours(hours)
        .and_then(|duration| Utc::now().checked_add_signed(duration))
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Duration is too long."))?;

    let mut store = db.write().await;
    let poll = store.insert(input.titulo.trim(), &opcoes, Some(expires_at));
    info!(poll_id = poll.id, hours, "poll created");
    Ok((StatusCode::CREATED, Json(poll)))
}

async fn get_poll(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Enquete>> {
    let store = db.read().await;
    store
        .polls
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Not found."))
}

async fn vote(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<Voto>,
) -> ApiResult<Json<Enquete>> {
    let participant = input.id_participante.trim().to_string();
    if participant.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "Participant is required."));
    }

    let mut store = db.write().await;
    let poll = store
        .polls
        .get(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Not found."))?;
    if is_closed(poll) {
        return Err(reject(StatusCode::BAD_REQUEST, "This poll is closed."));
    }
    if !poll.opcoes.iter().any(|o| o.id == input.id_opcao) {
        return Err(reject(StatusCode::BAD_REQUEST, "Option does not belong to this poll."));
    }
    if !store.voters.insert((id, participant)) {
        return Err(reject(StatusCode::CONFLICT, "Participant has already voted on this poll."));
    }

    let poll = store
        .polls
        .get_mut(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Not found."))?;
    if let Some(option) = poll.opcoes.iter_mut().find(|o| o.id == input.id_opcao) {
        option.votos += 1;
    }
    info!(poll_id = id, option_id = input.id_opcao, "vote recorded");
    Ok(Json(poll.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enquete_serializes_wire_names() {
        let mut store = Store::default();
        let poll = store.insert("Lunch?", &["Pizza", "Sushi"], None);
        let json = serde_json::to_value(&poll).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["titulo"], "Lunch?");
        assert_eq!(json["opcoes"][1]["texto_opcao"], "Sushi");
        assert_eq!(json["opcoes"][0]["votos"], 0);
        assert!(json["expires_at"].is_null());
    }

    #[test]
    fn store_assigns_unique_option_ids_across_polls() {
        let mut store = Store::default();
        let first = store.insert("A", &["x", "y"], None);
        let second = store.insert("B", &["x", "y"], None);
        assert_eq!(second.id, first.id + 1);
        assert!(first.opcoes.iter().all(|a| second.opcoes.iter().all(|b| a.id != b.id)));
    }

    #[test]
    fn past_deadline_is_closed() {
        let mut store = Store::default();
        let closed = store.insert("A", &["x", "y"], Some(Utc::now() - TimeDelta::minutes(1)));
        let open = store.insert("B", &["x", "y"], Some(Utc::now() + TimeDelta::minutes(1)));
        let undated = store.insert("C", &["x", "y"], None);
        assert!(is_closed(&closed));
        assert!(!is_closed(&open));
        assert!(!is_closed(&undated));
    }

    #[test]
    fn create_payload_duration_is_optional_on_the_wire() {
        let input: CreateEnquete =
            serde_json::from_str(r#"{"titulo":"T","opcoes_input":["a","b"]}"#).unwrap();
        assert!(input.duracao_horas.is_none());
    }

    #[test]
    fn vote_payload_requires_option() {
        let result: Result<Voto, _> = serde_json::from_str(r#"{"id_participante":"ana"}"#);
        assert!(result.is_err());
    }
}
