//! Domain DTOs for the poll API.
//!
//! # Design
//! Field names follow the backend's wire format (`titulo`, `opcoes`, ...)
//! through serde renames while the Rust side keeps English names. Only the
//! schema with expiration support is modelled: `Poll` carries `expires_at`
//! and `CreatePollRequest` carries `duracao_horas`. The older `status`-label
//! variant of the API is not supported by this client.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minimum number of non-blank options a poll must have.
pub const MIN_OPTIONS: usize = 2;

/// A poll as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Poll {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "data_criacao")]
    pub created_at: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub delete_at: Option<String>,
    #[serde(rename = "opcoes")]
    pub options: Vec<PollOption>,
}

impl Poll {
    /// Sum of the vote counts over every option.
    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|o| o.vote_count).sum()
    }

    pub fn option(&self, option_id: i64) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// One selectable choice within a poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollOption {
    pub id: i64,
    #[serde(rename = "texto_opcao")]
    pub text: String,
    #[serde(rename = "votos")]
    pub vote_count: u64,
}

/// Request payload for creating a new poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePollRequest {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "opcoes_input")]
    pub option_texts: Vec<String>,
    #[serde(
        rename = "duracao_horas",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_hours: Option<u32>,
}

impl CreatePollRequest {
    /// Check the local preconditions the server would otherwise reject.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        let filled = self
            .option_texts
            .iter()
            .filter(|text| !text.trim().is_empty())
            .count();
        if filled < MIN_OPTIONS {
            return Err(ValidationError::TooFewOptions { found: filled });
        }
        if self.duration_hours == Some(0) {
            return Err(ValidationError::NonPositiveDuration);
        }
        Ok(())
    }
}

/// Request payload for casting a vote.
///
/// `participant_id` is a self-reported display name; the server decides
/// whether the participant already voted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteRequest {
    #[serde(rename = "id_opcao")]
    pub option_id: i64,
    #[serde(rename = "id_participante")]
    pub participant_id: String,
}

impl VoteRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.participant_id.trim().is_empty() {
            return Err(ValidationError::BlankParticipant);
        }
        Ok(())
    }
}
