//! Poll creation form.
//!
//! Blank option fields are dropped on submit. Local validation failures and
//! server errors both leave the form populated so the user can correct it.

use std::sync::mpsc::{self, Receiver, Sender};

use tracing::debug;

use super::{Effect, Outcome, Screen};
use crate::types::MIN_OPTIONS;

pub const MISSING_FIELDS_MESSAGE: &str = "A title and at least two options are required.";
pub const INVALID_DURATION_MESSAGE: &str = "Enter a valid duration (greater than 0).";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Created { poll_id: i64 },
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMsg {
    SetTitle(String),
    SetOption { index: usize, text: String },
    AddOption,
    RemoveOption(usize),
    /// Raw duration text; anything but ASCII digits is refused.
    SetDuration(String),
    Submit,
    Completed(Outcome),
}

impl From<Outcome> for FormMsg {
    fn from(outcome: Outcome) -> Self {
        FormMsg::Completed(outcome)
    }
}

#[derive(Debug)]
pub struct PollFormScreen {
    title: String,
    options: Vec<String>,
    duration: String,
    submitting: bool,
    events: Sender<FormEvent>,
}

impl PollFormScreen {
    pub fn new() -> (Self, Receiver<FormEvent>) {
        let (events, receiver) = mpsc::channel();
        let screen = Self {
            title: String::new(),
            options: vec![String::new(); MIN_OPTIONS],
            duration: String::new(),
            submitting: false,
            events,
        };
        (screen, receiver)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn emit(&self, event: FormEvent) {
        let _ = self.events.send(event);
    }

    fn reset(&mut self) {
        self.title.clear();
        self.options = vec![String::new(); MIN_OPTIONS];
        self.duration.clear();
    }

    fn submit(&mut self) -> Option<Effect> {
        if self.submitting {
            return None;
        }
        let option_texts: Vec<String> = self
            .options
            .iter()
            .filter(|text| !text.trim().is_empty())
            .cloned()
            .collect();
        if self.title.trim().is_empty() || option_texts.len() < MIN_OPTIONS {
            self.emit(FormEvent::Error(MISSING_FIELDS_MESSAGE.to_string()));
            return None;
        }
        let duration_hours = match self.duration.parse::<u32>() {
            Ok(hours) if hours > 0 => hours,
            _ => {
                self.emit(FormEvent::Error(INVALID_DURATION_MESSAGE.to_string()));
                return None;
            }
        };
        self.submitting = true;
        Some(Effect::CreatePoll {
            title: self.title.clone(),
            option_texts,
            duration_hours,
        })
    }
}

impl Screen for PollFormScreen {
    type Msg = FormMsg;

    fn update(&mut self, msg: FormMsg) -> Option<Effect> {
        match msg {
            FormMsg::SetTitle(title) => self.title = title,
            FormMsg::SetOption { index, text } => {
                if let Some(slot) = self.options.get_mut(index) {
                    *slot = text;
                }
            }
            FormMsg::AddOption => self.options.push(String::new()),
            FormMsg::RemoveOption(index) => {
                if self.options.len() > MIN_OPTIONS && index < self.options.len() {
                    self.options.remove(index);
                }
            }
            FormMsg::SetDuration(text) => {
                if text.chars().all(|c| c.is_ascii_digit()) {
                    self.duration = text;
                }
            }
            FormMsg::Submit => return self.submit(),
            FormMsg::Completed(Outcome::Created(result)) => {
                self.submitting = false;
                match result {
                    Ok(poll) => {
                        self.reset();
                        self.emit(FormEvent::Created { poll_id: poll.id });
                    }
                    Err(err) => self.emit(FormEvent::Error(format!("Could not create poll: {err}"))),
                }
            }
            FormMsg::Completed(other) => {
                debug!(?other, "form screen ignored unrelated outcome");
            }
        }
        None
    }
}
