//! Application state and its single mutation path.

use super::coaching::CoachingSession;
use crate::markup::{MediaKind, MediaPrompt, ParsedBriefing, parse_briefing};
use crate::services::{ServiceKey, calendar_active};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::sync::mpsc;

/// Lifecycle of one media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    Loading,
    Done,
    Error,
}

/// One fanned-out media generation and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub service: ServiceKey,
    pub kind: MediaKind,
    pub prompt: String,
    pub status: MediaStatus,
    /// Data URI of the generated media once `Done`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MediaItem {
    pub fn loading(prompt: &MediaPrompt) -> Self {
        Self {
            service: prompt.service,
            kind: prompt.kind,
            prompt: prompt.prompt.clone(),
            status: MediaStatus::Loading,
            url: None,
            error: None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status != MediaStatus::Loading
    }

    /// Move out of `Loading`. A settled item is left untouched.
    fn settle(&mut self, result: Result<String, String>) -> bool {
        if self.is_settled() {
            return false;
        }
        match result {
            Ok(url) => {
                self.status = MediaStatus::Done;
                self.url = Some(url);
            }
            Err(message) => {
                self.status = MediaStatus::Error;
                self.error = Some(message);
            }
        }
        true
    }
}

/// Everything the host displays, owned by the [`Store`].
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Services toggled on by the user
    pub connected: BTreeSet<ServiceKey>,
    /// Services the current generation was started with
    pub active_services: BTreeSet<ServiceKey>,
    pub loading: bool,
    pub stream_complete: bool,
    pub error: Option<String>,
    /// Raw model output of the current generation
    pub response: String,
    pub parsed: ParsedBriefing,
    /// Prompts waiting for fan-out; consumed exactly once
    pub media_prompts: Vec<MediaPrompt>,
    pub media: Vec<MediaItem>,
    pub media_active: bool,
    pub needs_credential_selection: bool,
    pub coaching_loading: bool,
    pub coaching: Option<CoachingSession>,
    pub coaching_error: Option<String>,
}

/// State transitions. Applied only through [`AppState::apply`].
#[derive(Debug, Clone)]
pub enum Action {
    ToggleService(ServiceKey),
    /// Request rejected before anything was sent
    ValidationFailed(String),
    GenerationStarted {
        services: BTreeSet<ServiceKey>,
    },
    ChunkReceived(String),
    StreamCompleted,
    GenerationFailed(String),
    MediaStarted(Vec<MediaItem>),
    MediaSettled {
        index: usize,
        result: Result<String, String>,
    },
    CredentialSelectionRequired,
    CredentialSelected,
    MediaFinished,
    CoachingStarted,
    CoachingReady(CoachingSession),
    CoachingFailed(String),
}

/// Notifications published after a state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BriefingEvent {
    ServicesChanged {
        connected: Vec<ServiceKey>,
    },
    GenerationStarted {
        services: Vec<ServiceKey>,
    },
    BriefingUpdated {
        chunk: String,
        parsed: ParsedBriefing,
    },
    StreamCompleted {
        parsed: ParsedBriefing,
        media_prompts: usize,
    },
    GenerationFailed {
        message: String,
    },
    MediaStarted {
        items: Vec<MediaItem>,
    },
    MediaSettled {
        index: usize,
        item: MediaItem,
    },
    CredentialSelectionRequired,
    MediaFinished {
        items: Vec<MediaItem>,
    },
    CoachingStarted,
    CoachingReady {
        session: CoachingSession,
    },
    CoachingFailed {
        message: String,
    },
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action and return the event describing the change, if any.
    pub fn apply(&mut self, action: Action) -> Option<BriefingEvent> {
        match action {
            Action::ToggleService(service) => {
                if !self.connected.remove(&service) {
                    self.connected.insert(service);
                }
                Some(BriefingEvent::ServicesChanged {
                    connected: self.connected.iter().copied().collect(),
                })
            }
            Action::ValidationFailed(message) => {
                self.error = Some(message.clone());
                Some(BriefingEvent::GenerationFailed { message })
            }
            Action::GenerationStarted { services } => {
                self.loading = true;
                self.stream_complete = false;
                self.error = None;
                self.response.clear();
                self.parsed = ParsedBriefing::default();
                self.media_prompts.clear();
                self.media.clear();
                self.media_active = false;
                self.active_services = services;
                Some(BriefingEvent::GenerationStarted {
                    services: self.active_services.iter().copied().collect(),
                })
            }
            Action::ChunkReceived(chunk) => {
                self.response.push_str(&chunk);
                self.parsed = parse_briefing(&self.response, calendar_active(&self.active_services));
                Some(BriefingEvent::BriefingUpdated {
                    chunk,
                    parsed: self.parsed.clone(),
                })
            }
            Action::StreamCompleted => {
                self.loading = false;
                self.stream_complete = true;
                self.media_prompts = self.parsed.media_prompts.clone();
                Some(BriefingEvent::StreamCompleted {
                    parsed: self.parsed.clone(),
                    media_prompts: self.media_prompts.len(),
                })
            }
            Action::GenerationFailed(message) => {
                self.loading = false;
                self.error = Some(message.clone());
                Some(BriefingEvent::GenerationFailed { message })
            }
            Action::MediaStarted(items) => {
                self.media = items;
                self.media_active = true;
                Some(BriefingEvent::MediaStarted {
                    items: self.media.clone(),
                })
            }
            Action::MediaSettled { index, result } => {
                let item = self.media.get_mut(index)?;
                if !item.settle(result) {
                    return None;
                }
                Some(BriefingEvent::MediaSettled {
                    index,
                    item: item.clone(),
                })
            }
            Action::CredentialSelectionRequired => {
                if self.needs_credential_selection {
                    return None;
                }
                self.needs_credential_selection = true;
                Some(BriefingEvent::CredentialSelectionRequired)
            }
            Action::CredentialSelected => {
                self.needs_credential_selection = false;
                None
            }
            Action::MediaFinished => {
                self.media_prompts.clear();
                self.media_active = false;
                Some(BriefingEvent::MediaFinished {
                    items: self.media.clone(),
                })
            }
            Action::CoachingStarted => {
                self.coaching_loading = true;
                self.coaching = None;
                self.coaching_error = None;
                Some(BriefingEvent::CoachingStarted)
            }
            Action::CoachingReady(session) => {
                self.coaching_loading = false;
                self.coaching = Some(session.clone());
                Some(BriefingEvent::CoachingReady { session })
            }
            Action::CoachingFailed(message) => {
                self.coaching_loading = false;
                self.coaching_error = Some(message.clone());
                Some(BriefingEvent::CoachingFailed { message })
            }
        }
    }
}

/// Owns the [`AppState`] and publishes an event after every change.
#[derive(Debug, Default)]
pub struct Store {
    state: AppState,
    events: Option<mpsc::UnboundedSender<BriefingEvent>>,
}

impl Store {
    /// A store without subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store plus the receiving end of its event channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BriefingEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Self {
            state: AppState::default(),
            events: Some(tx),
        };
        (store, rx)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        if let Some(event) = self.state.apply(action)
            && let Some(tx) = &self.events
            && tx.send(event).is_err()
        {
            // Receiver gone; keep the state, stop publishing.
            self.events = None;
        }
    }
}
