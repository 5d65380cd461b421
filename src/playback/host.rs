//! Owner of the one current playback session
//!
//! The host keeps the selected recording, rebuilds the session whenever the
//! selection changes, and relays every state change to its observers.

use super::observers::{Observers, SubscriptionId};
use super::session::PlaybackSession;
use super::state::PlaybackState;
use crate::audio::OutputOpener;
use crate::library::{NavigationState, Recording, Store, StoreChange};
use crossbeam_channel::{never, Receiver};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct SessionHost {
    opener: Box<dyn OutputOpener>,
    tick_interval: Duration,
    recording: Option<Recording>,
    session: Option<PlaybackSession>,
    observers: Observers,
}

impl SessionHost {
    pub fn new(opener: Box<dyn OutputOpener>, tick_interval: Duration) -> Self {
        Self {
            opener,
            tick_interval,
            recording: None,
            session: None,
            observers: Observers::new(),
        }
    }

    pub fn observers(&self) -> &Observers {
        &self.observers
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: FnMut(&PlaybackState) + Send + 'static,
    {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn recording(&self) -> Option<&Recording> {
        self.recording.as_ref()
    }

    pub fn state(&self) -> PlaybackState {
        self.session
            .as_ref()
            .map(PlaybackSession::state)
            .unwrap_or_default()
    }

    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    /// Replace the selection.
    ///
    /// The old session is torn down before the new one is opened. Selecting
    /// nothing, or a recording without a file, publishes `NotLoaded`.
    pub fn select(&mut self, recording: Option<Recording>) {
        // old session releases its output before the next one opens
        self.session = None;

        self.recording = recording;
        let file = self.recording.as_ref().and_then(|r| r.file.clone());

        match file {
            Some(file) => {
                info!("Selected {:?}", file);
                let observers = self.observers.clone();
                self.session = Some(PlaybackSession::open(
                    &file,
                    self.opener.as_ref(),
                    self.tick_interval,
                    move |state| observers.publish(state),
                ));
            }
            None => {
                debug!("Nothing playable selected");
                self.observers.publish(&PlaybackState::NotLoaded);
            }
        }
    }

    pub fn toggle_play(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.toggle_play();
        }
    }

    pub fn set_progress(&mut self, position: Duration) {
        if let Some(session) = self.session.as_mut() {
            session.set_progress(position);
        }
    }

    /// Seek using seconds, as a slider reports them.
    ///
    /// Negative or NaN is 0; anything past the end lands on the end.
    pub fn set_progress_secs(&mut self, seconds: f64) {
        let position = if seconds.is_nan() || seconds <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
        };
        self.set_progress(position);
    }

    pub fn tick(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.tick();
        }
    }

    /// Tick schedule of the current session
    pub fn tick_receiver(&self) -> Receiver<Instant> {
        self.session
            .as_ref()
            .map(PlaybackSession::tick_receiver)
            .unwrap_or_else(never)
    }

    /// Keep the selected recording in sync with the store.
    ///
    /// A rename republishes the current state so views pick up the new
    /// name. Returns true when the selected recording was renamed or removed.
    pub fn apply_store_change(&mut self, change: &StoreChange) -> bool {
        let Some(recording) = self.recording.as_mut() else {
            return false;
        };
        if recording.id != change.id() {
            return false;
        }

        match change {
            StoreChange::Renamed { name, .. } => {
                recording.name = name.clone();
                self.observers.publish(&self.state());
            }
            StoreChange::Removed { .. } => {
                info!("Selected recording was removed");
                self.select(None);
            }
            StoreChange::Added { .. } => return false,
        }
        true
    }

    pub fn navigation_state(&self, store: &Store) -> Option<NavigationState> {
        let recording = self.recording.as_ref()?;
        NavigationState::for_recording(store, recording.id)
    }

    /// Re-select the recording a saved state points at.
    ///
    /// Returns false, leaving the selection alone, if it no longer exists.
    pub fn restore(&mut self, state: &NavigationState, store: &Store) -> bool {
        match store.recording_at_uuid_path(&state.uuid_path) {
            Some(recording) => {
                info!("Restoring selection of {:?}", recording.name);
                self.select(Some(recording));
                true
            }
            None => {
                debug!("Saved selection no longer exists");
                false
            }
        }
    }
}
