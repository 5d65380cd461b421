//! Display values for the player screen
//!
//! Everything here is derived from the selected recording and the current
//! [`PlaybackState`]; no toolkit types leak in.

use crate::library::{Recording, StoreChange};
use crate::playback::{Phase, PlaybackState};
use std::time::Duration;

/// Shown in place of the controls when nothing is selected
pub const NO_RECORDING_TEXT: &str = "No recording";

/// What the player screen shows for one state
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub title: String,
    pub name_field: String,
    pub progress_label: String,
    pub duration_label: String,
    pub slider_max: f32,
    pub slider_value: f32,
    pub button_title: &'static str,
    pub show_active_elements: bool,
    pub show_no_recording: bool,
}

impl PlayerView {
    pub fn new(recording: Option<&Recording>, state: &PlaybackState) -> Self {
        let name = recording.map(|r| r.name.clone()).unwrap_or_default();
        let selected = recording.is_some();

        Self {
            title: name.clone(),
            name_field: name,
            progress_label: time_string(state.progress()),
            duration_label: time_string(state.duration()),
            slider_max: state.duration().as_secs_f32(),
            slider_value: state.progress().as_secs_f32(),
            button_title: button_title(state),
            show_active_elements: selected,
            show_no_recording: !selected,
        }
    }
}

/// Play button label
pub fn button_title(state: &PlaybackState) -> &'static str {
    match state.phase() {
        None => "",
        Some(Phase::Stopped) => "Play",
        Some(Phase::Playing) => "Pause",
        Some(Phase::Paused) => "Resume playing",
    }
}

/// `m:ss`, or `h:mm:ss` from one hour up. Fractions are dropped.
pub fn time_string(time: Duration) -> String {
    let total = time.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

pub fn mini_player_visible(state: &PlaybackState) -> bool {
    state.is_playing()
}

/// An empty player is left out of a collapsed navigation stack
pub fn should_collapse_detail(recording: Option<&Recording>) -> bool {
    recording.is_none()
}

/// Whether a store change needs the player screen redrawn
pub fn affects_recording(change: &StoreChange, recording: Option<&Recording>) -> bool {
    recording.is_some_and(|r| r.id == change.id())
}
