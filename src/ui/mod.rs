pub mod player_view;

pub use player_view::{
    affects_recording, button_title, mini_player_visible, should_collapse_detail, time_string,
    PlayerView, NO_RECORDING_TEXT,
};
