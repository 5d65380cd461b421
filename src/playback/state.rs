use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sub-state of a loaded session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Stopped,
    Playing,
    Paused,
}

/// Snapshot of a playback session.
///
/// Replaced as a whole on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing selected, or the selected item failed to open
    #[default]
    NotLoaded,
    Loaded {
        phase: Phase,
        duration: Duration,
        progress: Duration,
    },
}

impl PlaybackState {
    pub fn phase(&self) -> Option<Phase> {
        match self {
            PlaybackState::NotLoaded => None,
            PlaybackState::Loaded { phase, .. } => Some(*phase),
        }
    }

    /// Play head position; zero when nothing is loaded
    pub fn progress(&self) -> Duration {
        match self {
            PlaybackState::NotLoaded => Duration::ZERO,
            PlaybackState::Loaded { progress, .. } => *progress,
        }
    }

    /// Item length; zero when nothing is loaded
    pub fn duration(&self) -> Duration {
        match self {
            PlaybackState::NotLoaded => Duration::ZERO,
            PlaybackState::Loaded { duration, .. } => *duration,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, PlaybackState::Loaded { .. })
    }

    pub fn is_playing(&self) -> bool {
        self.phase() == Some(Phase::Playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_loaded_reads_as_zero() {
        let state = PlaybackState::default();
        assert_eq!(state, PlaybackState::NotLoaded);
        assert_eq!(state.phase(), None);
        assert_eq!(state.progress(), Duration::ZERO);
        assert_eq!(state.duration(), Duration::ZERO);
        assert!(!state.is_loaded());
        assert!(!state.is_playing());
    }

    #[test]
    fn test_loaded_accessors() {
        let state = PlaybackState::Loaded {
            phase: Phase::Playing,
            duration: Duration::from_secs(120),
            progress: Duration::from_secs(60),
        };
        assert_eq!(state.phase(), Some(Phase::Playing));
        assert_eq!(state.duration(), Duration::from_secs(120));
        assert_eq!(state.progress(), Duration::from_secs(60));
        assert!(state.is_playing());
    }
}
