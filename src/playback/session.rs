//! Playback state machine for one loaded recording
//!
//! A session wraps an [`AudioOutput`], owns the current [`PlaybackState`] and
//! reports every transition through its update callback. While playing it
//! keeps a recurring tick schedule; the owner's event loop waits on
//! [`PlaybackSession::tick_receiver`] and calls [`PlaybackSession::tick`].

use super::state::{Phase, PlaybackState};
use crate::audio::{AudioOutput, OutputOpener};
use crossbeam_channel::{never, tick, Receiver};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

type Update = Box<dyn FnMut(&PlaybackState)>;

pub struct PlaybackSession {
    /// `None` once opening failed; the session is inert from then on
    output: Option<Box<dyn AudioOutput>>,
    state: PlaybackState,
    /// Armed only while playing. Dropping it cancels the schedule.
    schedule: Option<Receiver<Instant>>,
    tick_interval: Duration,
    update: Update,
}

impl PlaybackSession {
    /// Open `locator` for playback.
    ///
    /// `update` fires exactly once before this returns: with
    /// `Loaded(Stopped, duration, 0)` on success or `NotLoaded` on failure.
    pub fn open<F>(
        locator: &Path,
        opener: &dyn OutputOpener,
        tick_interval: Duration,
        update: F,
    ) -> Self
    where
        F: FnMut(&PlaybackState) + 'static,
    {
        let mut session = Self {
            output: None,
            state: PlaybackState::NotLoaded,
            schedule: None,
            tick_interval,
            update: Box::new(update),
        };

        match opener.open(locator) {
            Ok(output) => {
                info!("Loaded {:?} ({:?})", locator, output.duration());
                session.output = Some(output);
                session.transition(Phase::Stopped, Duration::ZERO);
            }
            Err(e) => {
                warn!("Failed to open {:?}: {}", locator, e);
                (session.update)(&session.state);
            }
        }

        session
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.output.is_some()
    }

    /// True while a tick schedule is armed
    pub fn is_ticking(&self) -> bool {
        self.schedule.is_some()
    }

    /// Receiver that yields once per tick while playing and never otherwise
    pub fn tick_receiver(&self) -> Receiver<Instant> {
        self.schedule.clone().unwrap_or_else(never)
    }

    /// Pause when playing, otherwise start or resume from the current position.
    pub fn toggle_play(&mut self) {
        let Some(output) = self.output.as_mut() else {
            return;
        };

        if self.state.is_playing() {
            output.pause();
            self.schedule = None;
            let position = output.position();
            debug!("Paused at {:?}", position);
            self.transition(Phase::Paused, position);
        } else {
            output.play();
            let position = output.position();
            debug!("Playing from {:?}", position);
            self.transition(Phase::Playing, position);
            self.schedule = Some(tick(self.tick_interval));
        }
    }

    /// Move the play head, keeping the current phase.
    ///
    /// Positions past the end are clamped to the item's duration.
    pub fn set_progress(&mut self, position: Duration) {
        let Some(output) = self.output.as_mut() else {
            return;
        };
        let Some(phase) = self.state.phase() else {
            return;
        };

        let position = position.min(output.duration());
        output.seek(position);
        debug!("Seeked to {:?}", position);
        self.transition(phase, position);
    }

    /// Re-read the live position. Does nothing unless a schedule is armed.
    pub fn tick(&mut self) {
        if self.schedule.is_none() {
            return;
        }
        let Some(output) = self.output.as_ref() else {
            return;
        };

        if output.is_finished() {
            self.playback_finished();
            return;
        }

        let position = output.position();
        trace!("Tick at {:?}", position);
        self.transition(Phase::Playing, position);
    }

    /// The output played through to the end of the item.
    ///
    /// Cancels ticking and rewinds to the start. Ignored unless playing.
    pub fn playback_finished(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        let Some(output) = self.output.as_mut() else {
            return;
        };

        self.schedule = None;
        output.pause();
        output.seek(Duration::ZERO);
        info!("Playback finished");
        self.transition(Phase::Stopped, Duration::ZERO);
    }

    fn transition(&mut self, phase: Phase, progress: Duration) {
        let Some(output) = self.output.as_ref() else {
            return;
        };

        self.state = PlaybackState::Loaded {
            phase,
            duration: output.duration(),
            progress,
        };
        (self.update)(&self.state);
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        // Cancel ticking before the output goes away
        self.schedule = None;
        if let Some(mut output) = self.output.take() {
            output.pause();
            debug!("Released playback output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{ManualClock, MemoryOutput};
    use crate::{RecordingsError, Result};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    type Log = Rc<RefCell<Vec<PlaybackState>>>;

    fn opener_for(secs: u64, clock: &ManualClock) -> impl OutputOpener {
        let clock = clock.clone();
        move |_: &Path| -> Result<Box<dyn AudioOutput>> {
            Ok(Box::new(MemoryOutput::new(
                Duration::from_secs(secs),
                Arc::new(clock.clone()),
            )))
        }
    }

    fn failing_opener() -> impl OutputOpener {
        |_: &Path| -> Result<Box<dyn AudioOutput>> {
            Err(RecordingsError::UnsupportedFormat("not audio".into()))
        }
    }

    fn open(opener: &dyn OutputOpener) -> (PlaybackSession, Log) {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        let session = PlaybackSession::open(
            Path::new("take-1.wav"),
            opener,
            DEFAULT_TICK_INTERVAL,
            move |state| sink.borrow_mut().push(*state),
        );
        (session, log)
    }

    fn loaded(phase: Phase, duration_ms: u64, progress_ms: u64) -> PlaybackState {
        PlaybackState::Loaded {
            phase,
            duration: Duration::from_millis(duration_ms),
            progress: Duration::from_millis(progress_ms),
        }
    }

    #[test]
    fn test_open_success_notifies_once() {
        let clock = ManualClock::new();
        let (session, log) = open(&opener_for(120, &clock));

        assert_eq!(session.state(), loaded(Phase::Stopped, 120_000, 0));
        assert_eq!(*log.borrow(), vec![loaded(Phase::Stopped, 120_000, 0)]);
        assert!(!session.is_ticking());
    }

    #[test]
    fn test_open_failure_is_inert() {
        let (mut session, log) = open(&failing_opener());

        assert_eq!(session.state(), PlaybackState::NotLoaded);
        assert_eq!(log.borrow().len(), 1);

        session.toggle_play();
        session.set_progress(Duration::from_secs(3));
        session.tick();
        session.playback_finished();

        assert_eq!(session.state(), PlaybackState::NotLoaded);
        assert_eq!(log.borrow().len(), 1);
        assert!(!session.is_ticking());
    }

    #[test]
    fn test_toggle_from_stopped_plays_then_pauses() {
        let clock = ManualClock::new();
        let (mut session, _log) = open(&opener_for(10, &clock));

        session.toggle_play();
        assert_eq!(session.state().phase(), Some(Phase::Playing));
        assert!(session.is_ticking());

        session.toggle_play();
        assert_eq!(session.state().phase(), Some(Phase::Paused));
        assert!(!session.is_ticking());
    }

    #[test]
    fn test_pause_captures_exact_position() {
        let clock = ManualClock::new();
        let (mut session, _log) = open(&opener_for(10, &clock));

        session.toggle_play();
        clock.advance(Duration::from_millis(1234));
        session.toggle_play();

        assert_eq!(session.state(), loaded(Phase::Paused, 10_000, 1_234));

        // resuming continues from where it paused
        clock.advance(Duration::from_secs(4));
        session.toggle_play();
        assert_eq!(session.state(), loaded(Phase::Playing, 10_000, 1_234));
    }

    #[test]
    fn test_seek_keeps_phase() {
        let clock = ManualClock::new();
        let (mut session, log) = open(&opener_for(30, &clock));

        session.set_progress(Duration::from_secs(5));
        assert_eq!(session.state(), loaded(Phase::Stopped, 30_000, 5_000));

        session.toggle_play();
        session.set_progress(Duration::from_secs(12));
        assert_eq!(session.state(), loaded(Phase::Playing, 30_000, 12_000));

        session.toggle_play();
        session.set_progress(Duration::from_secs(2));
        assert_eq!(session.state(), loaded(Phase::Paused, 30_000, 2_000));

        // open + 3 seeks + 2 toggles
        assert_eq!(log.borrow().len(), 6);
    }

    #[test]
    fn test_seek_past_end_is_clamped() {
        let clock = ManualClock::new();
        let (mut session, _log) = open(&opener_for(30, &clock));

        session.set_progress(Duration::from_secs(90));
        assert_eq!(session.state(), loaded(Phase::Stopped, 30_000, 30_000));
    }

    #[test]
    fn test_ticks_report_non_decreasing_progress() {
        let clock = ManualClock::new();
        let (mut session, log) = open(&opener_for(10, &clock));
        session.toggle_play();

        for _ in 0..6 {
            clock.advance(Duration::from_millis(50));
            session.tick();
        }

        let progress: Vec<Duration> = log.borrow().iter().skip(1).map(|s| s.progress()).collect();
        assert_eq!(progress.len(), 7);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert!(log.borrow().iter().skip(1).all(|s| s.is_playing()));
    }

    #[test]
    fn test_tick_without_schedule_is_silent() {
        let clock = ManualClock::new();
        let (mut session, log) = open(&opener_for(10, &clock));

        session.tick();
        session.toggle_play();
        session.toggle_play();
        clock.advance(Duration::from_secs(1));
        session.tick();

        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_natural_end_resets_to_stopped() {
        let clock = ManualClock::new();
        let (mut session, log) = open(&opener_for(2, &clock));
        session.toggle_play();

        clock.advance(Duration::from_secs(3));
        session.tick();

        assert_eq!(session.state(), loaded(Phase::Stopped, 2_000, 0));
        assert!(!session.is_ticking());

        let notified = log.borrow().len();
        clock.advance(Duration::from_secs(1));
        session.tick();
        assert_eq!(log.borrow().len(), notified);

        // a new play starts from the beginning
        session.toggle_play();
        assert_eq!(session.state(), loaded(Phase::Playing, 2_000, 0));
    }

    #[test]
    fn test_finished_event_ignored_unless_playing() {
        let clock = ManualClock::new();
        let (mut session, log) = open(&opener_for(5, &clock));

        session.set_progress(Duration::from_secs(3));
        session.playback_finished();

        assert_eq!(session.state(), loaded(Phase::Stopped, 5_000, 3_000));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_drop_while_playing_cancels_ticks() {
        let clock = ManualClock::new();
        let (mut session, log) = open(&opener_for(10, &clock));
        session.toggle_play();
        let ticks = session.tick_receiver();

        drop(session);
        let notified = log.borrow().len();

        std::thread::sleep(DEFAULT_TICK_INTERVAL * 2);
        assert_eq!(log.borrow().len(), notified);
        // the caller's clone still fires, but there is no session left to notify
        assert!(ticks.try_recv().is_ok());
    }

    #[test]
    fn test_tick_receiver_fires_while_playing() {
        let clock = ManualClock::new();
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        let mut session = PlaybackSession::open(
            Path::new("take-2.wav"),
            &opener_for(10, &clock),
            Duration::from_millis(5),
            move |state| sink.borrow_mut().push(*state),
        );

        assert!(session
            .tick_receiver()
            .recv_timeout(Duration::from_millis(30))
            .is_err());

        session.toggle_play();
        assert!(session
            .tick_receiver()
            .recv_timeout(Duration::from_millis(200))
            .is_ok());
    }

    #[test]
    fn test_scenario_two_minute_recording() {
        let clock = ManualClock::new();
        let (mut session, _log) = open(&opener_for(120, &clock));
        assert_eq!(session.state(), loaded(Phase::Stopped, 120_000, 0));

        session.toggle_play();
        assert_eq!(session.state(), loaded(Phase::Playing, 120_000, 0));

        for _ in 0..4 {
            clock.advance(DEFAULT_TICK_INTERVAL);
            session.tick();
        }
        let progress = session.state().progress();
        assert!(progress > Duration::ZERO && progress <= Duration::from_millis(250));
        assert!(session.state().is_playing());

        session.set_progress(Duration::from_secs(60));
        assert_eq!(session.state(), loaded(Phase::Playing, 120_000, 60_000));

        session.toggle_play();
        assert_eq!(session.state(), loaded(Phase::Paused, 120_000, 60_000));
        assert!(!session.is_ticking());
    }
}
