//! Device-free playback
//!
//! `MemoryOutput` behaves like a real output (play, pause, seek, natural end)
//! but advances its position against a [`Clock`] instead of a sound card.
//! Used for muted playback and for driving the session deterministically.

use super::{AudioOutput, OutputOpener};
use crate::audio::wav::probe_duration;
use crate::Result;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock: Send + Sync {
    fn elapsed(&self) -> Duration;
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        *self.elapsed.lock() += by;
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}

pub struct MemoryOutput {
    duration: Duration,
    clock: Arc<dyn Clock>,
    /// Position at the last play/pause/seek
    offset: Duration,
    /// Clock reading when playback last (re)started
    started_at: Option<Duration>,
}

impl MemoryOutput {
    pub fn new(duration: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            duration,
            clock,
            offset: Duration::ZERO,
            started_at: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }
}

impl AudioOutput for MemoryOutput {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn position(&self) -> Duration {
        let played = match self.started_at {
            Some(start) => self.clock.elapsed().saturating_sub(start),
            None => Duration::ZERO,
        };
        (self.offset + played).min(self.duration)
    }

    fn play(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.elapsed());
        }
    }

    fn pause(&mut self) {
        self.offset = self.position();
        self.started_at = None;
    }

    fn seek(&mut self, position: Duration) {
        self.offset = position.min(self.duration);
        if self.started_at.is_some() {
            self.started_at = Some(self.clock.elapsed());
        }
    }

    fn is_finished(&self) -> bool {
        self.is_playing() && self.position() >= self.duration
    }
}

/// Opens WAV recordings as [`MemoryOutput`]s sharing one clock.
#[derive(Clone)]
pub struct MemoryOpener {
    clock: Arc<dyn Clock>,
}

impl MemoryOpener {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Opener that follows wall-clock time
    pub fn realtime() -> Self {
        Self::new(Arc::new(SystemClock::new()))
    }
}

impl OutputOpener for MemoryOpener {
    fn open(&self, locator: &Path) -> Result<Box<dyn AudioOutput>> {
        let duration = probe_duration(locator)?;
        debug!("Opened {:?} without a device ({:?})", locator, duration);
        Ok(Box::new(MemoryOutput::new(duration, Arc::clone(&self.clock))))
    }
}
