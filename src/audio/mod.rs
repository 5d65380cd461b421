//! Audio output seam
//!
//! The playback session only ever talks to an [`AudioOutput`]. Outputs are
//! created by an [`OutputOpener`], which is the one place loading can fail.

pub mod memory;
#[cfg(feature = "audio-io")]
pub mod output;
pub mod wav;

pub use memory::{Clock, ManualClock, MemoryOpener, MemoryOutput, SystemClock};
#[cfg(feature = "audio-io")]
pub use output::{DeviceOpener, DeviceOutput};
pub use wav::{probe_duration, write_wav};

use crate::Result;
use std::path::Path;
use std::time::Duration;

/// A loaded, playable audio item.
///
/// Once opened, operations are expected to succeed; implementations log
/// device hiccups instead of returning them.
pub trait AudioOutput {
    /// Total length, fixed at open time
    fn duration(&self) -> Duration;

    /// Live playback position, never past `duration()`
    fn position(&self) -> Duration;

    /// Start or resume from the current position
    fn play(&mut self);

    fn pause(&mut self);

    /// Move the play head. Keeps playing if already playing.
    fn seek(&mut self, position: Duration);

    /// True once the item played through to its end
    fn is_finished(&self) -> bool;
}

/// Opens a locally addressable audio resource for playback.
pub trait OutputOpener {
    fn open(&self, locator: &Path) -> Result<Box<dyn AudioOutput>>;
}

impl<F> OutputOpener for F
where
    F: Fn(&Path) -> Result<Box<dyn AudioOutput>>,
{
    fn open(&self, locator: &Path) -> Result<Box<dyn AudioOutput>> {
        self(locator)
    }
}
