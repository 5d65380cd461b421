use super::{AudioOutput, OutputOpener};
use crate::{RecordingsError, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use rodio::{Decoder, OutputStream, Sink, Source};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

type SourceBytes = Cursor<Arc<[u8]>>;

/// Plays a recording through the default output device.
///
/// The file is read into memory once so the item can be re-armed after it
/// played to the end.
pub struct DeviceOutput {
    _stream: OutputStream,
    sink: Sink,
    data: Arc<[u8]>,
    duration: Duration,
}

impl DeviceOutput {
    /// Open a recording on the default output device
    pub fn open(path: &Path) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| RecordingsError::AudioDeviceError("No output device available".into()))?;

        info!("Using output device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));

        let data: Arc<[u8]> = std::fs::read(path)
            .map_err(|e| RecordingsError::IOError(format!("Failed to read {:?}: {}", path, e)))?
            .into();

        let decoder = decode(&data)?;
        let duration = decoder.total_duration().ok_or_else(|| {
            RecordingsError::UnsupportedFormat(format!("Unknown duration for {:?}", path))
        })?;

        let (stream, handle) = OutputStream::try_from_device(&device)
            .map_err(|e| RecordingsError::AudioDeviceError(format!("Failed to open output stream: {}", e)))?;

        let sink = Sink::try_new(&handle)
            .map_err(|e| RecordingsError::AudioDeviceError(format!("Failed to create sink: {}", e)))?;
        sink.pause();
        sink.append(decoder);

        debug!("Loaded {:?} ({:?})", path, duration);

        Ok(Self {
            _stream: stream,
            sink,
            data,
            duration,
        })
    }

    /// Queue the item again after the sink ran dry, paused at the start
    fn rearm(&mut self) {
        if !self.sink.empty() {
            return;
        }

        match decode(&self.data) {
            Ok(decoder) => {
                self.sink.pause();
                self.sink.append(decoder);
            }
            Err(e) => warn!("Failed to re-arm recording: {}", e),
        }
    }
}

impl AudioOutput for DeviceOutput {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn position(&self) -> Duration {
        if self.sink.empty() {
            return self.duration;
        }
        self.sink.get_pos().min(self.duration)
    }

    fn play(&mut self) {
        self.rearm();
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn seek(&mut self, position: Duration) {
        self.rearm();
        if let Err(e) = self.sink.try_seek(position.min(self.duration)) {
            warn!("Seek to {:?} failed: {}", position, e);
        }
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

impl Drop for DeviceOutput {
    fn drop(&mut self) {
        self.sink.stop();
    }
}

fn decode(data: &Arc<[u8]>) -> Result<Decoder<SourceBytes>> {
    Decoder::new(Cursor::new(Arc::clone(data)))
        .map_err(|e| RecordingsError::UnsupportedFormat(format!("Failed to decode audio: {}", e)))
}

/// Opens recordings on the system's default output device.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceOpener;

impl OutputOpener for DeviceOpener {
    fn open(&self, locator: &Path) -> Result<Box<dyn AudioOutput>> {
        Ok(Box::new(DeviceOutput::open(locator)?))
    }
}
