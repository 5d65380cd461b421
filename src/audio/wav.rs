use crate::{RecordingsError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Write audio samples to a WAV file
///
/// # Arguments
/// * `path` - Path to the output WAV file
/// * `samples` - Interleaved audio samples (f32, range -1.0 to 1.0)
/// * `sample_rate` - Sample rate in Hz
/// * `channels` - Number of channels
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path.as_ref(), spec)
        .map_err(|e| RecordingsError::IOError(format!("Failed to create WAV writer: {}", e)))?;

    for &sample in samples {
        let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| RecordingsError::IOError(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| RecordingsError::IOError(format!("Failed to finalize WAV file: {}", e)))?;

    info!("Wrote {} samples to WAV file: {:?}", samples.len(), path.as_ref());
    Ok(())
}

/// Read only the header of a WAV file and report its playing time.
pub fn probe_duration<P: AsRef<Path>>(path: P) -> Result<Duration> {
    let reader = open_reader(path.as_ref())?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(RecordingsError::UnsupportedFormat(
            "WAV header has a zero sample rate".into(),
        ));
    }

    // duration() counts frames, i.e. samples per channel
    let frames = reader.duration() as f64;
    Ok(Duration::from_secs_f64(frames / spec.sample_rate as f64))
}

fn open_reader(path: &Path) -> Result<WavReader<std::io::BufReader<std::fs::File>>> {
    WavReader::open(path).map_err(|e| match e {
        hound::Error::IoError(io) => {
            RecordingsError::IOError(format!("Failed to open WAV file {:?}: {}", path, io))
        }
        other => RecordingsError::UnsupportedFormat(format!("{:?}: {}", path, other)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sine(frames: usize, channels: u16) -> Vec<f32> {
        (0..frames * channels as usize)
            .map(|i| (i as f32 * 0.01).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_probe_duration_counts_frames() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stereo.wav");
        // 1.5 s of stereo audio at 8 kHz
        write_wav(&path, &sine(12_000, 2), 8_000, 2).unwrap();

        let duration = probe_duration(&path).unwrap();
        assert_eq!(duration, Duration::from_millis(1500));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = probe_duration(dir.path().join("nope.wav")).unwrap_err();
        assert!(matches!(err, RecordingsError::IOError(_)));
    }

    #[test]
    fn test_garbage_file_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();

        let err = probe_duration(&path).unwrap_err();
        assert!(matches!(err, RecordingsError::UnsupportedFormat(_)));
    }
}
