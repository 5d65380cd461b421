use anyhow::{bail, Context, Result};
use recordings::audio::MemoryOpener;
use recordings::library::{NavigationState, Recording, Store};
use recordings::ui::{time_string, NO_RECORDING_TEXT};
use recordings::{Phase, PlaybackState, PlayerConfig, PlayerHandle, PlayerService};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: recordings [<file>] [--muted] [--config <path>]";

struct Args {
    file: Option<PathBuf>,
    muted: bool,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        file: None,
        muted: false,
        config: None,
    };
    let mut raw = std::env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--muted" => args.muted = true,
            "--config" => match raw.next() {
                Some(path) => args.config = Some(PathBuf::from(path)),
                None => bail!(USAGE),
            },
            _ if args.file.is_none() => args.file = Some(PathBuf::from(arg)),
            _ => bail!(USAGE),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recordings=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args()?;

    let mut config = match &args.config {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };
    if args.muted {
        config = config.without_audio_output();
    }

    let store = match &config.library_path {
        Some(index) => Store::load(index, index.parent().map(Path::to_path_buf))?,
        None => Store::default(),
    };

    let recording = match args.file {
        Some(file) => import(&store, &config, file)?,
        None => restore(&store, &config)?,
    };

    info!("Starting recordings player");
    let (handle, thread) = start(config.clone())?;
    let result = play(&handle, &store, &config, recording);

    handle.shutdown()?;
    if thread.join().is_err() {
        bail!("player thread panicked");
    }
    result
}

/// The store entry for `file`, added to the library if it isn't there yet
fn import(store: &Store, config: &PlayerConfig, file: PathBuf) -> Result<Recording> {
    let file = file.canonicalize().unwrap_or(file);
    if let Some(recording) = store.recording_for_file(&file) {
        debug!("Found {:?} in the library", file);
        return Ok(recording);
    }

    let name = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let recording = Recording::new(name, Some(file));
    store.insert(store.root_id(), recording.clone())?;

    if let Some(index) = &config.library_path {
        store.save(index)?;
    }
    Ok(recording)
}

/// The recording selected on the last run
fn restore(store: &Store, config: &PlayerConfig) -> Result<Recording> {
    let Some(path) = &config.navigation_state_path else {
        bail!(USAGE);
    };
    let Some(state) = NavigationState::load(path)? else {
        bail!("nothing selected yet; pass a file");
    };
    store
        .recording_at_uuid_path(&state.uuid_path)
        .context("the last selected recording is no longer in the library")
}

#[cfg(feature = "audio-io")]
fn start(config: PlayerConfig) -> Result<(PlayerHandle, JoinHandle<()>)> {
    let started = if config.enable_audio_output {
        PlayerService::start(config, recordings::audio::DeviceOpener)?
    } else {
        PlayerService::start(config, MemoryOpener::realtime())?
    };
    Ok(started)
}

#[cfg(not(feature = "audio-io"))]
fn start(config: PlayerConfig) -> Result<(PlayerHandle, JoinHandle<()>)> {
    Ok(PlayerService::start(config, MemoryOpener::realtime())?)
}

/// Play the recording once, printing progress until it stops
fn play(
    handle: &PlayerHandle,
    store: &Store,
    config: &PlayerConfig,
    recording: Recording,
) -> Result<()> {
    let name = recording.name.clone();
    let events = handle.subscribe()?;
    handle.select(Some(recording.clone()))?;

    if let Some(path) = &config.navigation_state_path {
        if let Some(state) = NavigationState::for_recording(store, recording.id) {
            state.save(path)?;
        }
    }

    let mut started = false;
    for state in events.iter() {
        match state {
            PlaybackState::NotLoaded => {
                bail!("{}: could not play {:?}", NO_RECORDING_TEXT, recording.file);
            }
            PlaybackState::Loaded {
                phase: Phase::Stopped,
                duration,
                ..
            } => {
                if started {
                    println!();
                    break;
                }
                println!("{} ({})", name, time_string(duration));
                handle.toggle_play()?;
            }
            PlaybackState::Loaded {
                phase: Phase::Playing,
                duration,
                progress,
            } => {
                started = true;
                print!("\r{} / {}", time_string(progress), time_string(duration));
                std::io::stdout().flush().context("stdout closed")?;
            }
            PlaybackState::Loaded { .. } => {}
        }
    }

    info!("Finished playing {:?}", name);
    Ok(())
}
