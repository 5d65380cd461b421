//! Thread-owned playback host
//!
//! `PlayerService` runs a [`SessionHost`] on its own thread. Everything that
//! touches the session goes through the command channel, so state changes
//! and ticks are serialized on that one thread.

use super::host::SessionHost;
use super::state::PlaybackState;
use crate::audio::OutputOpener;
use crate::config::PlayerConfig;
use crate::library::{Recording, StoreChange};
use crate::{RecordingsError, Result};
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

const STATE_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Commands that can be sent to the player service
#[derive(Debug)]
pub enum PlayerCommand {
    /// Replace the selected recording (`None` clears it)
    Select(Option<Recording>),

    /// Play, pause or resume
    TogglePlay,

    /// Seek, in seconds
    SetProgress(f64),

    /// Forward every state change to this sender
    Subscribe(Sender<PlaybackState>),

    /// Reply with the current state
    QueryState(Sender<PlaybackState>),

    /// A change in the recording store
    StoreChanged(StoreChange),

    /// Shutdown the service
    Shutdown,
}

/// Handle for controlling the player from other threads
#[derive(Clone)]
pub struct PlayerHandle {
    command_tx: Sender<PlayerCommand>,
}

impl PlayerHandle {
    /// Send a command to the service
    pub fn send_command(&self, cmd: PlayerCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| RecordingsError::ChannelError(format!("Failed to send command: {}", e)))
    }

    pub fn select(&self, recording: Option<Recording>) -> Result<()> {
        self.send_command(PlayerCommand::Select(recording))
    }

    pub fn toggle_play(&self) -> Result<()> {
        self.send_command(PlayerCommand::TogglePlay)
    }

    pub fn set_progress(&self, seconds: f64) -> Result<()> {
        self.send_command(PlayerCommand::SetProgress(seconds))
    }

    pub fn store_changed(&self, change: StoreChange) -> Result<()> {
        self.send_command(PlayerCommand::StoreChanged(change))
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> Result<Receiver<PlaybackState>> {
        let (tx, rx) = unbounded();
        self.send_command(PlayerCommand::Subscribe(tx))?;
        Ok(rx)
    }

    /// Ask the service thread for the current state
    pub fn state(&self) -> Result<PlaybackState> {
        let (tx, rx) = bounded(1);
        self.send_command(PlayerCommand::QueryState(tx))?;
        rx.recv_timeout(STATE_QUERY_TIMEOUT)
            .map_err(|e| RecordingsError::ChannelError(format!("No state reply: {}", e)))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send_command(PlayerCommand::Shutdown)
    }
}

pub struct PlayerService {
    host: SessionHost,
    command_rx: Receiver<PlayerCommand>,
}

impl PlayerService {
    /// Spawn the service thread.
    ///
    /// The host, and every output it opens, lives on that thread only.
    pub fn start<O>(config: PlayerConfig, opener: O) -> Result<(PlayerHandle, JoinHandle<()>)>
    where
        O: OutputOpener + Send + 'static,
    {
        config.validate()?;

        let (command_tx, command_rx) = bounded(config.command_buffer);
        let tick_interval = config.tick_interval();

        let thread = thread::Builder::new()
            .name("playback-host".into())
            .spawn(move || {
                let service = PlayerService {
                    host: SessionHost::new(Box::new(opener), tick_interval),
                    command_rx,
                };
                service.run();
            })
            .map_err(|e| RecordingsError::ChannelError(format!("Failed to spawn service thread: {}", e)))?;

        info!("Player service started");
        Ok((PlayerHandle { command_tx }, thread))
    }

    fn run(mut self) {
        let commands = self.command_rx.clone();
        loop {
            // re-read every turn; the schedule changes with the session
            let ticks = self.host.tick_receiver();
            select! {
                recv(commands) -> cmd => match cmd {
                    Ok(cmd) => {
                        if !self.handle(cmd) {
                            break;
                        }
                    }
                    Err(_) => {
                        debug!("All player handles dropped");
                        break;
                    }
                },
                recv(ticks) -> _ => self.host.tick(),
            }
        }

        // tear the session down on this thread
        self.host.select(None);
        info!("Player service stopped");
    }

    /// Returns false when the service should stop
    fn handle(&mut self, cmd: PlayerCommand) -> bool {
        match cmd {
            PlayerCommand::Select(recording) => self.host.select(recording),
            PlayerCommand::TogglePlay => self.host.toggle_play(),
            PlayerCommand::SetProgress(seconds) => self.host.set_progress_secs(seconds),
            PlayerCommand::Subscribe(tx) => {
                self.host.observers().subscribe_sender(tx);
            }
            PlayerCommand::QueryState(reply) => {
                if reply.send(self.host.state()).is_err() {
                    warn!("State query caller went away");
                }
            }
            PlayerCommand::StoreChanged(change) => {
                self.host.apply_store_change(&change);
            }
            PlayerCommand::Shutdown => return false,
        }
        true
    }
}
