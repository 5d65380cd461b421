pub mod host;
pub mod observers;
pub mod service;
pub mod session;
pub mod state;

pub use host::SessionHost;
pub use observers::{Observers, SubscriptionId};
pub use service::{PlayerCommand, PlayerHandle, PlayerService};
pub use session::{PlaybackSession, DEFAULT_TICK_INTERVAL};
pub use state::{Phase, PlaybackState};
