//! Publish/subscribe list for session state changes

use super::state::PlaybackState;
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;

/// Handle returned by [`Observers::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Returns false once it no longer wants updates
type Observer = Box<dyn FnMut(&PlaybackState) -> bool + Send>;

#[derive(Default)]
struct ObserverList {
    next_id: u64,
    entries: Vec<(SubscriptionId, Observer)>,
}

/// Registration list of state-change callbacks.
///
/// Callbacks run synchronously, in registration order, on the thread that
/// publishes. They must not subscribe or unsubscribe from inside a callback.
#[derive(Clone, Default)]
pub struct Observers {
    inner: Arc<Mutex<ObserverList>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, mut observer: F) -> SubscriptionId
    where
        F: FnMut(&PlaybackState) + Send + 'static,
    {
        self.register(Box::new(move |state: &PlaybackState| {
            observer(state);
            true
        }))
    }

    /// Forward every state to `tx`. Dropped from the list once the
    /// receiving side is gone.
    pub fn subscribe_sender(&self, tx: Sender<PlaybackState>) -> SubscriptionId {
        self.register(Box::new(move |state: &PlaybackState| tx.send(*state).is_ok()))
    }

    fn register(&self, observer: Observer) -> SubscriptionId {
        let mut list = self.inner.lock();
        let id = SubscriptionId(list.next_id);
        list.next_id += 1;
        list.entries.push((id, observer));
        id
    }

    /// Returns false if the id was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut list = self.inner.lock();
        let before = list.entries.len();
        list.entries.retain(|(entry, _)| *entry != id);
        list.entries.len() != before
    }

    pub fn publish(&self, state: &PlaybackState) {
        let mut list = self.inner.lock();
        trace!("Publishing {:?} to {} observers", state, list.entries.len());
        list.entries.retain_mut(|(_, observer)| observer(state));
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observers_called_in_registration_order() {
        let observers = Observers::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            observers.subscribe(move |_| calls.lock().push(name));
        }

        observers.publish(&PlaybackState::NotLoaded);
        assert_eq!(*calls.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let observers = Observers::new();
        let count = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&count);
        let id = observers.subscribe(move |_| *counter.lock() += 1);
        observers.publish(&PlaybackState::NotLoaded);

        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.publish(&PlaybackState::NotLoaded);

        assert_eq!(*count.lock(), 1);
        assert!(observers.is_empty());
    }

    #[test]
    fn test_closed_senders_are_dropped() {
        let observers = Observers::new();
        for _ in 0..100 {
            let (tx, rx) = crossbeam_channel::unbounded();
            observers.subscribe_sender(tx);
            drop(rx);
        }
        let (tx, live) = crossbeam_channel::unbounded();
        observers.subscribe_sender(tx);
        assert_eq!(observers.len(), 101);

        observers.publish(&PlaybackState::NotLoaded);

        assert_eq!(observers.len(), 1);
        assert_eq!(live.try_recv().unwrap(), PlaybackState::NotLoaded);
    }
}
