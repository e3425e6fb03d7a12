use std::sync::{Arc, RwLock};

use sqlchat_types::StateEvent;
use tokio::sync::mpsc;

/// Receives state-changed notifications from the controller
///
/// Called synchronously after the state lock is released, so implementations
/// may read controller state but should return quickly.
pub trait StateObserver: Send + Sync {
    fn on_event(&self, event: &StateEvent);
}

/// Forwards every event into an unbounded channel
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<StateEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StateEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StateObserver for ChannelObserver {
    fn on_event(&self, event: &StateEvent) {
        // A closed receiver just means nobody is listening any more
        let _ = self.tx.send(event.clone());
    }
}

#[derive(Default)]
pub(crate) struct Observers {
    list: RwLock<Vec<Arc<dyn StateObserver>>>,
}

impl Observers {
    pub fn add(&self, observer: Arc<dyn StateObserver>) {
        match self.list.write() {
            Ok(mut list) => list.push(observer),
            Err(poisoned) => poisoned.into_inner().push(observer),
        }
    }

    pub fn notify(&self, events: &[StateEvent]) {
        if events.is_empty() {
            return;
        }
        let observers: Vec<Arc<dyn StateObserver>> = match self.list.read() {
            Ok(list) => list.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for event in events {
            for observer in &observers {
                observer.on_event(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_observer_forwards_in_order() {
        let (observer, mut rx) = ChannelObserver::new();
        let observers = Observers::default();
        observers.add(Arc::new(observer));

        observers.notify(&[
            StateEvent::ThreadListChanged,
            StateEvent::SendStateChanged { sending: true },
        ]);

        assert_eq!(rx.recv().await, Some(StateEvent::ThreadListChanged));
        assert_eq!(rx.recv().await, Some(StateEvent::SendStateChanged { sending: true }));
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (observer, rx) = ChannelObserver::new();
        drop(rx);
        observer.on_event(&StateEvent::ThreadListChanged);
    }
}
