//! Typed publish/subscribe channels.

use log::debug;
use tokio::sync::{broadcast, watch};

use crate::api::models::{ManagerState, WifiEvent};

/// Fan-out of domain events plus the latest manager state.
///
/// Events go to a broadcast channel; a subscriber that falls behind by more
/// than the configured capacity sees `RecvError::Lagged` and skips ahead.
/// The manager state lives in a watch channel so late subscribers still see
/// the current value.
#[derive(Debug)]
pub(crate) struct EventBus {
    events: broadcast::Sender<WifiEvent>,
    state: watch::Sender<ManagerState>,
}

impl EventBus {
    pub(crate) fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        let (state, _) = watch::channel(ManagerState::Unknown);
        Self { events, state }
    }

    /// Publishes an event to all current subscribers.
    pub(crate) fn publish(&self, event: WifiEvent) {
        if let Err(broadcast::error::SendError(event)) = self.events.send(event) {
            debug!("No subscribers for {event:?}");
        }
    }

    /// Records a new manager state.
    pub(crate) fn publish_state(&self, state: ManagerState) {
        self.state.send_replace(state);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<WifiEvent> {
        self.events.subscribe()
    }

    pub(crate) fn state_changes(&self) -> watch::Receiver<ManagerState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let bus = EventBus::new(4);
        bus.publish(WifiEvent::ConnectedGlobal);
    }

    #[test]
    fn subscribers_receive_in_order() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        bus.publish(WifiEvent::ConnectedGlobal);
        bus.publish(WifiEvent::CurrentStrengthChanged);

        assert_eq!(rx.try_recv().unwrap(), WifiEvent::ConnectedGlobal);
        assert_eq!(rx.try_recv().unwrap(), WifiEvent::CurrentStrengthChanged);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn state_channel_keeps_latest_value() {
        let bus = EventBus::new(1);
        bus.publish_state(ManagerState::Connecting);
        bus.publish_state(ManagerState::ConnectedGlobal);

        let rx = bus.state_changes();
        assert_eq!(*rx.borrow(), ManagerState::ConnectedGlobal);
    }
}
