//! # Race Events
//!
//! Race lifecycle notifications for UI, audio, commentary or network layers.
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//! │ RaceSession │─────>│   Bounded   │─────>│  Consumer   │
//! │   (tick)    │      │   Channel   │      │ (UI, audio) │
//! └─────────────┘      └─────────────┘      └─────────────┘
//! ```
//!
//! Emitting never blocks the tick. When the consumer lags and the channel is
//! full, the event is dropped and counted.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::warn;
use trackline_core::EntityId;

/// Lifecycle events of one race.
#[derive(Clone, Debug, PartialEq)]
pub enum RaceEvent {
    /// The start countdown began.
    CountdownStarted {
        /// Countdown length (seconds).
        seconds: f32,
    },

    /// The gun went off; the race clock is running.
    RaceStarted,

    /// A runner crossed the line.
    RunnerFinished {
        /// Who finished.
        runner: EntityId,
        /// Race clock at the finish (seconds).
        finish_time: f32,
        /// Finishing place, 1-based.
        place: u32,
    },

    /// Every runner has finished.
    RaceFinished {
        /// Race clock when the last runner finished (seconds).
        elapsed: f32,
    },

    /// The field was put back in formation for a new heat.
    HeatReset,
}

/// Event bus for race events.
///
/// Pre-allocates the channel with bounded capacity so the tick never grows
/// memory.
pub struct EventBus {
    /// Sender end - held by the session.
    sender: Sender<RaceEvent>,
    /// Receiver end - cloned out to consumers.
    receiver: Receiver<RaceEvent>,
    /// Events lost to a full channel.
    dropped: u64,
}

impl EventBus {
    /// Creates a new event bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum events in flight before events are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            dropped: 0,
        }
    }

    /// Sends an event (non-blocking).
    ///
    /// Returns `false` if the channel is full and the event was dropped.
    #[inline]
    pub fn emit(&mut self, event: RaceEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event) | TrySendError::Disconnected(event)) => {
                self.dropped += 1;
                warn!(?event, dropped = self.dropped, "race event dropped");
                false
            }
        }
    }

    /// Creates a receiver handle (clone for multiple consumers).
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Events dropped so far.
    #[inline]
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Handle for receiving race events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<RaceEvent>,
}

impl EventReceiver {
    /// Receives all pending events (non-blocking).
    pub fn drain(&self) -> Vec<RaceEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<RaceEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_drain_in_order() {
        let mut bus = EventBus::new(8);
        let rx = bus.receiver();
        assert!(bus.emit(RaceEvent::RaceStarted));
        assert!(bus.emit(RaceEvent::RunnerFinished {
            runner: EntityId::new(4),
            finish_time: 812.5,
            place: 1,
        }));

        assert_eq!(rx.pending_count(), 2);
        let events = rx.drain();
        assert_eq!(events[0], RaceEvent::RaceStarted);
        assert!(matches!(events[1], RaceEvent::RunnerFinished { place: 1, .. }));
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_full_channel_drops_and_counts() {
        let mut bus = EventBus::new(1);
        assert!(bus.emit(RaceEvent::RaceStarted));
        assert!(!bus.emit(RaceEvent::HeatReset));
        assert_eq!(bus.dropped(), 1);
        assert_eq!(bus.receiver().drain(), vec![RaceEvent::RaceStarted]);
    }
}
