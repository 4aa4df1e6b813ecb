//! Channel-based data source.
//!
//! Receives store events via a tokio watch channel. Useful when the
//! subscription lives in the same process and pushes snapshots rather
//! than writing them to a file.

use meter_types::EnergySnapshot;
use tokio::sync::watch;

use super::{DataSource, StoreEvent};

/// A data source that receives store events via a channel.
///
/// Only the most recent event is kept; a slow UI skips intermediate
/// snapshots, which is fine because each one carries the whole tree.
///
/// # Example
///
/// ```
/// use energy_dashboard::{ChannelSource, StoreEvent};
/// use meter_types::EnergySnapshot;
///
/// let (tx, source) = ChannelSource::create("firebase://meter");
/// tx.send(StoreEvent::Changed(EnergySnapshot::new())).unwrap();
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<StoreEvent>,
    description: String,
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - Where the events come from (e.g., "firebase://meter")
    pub fn new(receiver: watch::Receiver<StoreEvent>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
            initial_returned: false,
        }
    }

    /// Create a channel pair for sending events to a ChannelSource.
    ///
    /// The channel starts out holding an empty snapshot.
    pub fn create(source_description: &str) -> (watch::Sender<StoreEvent>, Self) {
        let (tx, rx) = watch::channel(StoreEvent::Changed(EnergySnapshot::default()));
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<StoreEvent> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn refresh(&mut self) {
        self.receiver.mark_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_types::Record;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");

        // Initially returns the empty snapshot
        match source.poll() {
            Some(StoreEvent::Changed(snapshot)) => assert!(snapshot.is_empty()),
            other => panic!("expected initial snapshot, got {:?}", other),
        }

        assert!(source.poll().is_none());

        let snapshot = EnergySnapshot::builder()
            .record(2025, 5, 21, "r1", Record::at("2025-5-21 11:45").with_energy(92.5))
            .build();
        tx.send(StoreEvent::Changed(snapshot.clone())).unwrap();

        assert_eq!(source.poll(), Some(StoreEvent::Changed(snapshot)));
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_channel_source_delivers_failures() {
        let (tx, mut source) = ChannelSource::create("test");
        let _ = source.poll();

        tx.send(StoreEvent::Failed("Permission denied".to_string()))
            .unwrap();

        assert_eq!(
            source.poll(),
            Some(StoreEvent::Failed("Permission denied".to_string()))
        );
    }

    #[test]
    fn test_channel_source_keeps_latest_only() {
        let (tx, mut source) = ChannelSource::create("test");
        let _ = source.poll();

        let first = EnergySnapshot::builder()
            .record(2025, 5, 20, "r1", Record::at("2025-5-20 09:00").with_energy(80.0))
            .build();
        let second = EnergySnapshot::builder()
            .record(2025, 5, 21, "r1", Record::at("2025-5-21 11:45").with_energy(92.5))
            .build();
        tx.send(StoreEvent::Changed(first)).unwrap();
        tx.send(StoreEvent::Changed(second.clone())).unwrap();

        assert_eq!(source.poll(), Some(StoreEvent::Changed(second)));
    }

    #[test]
    fn test_channel_source_refresh_redelivers() {
        let (_tx, mut source) = ChannelSource::create("test");
        let first = source.poll();
        assert!(source.poll().is_none());

        source.refresh();
        assert_eq!(source.poll(), first);
    }

    #[test]
    fn test_channel_source_description() {
        let (_tx, source) = ChannelSource::create("firebase://meter");
        assert_eq!(source.description(), "channel: firebase://meter");
    }
}
