//! Data source abstraction for receiving energy snapshots.
//!
//! The metering store pushes a complete copy of its tree on every change,
//! and reports subscription failures on a separate path. A [`DataSource`]
//! delivers both as [`StoreEvent`]s, whether the snapshots come from a
//! polled file, an in-process channel or a network stream.

mod channel;
mod file;
mod stream;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use stream::StreamSource;

use std::fmt::Debug;

use meter_types::EnergySnapshot;

/// One notification from the metering store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The store changed; carries the full tree after the change.
    Changed(EnergySnapshot),
    /// The subscription failed or the delivered data could not be decoded.
    Failed(String),
}

impl StoreEvent {
    /// Returns the snapshot of a `Changed` event.
    pub fn snapshot(&self) -> Option<&EnergySnapshot> {
        match self {
            StoreEvent::Changed(snapshot) => Some(snapshot),
            StoreEvent::Failed(_) => None,
        }
    }
}

/// Trait for receiving energy snapshots from various sources.
///
/// # Example
///
/// ```
/// use energy_dashboard::{DataSource, FileSource, StoreEvent};
///
/// let mut source = FileSource::new("energy_data.json");
/// match source.poll() {
///     Some(StoreEvent::Changed(snapshot)) => println!("{} records", snapshot.record_count()),
///     Some(StoreEvent::Failed(error)) => eprintln!("{}", error),
///     None => {}
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the next store event.
    ///
    /// Returns `None` when nothing happened since the last poll.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<StoreEvent>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Ask the source to deliver its current state again on the next poll.
    ///
    /// Sources that only forward pushed events have nothing to redeliver.
    fn refresh(&mut self) {}
}
