//! Stream-based data source.
//!
//! Receives energy snapshots from an async byte stream, such as a TCP
//! connection to a relay that forwards store changes.

use meter_types::EnergySnapshot;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use super::{DataSource, StoreEvent};

/// A data source that receives energy snapshots from an async stream.
///
/// This source spawns a background task that reads newline-delimited JSON
/// from the provided async reader. Snapshots and failures are forwarded in
/// the order they occur.
///
/// # Example with a byte stream
///
/// ```
/// use std::io::Cursor;
/// use energy_dashboard::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{}\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<StoreEvent>,
    description: String,
    disconnected: bool,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    ///
    /// Each non-empty line is decoded as a complete [`EnergySnapshot`].
    /// A line that fails to decode produces a [`StoreEvent::Failed`] and
    /// the stream keeps going; EOF and read errors end it.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                let event = match reader.read_line(&mut line).await {
                    Ok(0) => {
                        let _ = tx.send(StoreEvent::Failed("Connection closed".into())).await;
                        break;
                    }
                    Ok(_) if line.trim().is_empty() => continue,
                    Ok(_) => decode(line.trim().as_bytes()),
                    Err(e) => {
                        let _ = tx.send(StoreEvent::Failed(format!("Read error: {}", e))).await;
                        break;
                    }
                };

                if tx.send(event).await.is_err() {
                    debug!("Stream receiver dropped, stopping reader");
                    break;
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            disconnected: false,
        }
    }

    /// Create a StreamSource from a raw bytes channel.
    ///
    /// Each message is one complete JSON document. Useful when another
    /// component already frames the data.
    pub fn from_bytes_channel(mut rx: mpsc::Receiver<Vec<u8>>, description: &str) -> Self {
        let (tx, event_rx) = mpsc::channel(16);

        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                if tx.send(decode(&bytes)).await.is_err() {
                    break;
                }
            }
        });

        Self {
            receiver: event_rx,
            description: format!("stream: {}", description),
            disconnected: false,
        }
    }
}

fn decode(bytes: &[u8]) -> StoreEvent {
    match EnergySnapshot::from_json_slice(bytes) {
        Ok(snapshot) => StoreEvent::Changed(snapshot),
        Err(e) => StoreEvent::Failed(format!("Parse error: {}", e)),
    }
}

impl DataSource for StreamSource {
    fn poll(&mut self) -> Option<StoreEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                // Report the hang-up once
                if self.disconnected {
                    None
                } else {
                    self.disconnected = true;
                    Some(StoreEvent::Failed("Stream disconnected".to_string()))
                }
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_json() -> &'static str {
        r#"{"2025":{"5":{"21":{"r1":{"timestamp":"2025-5-21 11:45","current_month_energy":92.5}}}}}"#
    }

    async fn settle() {
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_stream_source_spawn() {
        let data = format!("{}\n", sample_json());
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        settle().await;

        match source.poll() {
            Some(StoreEvent::Changed(snapshot)) => {
                assert!(snapshot.day(2025, 5, 21).is_some());
            }
            other => panic!("expected a snapshot, got {:?}", other),
        }
        assert_eq!(
            source.poll(),
            Some(StoreEvent::Failed("Connection closed".to_string()))
        );
    }

    #[tokio::test]
    async fn test_stream_source_multiple_snapshots() {
        let data = format!("{}\n\n{}\n", sample_json(), sample_json());
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        settle().await;

        assert!(matches!(source.poll(), Some(StoreEvent::Changed(_))));
        assert!(matches!(source.poll(), Some(StoreEvent::Changed(_))));
        assert!(matches!(source.poll(), Some(StoreEvent::Failed(_))));
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let source = StreamSource::spawn(Cursor::new(""), "tcp://localhost:9090");
        assert_eq!(source.description(), "stream: tcp://localhost:9090");
    }

    #[tokio::test]
    async fn test_stream_source_from_bytes_channel() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
        let mut source = StreamSource::from_bytes_channel(rx, "test-channel");

        tx.send(sample_json().as_bytes().to_vec()).await.unwrap();
        settle().await;

        assert!(matches!(source.poll(), Some(StoreEvent::Changed(_))));
        assert!(source.poll().is_none());
    }

    #[tokio::test]
    async fn test_stream_source_invalid_json_keeps_reading() {
        let data = format!("not valid json\n{}\n", sample_json());
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        settle().await;

        match source.poll() {
            Some(StoreEvent::Failed(error)) => assert!(error.starts_with("Parse error")),
            other => panic!("expected a parse failure, got {:?}", other),
        }
        assert!(matches!(source.poll(), Some(StoreEvent::Changed(_))));
    }

    #[tokio::test]
    async fn test_stream_source_reports_disconnect_once() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
        let mut source = StreamSource::from_bytes_channel(rx, "test");
        drop(tx);

        settle().await;

        assert_eq!(
            source.poll(),
            Some(StoreEvent::Failed("Stream disconnected".to_string()))
        );
        assert!(source.poll().is_none());
    }

    #[tokio::test]
    async fn test_stream_source_empty_stream() {
        let mut source = StreamSource::spawn(Cursor::new(""), "test");

        settle().await;

        assert_eq!(
            source.poll(),
            Some(StoreEvent::Failed("Connection closed".to_string()))
        );
    }
}
