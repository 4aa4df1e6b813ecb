//! Example: Receiving snapshots over TCP
//!
//! Connects to a relay that writes one JSON snapshot of the `energy_data`
//! tree per line, and prints each store event.
//!
//! # Usage
//!
//! Start a relay, for example with netcat:
//!
//! ```bash
//! tr -d '\n' < demos/energy_data.json | (cat; echo) | nc -l 9090
//! ```
//!
//! Then run this example:
//!
//! ```bash
//! cargo run --example stream_source -- localhost:9090
//! ```

use std::env;
use std::time::Duration;

use tokio::net::TcpStream;

use energy_dashboard::{DataSource, StoreEvent, StreamSource};

#[tokio::main]
async fn main() {
    let addr = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example stream_source -- <host:port>");
        std::process::exit(1);
    });

    println!("Connecting to {}...", addr);

    let stream = match TcpStream::connect(&addr).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    println!("Connected! Waiting for snapshots...\n");

    let mut source = StreamSource::spawn(stream, &addr);

    loop {
        match source.poll() {
            Some(StoreEvent::Changed(snapshot)) => {
                println!("Received snapshot with {} records:", snapshot.record_count());
                for (year, months) in snapshot.years().iter() {
                    println!("  {}: {} months", year, months.len());
                }
                println!();
            }
            Some(StoreEvent::Failed(error)) => {
                eprintln!("Stream error: {}", error);
                if error == "Connection closed" {
                    break;
                }
            }
            None => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
}
