//! Example: Feeding the dashboard through a channel
//!
//! This example pushes synthetic meter readings through a `ChannelSource`,
//! the way an in-process store subscription would, and prints the
//! aggregated dashboard values after every change.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example channel_source
//! ```

use std::thread;
use std::time::Duration;

use chrono::{Datelike, Local, Timelike};
use energy_dashboard::data::dashboard::{format_kwh, format_metric};
use energy_dashboard::{ChannelSource, DashboardData, DashboardOptions, DataSource, StoreEvent};
use meter_types::{EnergySnapshot, Record};

fn main() {
    println!("Channel source example");
    println!("Generating synthetic meter readings...\n");

    let (tx, mut source) = ChannelSource::create("synthetic-meter");

    thread::spawn(move || {
        let mut builder = EnergySnapshot::builder();
        let mut energy = 120.0;

        for counter in 0u32.. {
            let now = Local::now().naive_local();
            energy += 0.35;

            let record = Record::at(format!(
                "{}-{}-{} {}:{:02}",
                now.year(),
                now.month(),
                now.day(),
                now.hour(),
                now.minute()
            ))
            .with_energy(energy)
            .with_voltage(228.0 + f64::from(counter % 7))
            .with_current(3.0 + f64::from(counter % 5) * 0.8)
            .with_frequency(49.9 + f64::from(counter % 3) * 0.05);

            builder = builder.record(
                now.year(),
                now.month(),
                now.day(),
                format!("-N{:06}", counter),
                record,
            );

            // Every store change carries the whole tree
            if tx.send(StoreEvent::Changed(builder.clone().build())).is_err() {
                break;
            }

            thread::sleep(Duration::from_secs(1));
        }
    });

    println!("Receiving snapshots (press Ctrl+C to stop):\n");

    let options = DashboardOptions::default();
    loop {
        match source.poll() {
            Some(StoreEvent::Changed(snapshot)) => {
                let today = Local::now().date_naive();
                let data = DashboardData::from_snapshot(&snapshot, today, today.year(), &options);
                let metrics = data.metrics.unwrap_or_default();
                println!(
                    "{} records | this month {} | {} {} {}",
                    snapshot.record_count(),
                    format_kwh(data.current_month.kwh),
                    format_metric(metrics.voltage, "V"),
                    format_metric(metrics.current, "A"),
                    format_metric(metrics.frequency, "Hz"),
                );
            }
            Some(StoreEvent::Failed(error)) => eprintln!("Store error: {}", error),
            None => {}
        }

        thread::sleep(Duration::from_millis(100));
    }
}
