//! Example: Watching an exported store file
//!
//! Polls a JSON export of the `energy_data` tree and prints the month
//! totals whenever the file changes.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example file_source -- demos/energy_data.json
//! ```

use std::env;
use std::thread;
use std::time::Duration;

use chrono::{Datelike, Local};
use energy_dashboard::data::dashboard::format_kwh;
use energy_dashboard::{DashboardData, DashboardOptions, DataSource, FileSource, StoreEvent};

fn main() {
    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example file_source -- <path-to-energy_data.json>");
        eprintln!();
        eprintln!("The file should contain the store tree in the format:");
        eprintln!(
            r#"  {{"2025": {{"5": {{"21": {{"-Nx1": {{"timestamp": "2025-5-21 11:45", "current_month_energy": 92.5}}}}}}}}}}"#
        );
        std::process::exit(1);
    });

    println!("Watching file: {}", path);
    println!("Press Ctrl+C to stop\n");

    let mut source = FileSource::new(&path);
    let options = DashboardOptions::default();

    loop {
        match source.poll() {
            Some(StoreEvent::Changed(snapshot)) => {
                let today = Local::now().date_naive();
                let data = DashboardData::from_snapshot(&snapshot, today, today.year(), &options);

                println!("Snapshot with {} records:", snapshot.record_count());
                println!(
                    "  {}: {}",
                    data.current_month.period,
                    format_kwh(data.current_month.kwh)
                );
                println!(
                    "  {}: {}",
                    data.previous_month.period,
                    format_kwh(data.previous_month.kwh)
                );
                for (label, kwh) in data.trend.labelled().filter(|(_, kwh)| *kwh > 0.0) {
                    println!("    {} {}", label, format_kwh(kwh));
                }
                println!();
            }
            Some(StoreEvent::Failed(error)) => eprintln!("Error: {}", error),
            None => {}
        }

        thread::sleep(Duration::from_secs(1));
    }
}
