//! Prints the host's network state whenever it changes.
//!
//! Run with: cargo run -p horizon-netstate --example watch_network [seconds]
//!
//! Set `RUST_LOG=horizon_netstate=debug` to see the monitor's own logging.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use horizon_netstate::{HostInterfaceSource, NetworkMonitor, NetworkSnapshot};
use tracing_subscriber::EnvFilter;

fn print_snapshot(label: &str, snapshot: &NetworkSnapshot) {
    let payload = serde_json::Value::Object(snapshot.to_dictionary());
    let text = serde_json::to_string_pretty(&payload).expect("Failed to serialize snapshot");
    println!("{label}:\n{text}");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let seconds: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(60);

    let monitor = NetworkMonitor::new(HostInterfaceSource::new());
    monitor.add_listener(|snapshot: &Arc<NetworkSnapshot>| print_snapshot("changed", snapshot));
    monitor.start().expect("Failed to start network monitor");

    print_snapshot("initial", &monitor.current_state());
    println!("watching for {seconds}s, toggle Wi-Fi or unplug a cable to see updates");

    thread::sleep(Duration::from_secs(seconds));
    monitor.stop();
}
