//! Print key transitions from the keyboard for debugging.
//! Run: keycat dump /dev/input/eventX (or set the device in the config)

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::input::{open_device, EventSource, KeyTransition, Poll};
use crate::zone::Zone;

pub fn run_dump(
    device: &Path,
    stop: &AtomicBool,
    poll_interval: Duration,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut source = open_device(device)?;
    eprintln!("Dumping key events from {} (Ctrl+C to stop):\n", device.display());
    dump_events(&mut source, &mut std::io::stdout().lock(), stop, poll_interval)
}

fn dump_events(
    source: &mut impl EventSource,
    out: &mut impl Write,
    stop: &AtomicBool,
    poll_interval: Duration,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut n = 0u64;
    while !stop.load(Ordering::Relaxed) {
        let ev = match source.next_event()? {
            Poll::Event(ev) => ev,
            Poll::Pending => {
                thread::sleep(poll_interval);
                continue;
            }
        };
        let Some(t) = KeyTransition::from_event(&ev) else {
            continue;
        };
        n += 1;
        let state = match (t.pressed, t.repeat) {
            (false, _) => "up",
            (true, false) => "down",
            (true, true) => "repeat",
        };
        let name = format!("{:?}", t.key);
        writeln!(out, "{:6}  {:<16} {:<6} {}", n, name, Zone::of(t.key), state)?;
    }
    Ok(())
}
