//! Background thread that keeps the key table in sync with a device.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use evdevil::event::Key;

use crate::key_state::{KeyStateTable, SharedKeyState};

use super::event::{is_dropped, is_report, KeyTransition};
use super::source::{EventSource, Poll};

/// Drain `source` into `table` until `stop` is set or the stream fails.
///
/// Transitions are buffered until the `SYN_REPORT` closing their frame and
/// then applied together, so a chord never shows up half pressed. Queued
/// transitions are also flushed whenever the source runs dry.
///
/// Returns `Ok` only when stopped; stream errors end the loop and are
/// handed back to the caller.
pub fn run(
    source: &mut impl EventSource,
    table: &KeyStateTable,
    stop: &AtomicBool,
    poll_interval: Duration,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut count: u64 = 0;
    let mut frame: Vec<(Key, bool)> = Vec::new();

    loop {
        if stop.load(Ordering::Relaxed) {
            log::debug!("Key reader stopping after {} transitions", count);
            return Ok(());
        }

        let ev = match source.next_event() {
            Ok(Poll::Event(ev)) => ev,
            Ok(Poll::Pending) => {
                table.apply(frame.drain(..));
                thread::sleep(poll_interval);
                continue;
            }
            Err(e) => {
                table.apply(frame.drain(..));
                return Err(e.into());
            }
        };

        if is_dropped(&ev) {
            // A lost release would leave its key stuck down.
            log::warn!("Input events were dropped, releasing all keys");
            frame.clear();
            table.release_all();
            continue;
        }
        if is_report(&ev) {
            table.apply(frame.drain(..));
            continue;
        }
        let Some(transition) = KeyTransition::from_event(&ev) else {
            continue;
        };

        // Codes past the table are dropped by `apply`.
        frame.push((transition.key, transition.pressed));

        if count == 0 {
            log::info!("Key events flowing");
        }
        count += 1;
        if count.is_multiple_of(500) {
            log::debug!("Key transitions: {}", count);
        }
    }
}

/// Owns the reader thread and its stop flag.
pub struct ReaderHandle {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ReaderHandle {
    /// Spawn the reader. `open` runs on the new thread; if it fails the
    /// error is logged and the thread ends, leaving the table untouched.
    pub fn spawn<S, F>(
        name: &str,
        open: F,
        table: SharedKeyState,
        poll_interval: Duration,
    ) -> io::Result<Self>
    where
        S: EventSource,
        F: FnOnce() -> io::Result<S> + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let label = name.to_string();

        let handle = thread::Builder::new()
            .name(format!("reader {}", name))
            .spawn(move || {
                log::info!("[{}] reader starting", label);
                let mut source = match open() {
                    Ok(source) => source,
                    Err(e) => {
                        log::error!("[{}] {}", label, e);
                        return;
                    }
                };
                match run(&mut source, &table, &stop_flag, poll_interval) {
                    Ok(()) => log::info!("[{}] reader stopped", label),
                    Err(e) => log::error!("[{}] input stream failed: {}", label, e),
                }
            })?;

        Ok(Self { stop, handle })
    }

    /// True once the thread has exited, for whatever reason.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Ask the thread to stop and wait for it. The device handle is
    /// released before this returns.
    pub fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        if self.handle.join().is_err() {
            log::error!("Key reader thread panicked");
        }
    }
}
