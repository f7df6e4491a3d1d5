//! Non-blocking sources of input events.

use std::io::{self, ErrorKind};
use std::path::Path;

use evdevil::event::InputEvent;
use evdevil::reader::IntoEvents;
use evdevil::Evdev;

/// Result of asking a source for its next event.
#[derive(Debug)]
pub enum Poll {
    Event(InputEvent),
    /// Nothing queued right now; try again later.
    Pending,
}

/// Anything the reader thread can drain events from.
///
/// `Err` means the stream is unusable and the reader should give up.
pub trait EventSource {
    fn next_event(&mut self) -> io::Result<Poll>;
}

/// A keyboard evdev node in non-blocking mode.
///
/// Read through an `EventReader` so lost events (`SYN_DROPPED`) are replaced
/// by synthetic events that bring the key state back in line with the kernel.
pub struct DeviceSource {
    events: IntoEvents,
}

impl EventSource for DeviceSource {
    fn next_event(&mut self) -> io::Result<Poll> {
        match self.events.next() {
            None => Ok(Poll::Pending),
            Some(Ok(ev)) => Ok(Poll::Event(ev)),
            Some(Err(e)) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::Interrupted => {
                Ok(Poll::Pending)
            }
            Some(Err(e)) => Err(e),
        }
    }
}

/// Open an evdev node and switch it to non-blocking reads.
pub fn open_device(path: &Path) -> io::Result<DeviceSource> {
    let evdev = Evdev::open(path)
        .map_err(|e| io::Error::new(e.kind(), format!("Failed to open {}: {}", path.display(), e)))?;
    evdev.set_nonblocking(true)?;
    match evdev.name() {
        Ok(name) => log::info!("Opened {} ({})", path.display(), name),
        Err(_) => log::info!("Opened {}", path.display()),
    }
    Ok(DeviceSource {
        events: evdev.into_reader()?.into_iter(),
    })
}
