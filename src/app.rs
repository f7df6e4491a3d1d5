//! Render loop: snapshot, select, present, sleep.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::input::ReaderHandle;
use crate::key_state::KeyStateTable;
use crate::render::Renderer;
use crate::selector::{Clock, PresentationSelector};

/// Drive the selector at the frame cadence until `shutdown` is set.
/// Returns the number of frames presented.
pub fn run_display_loop(
    table: &KeyStateTable,
    selector: &mut PresentationSelector,
    renderer: &mut impl Renderer,
    clock: &impl Clock,
    shutdown: &AtomicBool,
    frame_interval: Duration,
    reader: Option<&ReaderHandle>,
) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
    let mut frames: u64 = 0;
    let mut reader_down_logged = false;

    while !shutdown.load(Ordering::Relaxed) {
        let snapshot = table.snapshot();
        let image = selector.tick(&snapshot, clock.now_ms());
        renderer.present(image)?;
        frames += 1;
        log::trace!("frame {}: {} keys held -> {}", frames, snapshot.pressed_count(), image);

        if !reader_down_logged && reader.is_some_and(|r| r.is_finished()) {
            log::warn!("Keyboard reader is no longer running; display will stay on its last state");
            reader_down_logged = true;
        }

        thread::sleep(frame_interval);
    }

    log::debug!(
        "Display loop exiting after {} frames (showing {}, last active {})",
        frames,
        selector.displayed(),
        selector.last_active()
    );
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{DisplayImage, IdlePolicy};
    use evdevil::event::Key;
    use std::cell::Cell;

    /// Records every presented image and requests shutdown after `limit` frames.
    struct Recording<'a> {
        seen: Vec<DisplayImage>,
        limit: usize,
        shutdown: &'a AtomicBool,
    }

    impl Renderer for Recording<'_> {
        fn present(&mut self, image: DisplayImage) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.seen.push(image);
            if self.seen.len() >= self.limit {
                self.shutdown.store(true, Ordering::Relaxed);
            }
            Ok(())
        }
    }

    /// Advances 10ms per reading.
    struct StepClock(Cell<u64>);

    impl Clock for StepClock {
        fn now_ms(&self) -> u64 {
            let now = self.0.get();
            self.0.set(now + 10);
            now
        }
    }

    fn selector() -> PresentationSelector {
        PresentationSelector::new(Duration::from_millis(50), IdlePolicy::Immediate)
    }

    #[test]
    fn test_loop_presents_until_shutdown() {
        let table = KeyStateTable::new();
        table.set(Key::KEY_J, true);
        let shutdown = AtomicBool::new(false);
        let mut renderer = Recording {
            seen: Vec::new(),
            limit: 3,
            shutdown: &shutdown,
        };

        let frames = run_display_loop(
            &table,
            &mut selector(),
            &mut renderer,
            &StepClock(Cell::new(0)),
            &shutdown,
            Duration::from_millis(1),
            None,
        )
        .unwrap();

        assert_eq!(frames, 3);
        assert_eq!(renderer.seen, vec![DisplayImage::Right; 3]);
    }

    #[test]
    fn test_loop_does_not_start_after_shutdown() {
        let table = KeyStateTable::new();
        table.set(Key::KEY_SPACE, true);
        let shutdown = AtomicBool::new(true);
        let mut renderer = Recording {
            seen: Vec::new(),
            limit: 1,
            shutdown: &shutdown,
        };

        let frames = run_display_loop(
            &table,
            &mut selector(),
            &mut renderer,
            &StepClock(Cell::new(0)),
            &shutdown,
            Duration::from_millis(1),
            None,
        )
        .unwrap();

        assert_eq!(frames, 0);
        assert!(renderer.seen.is_empty());
    }

    #[test]
    fn test_renderer_error_stops_loop() {
        struct Broken;
        impl Renderer for Broken {
            fn present(&mut self, _: DisplayImage) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                Err("display gone".into())
            }
        }

        let table = KeyStateTable::new();
        let shutdown = AtomicBool::new(false);
        let err = run_display_loop(
            &table,
            &mut selector(),
            &mut Broken,
            &StepClock(Cell::new(0)),
            &shutdown,
            Duration::from_millis(1),
            None,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "display gone");
    }
}
