//! Pressed/released flags for every key code, shared between the reader
//! thread and the render thread.

use std::sync::{Arc, Mutex, PoisonError};

use evdevil::event::Key;

/// Size of the key code universe tracked by the table.
pub const KEY_CNT: usize = 256;

/// Lock-guarded table of key flags. Written by the device reader, copied by
/// the presentation selector.
pub struct KeyStateTable {
    keys: Mutex<[bool; KEY_CNT]>,
}

impl KeyStateTable {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new([false; KEY_CNT]),
        }
    }

    /// Record the latest state for `key`. Codes outside the table are ignored.
    pub fn set(&self, key: Key, pressed: bool) {
        self.apply([(key, pressed)]);
    }

    /// Record several transitions under one lock acquisition, so a snapshot
    /// sees either none or all of them.
    pub fn apply(&self, changes: impl IntoIterator<Item = (Key, bool)>) {
        // A panic while holding the guard cannot leave a flag half-written.
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, pressed) in changes {
            if let Some(slot) = keys.get_mut(key.raw() as usize) {
                *slot = pressed;
            }
        }
    }

    /// Forget every pressed key.
    pub fn release_all(&self) {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        *keys = [false; KEY_CNT];
    }

    /// Copy the whole table under a single lock acquisition.
    pub fn snapshot(&self) -> KeySnapshot {
        let keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        KeySnapshot { keys: *keys }
    }
}

impl Default for KeyStateTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle passed to both threads.
pub type SharedKeyState = Arc<KeyStateTable>;

/// Point-in-time copy of the key table.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeySnapshot {
    keys: [bool; KEY_CNT],
}

impl KeySnapshot {
    pub fn is_pressed(&self, key: Key) -> bool {
        self.keys.get(key.raw() as usize).copied().unwrap_or(false)
    }

    pub fn pressed_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, pressed)| **pressed)
            .map(|(code, _)| Key::from_raw(code as u16))
    }

    pub fn pressed_count(&self) -> usize {
        self.keys.iter().filter(|&&p| p).count()
    }
}

impl Default for KeySnapshot {
    fn default() -> Self {
        Self {
            keys: [false; KEY_CNT],
        }
    }
}

impl std::fmt::Debug for KeySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.pressed_keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    #[test]
    fn test_starts_released() {
        let table = KeyStateTable::new();
        let snap = table.snapshot();
        assert_eq!(snap.pressed_count(), 0);
        assert_eq!(snap, KeySnapshot::default());
    }

    #[test]
    fn test_latest_transition_wins() {
        let table = KeyStateTable::new();
        table.set(Key::KEY_A, true);
        table.set(Key::KEY_S, true);
        table.set(Key::KEY_A, false);

        let snap = table.snapshot();
        assert!(!snap.is_pressed(Key::KEY_A));
        assert!(snap.is_pressed(Key::KEY_S));
        assert_eq!(snap.pressed_keys().collect::<Vec<_>>(), vec![Key::KEY_S]);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let table = KeyStateTable::new();
        table.set(Key::from_raw(KEY_CNT as u16), true);
        table.set(Key::BTN_LEFT, true);
        table.set(Key::from_raw(u16::MAX), true);

        let snap = table.snapshot();
        assert_eq!(snap.pressed_count(), 0);
        assert!(!snap.is_pressed(Key::from_raw(u16::MAX)));
    }

    #[test]
    fn test_release_all() {
        let table = KeyStateTable::new();
        table.apply([(Key::KEY_J, true), (Key::KEY_SPACE, true), (Key::KEY_A, true)]);
        assert_eq!(table.snapshot().pressed_count(), 3);

        table.release_all();
        assert_eq!(table.snapshot(), KeySnapshot::default());
    }

    #[test]
    fn test_concurrent_set_and_snapshot() {
        let table: SharedKeyState = Arc::new(KeyStateTable::new());

        // Writers only ever press keys, so every reader must see a count
        // that never goes backwards.
        let writers: Vec<_> = (0..4u16)
            .map(|w| {
                let table = table.clone();
                thread::spawn(move || {
                    for code in (w..KEY_CNT as u16).step_by(4) {
                        table.set(Key::from_raw(code), true);
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let table = table.clone();
                thread::spawn(move || {
                    let mut last = 0;
                    for _ in 0..2_000 {
                        let count = table.snapshot().pressed_count();
                        assert!(count >= last, "snapshot went backwards: {} < {}", count, last);
                        last = count;
                    }
                })
            })
            .collect();

        for h in writers {
            h.join().unwrap();
        }
        for h in readers {
            h.join().unwrap();
        }
        assert_eq!(table.snapshot().pressed_count(), KEY_CNT);
    }

    #[test]
    fn test_lockstep_toggles_never_tear() {
        const CHORD: [Key; 4] = [Key::KEY_J, Key::KEY_K, Key::KEY_SPACE, Key::KEY_P];

        let table: SharedKeyState = Arc::new(KeyStateTable::new());
        let done = Arc::new(AtomicBool::new(false));

        // Each writer flips the whole chord at once, pressing and releasing.
        let writers: Vec<_> = (0..2)
            .map(|_| {
                let table = table.clone();
                thread::spawn(move || {
                    for i in 0..5_000 {
                        let pressed = i % 2 == 0;
                        table.apply(CHORD.iter().map(|&k| (k, pressed)));
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let table = table.clone();
                let done = done.clone();
                thread::spawn(move || {
                    while !done.load(Ordering::Relaxed) {
                        let snap = table.snapshot();
                        let down = CHORD.iter().filter(|&&k| snap.is_pressed(k)).count();
                        assert!(
                            down == 0 || down == CHORD.len(),
                            "torn snapshot: {} of {} chord keys down: {:?}",
                            down,
                            CHORD.len(),
                            snap
                        );
                        assert_eq!(snap.pressed_count(), down);
                    }
                })
            })
            .collect();

        for h in writers {
            h.join().unwrap();
        }
        done.store(true, Ordering::Relaxed);
        for h in readers {
            h.join().unwrap();
        }
        // Last iteration of each writer releases.
        assert_eq!(table.snapshot().pressed_count(), 0);
    }
}
