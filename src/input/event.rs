use evdevil::event::{EventKind, InputEvent, Key, KeyState, Syn};

/// A key going down or up. Autorepeat counts as down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTransition {
    pub key: Key,
    pub pressed: bool,
    pub repeat: bool,
}

impl KeyTransition {
    /// Extract a key transition from a raw event; other event types yield None.
    pub fn from_event(ev: &InputEvent) -> Option<Self> {
        let EventKind::Key(key_ev) = ev.kind() else {
            return None;
        };
        let state = key_ev.state();
        Some(Self {
            key: key_ev.key(),
            pressed: state != KeyState::RELEASED,
            repeat: state == KeyState::REPEAT,
        })
    }
}

/// True for the `SYN_REPORT` that closes a frame of events.
pub fn is_report(ev: &InputEvent) -> bool {
    matches!(ev.kind(), EventKind::Syn(syn) if syn.syn() == Syn::REPORT)
}

/// True for the kernel's "events were lost" marker.
pub fn is_dropped(ev: &InputEvent) -> bool {
    matches!(ev.kind(), EventKind::Syn(syn) if syn.syn() == Syn::DROPPED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdevil::event::{KeyEvent, MiscEvent, Misc, SynEvent};

    #[test]
    fn test_press_release_repeat() {
        let press: InputEvent = KeyEvent::new(Key::KEY_SPACE, KeyState::PRESSED).into();
        let release: InputEvent = KeyEvent::new(Key::KEY_A, KeyState::RELEASED).into();
        let repeat: InputEvent = KeyEvent::new(Key::KEY_J, KeyState::REPEAT).into();

        assert_eq!(
            KeyTransition::from_event(&press),
            Some(KeyTransition { key: Key::KEY_SPACE, pressed: true, repeat: false })
        );
        assert_eq!(
            KeyTransition::from_event(&release),
            Some(KeyTransition { key: Key::KEY_A, pressed: false, repeat: false })
        );
        assert_eq!(
            KeyTransition::from_event(&repeat),
            Some(KeyTransition { key: Key::KEY_J, pressed: true, repeat: true })
        );
    }

    #[test]
    fn test_only_key_events_are_transitions() {
        let report: InputEvent = SynEvent::new(Syn::REPORT).into();
        let scan: InputEvent = MiscEvent::new(Misc::SCAN, 458756).into();
        assert_eq!(KeyTransition::from_event(&report), None);
        assert_eq!(KeyTransition::from_event(&scan), None);
    }

    #[test]
    fn test_dropped_marker() {
        let dropped: InputEvent = SynEvent::new(Syn::DROPPED).into();
        let report: InputEvent = SynEvent::new(Syn::REPORT).into();
        assert!(is_dropped(&dropped));
        assert!(!is_dropped(&report));
        assert!(is_report(&report));
        assert!(!is_report(&dropped));
    }
}
