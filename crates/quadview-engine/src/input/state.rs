use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, Modifiers};

/// Current input state for a single window.
///
/// Holds "is down" information. Per-frame transitions are recorded into an
/// `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Whether the window is focused.
    pub focused: bool,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state and writes deltas to `frame`.
    ///
    /// A key held across frames (including OS key-repeat events) records exactly
    /// one `keys_pressed` entry; the transition fires again only after a release.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // On focus loss, clear the "down" set. Avoids stuck keys
                    // when focus changes mid-press.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key {
                key,
                state,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;

                match state {
                    KeyState::Pressed => {
                        let inserted = self.keys_down.insert(*key);
                        if inserted {
                            frame.keys_pressed.insert(*key);
                        }
                    }
                    KeyState::Released => {
                        let removed = self.keys_down.remove(key);
                        if removed {
                            frame.keys_released.insert(*key);
                        }
                    }
                }
            }
        }

        frame.push_event(ev);
    }

    /// Helper queries
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState, repeat: bool) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            modifiers: Modifiers::default(),
            code: 0,
            repeat,
        }
    }

    // ── edge detection ────────────────────────────────────────────────────

    #[test]
    fn press_records_one_transition() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::Space, KeyState::Pressed, false));

        assert!(state.key_down(Key::Space));
        assert!(frame.pressed(Key::Space));
        assert_eq!(frame.events.len(), 1);
    }

    #[test]
    fn held_key_does_not_refire_across_frames() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::Space, KeyState::Pressed, false));
        frame.clear();

        // OS key-repeat while held: no new press transition.
        state.apply_event(&mut frame, key(Key::Space, KeyState::Pressed, true));
        state.apply_event(&mut frame, key(Key::Space, KeyState::Pressed, true));

        assert!(state.key_down(Key::Space));
        assert!(!frame.pressed(Key::Space));
    }

    #[test]
    fn release_records_one_transition() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::Space, KeyState::Pressed, false));
        frame.clear();
        state.apply_event(&mut frame, key(Key::Space, KeyState::Released, false));

        assert!(!state.key_down(Key::Space));
        assert!(frame.released(Key::Space));
    }

    #[test]
    fn press_release_press_fires_twice() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::Space, KeyState::Pressed, false));
        state.apply_event(&mut frame, key(Key::Space, KeyState::Released, false));
        frame.clear();
        state.apply_event(&mut frame, key(Key::Space, KeyState::Pressed, false));

        assert!(frame.pressed(Key::Space));
    }

    #[test]
    fn spurious_release_is_ignored() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::Escape, KeyState::Released, false));

        assert!(!frame.released(Key::Escape));
    }

    // ── focus ─────────────────────────────────────────────────────────────

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::Space, KeyState::Pressed, false));
        state.apply_event(&mut frame, InputEvent::Focused(false));

        assert!(!state.focused);
        assert!(state.keys_down.is_empty());
    }

    // ── modifiers ─────────────────────────────────────────────────────────

    #[test]
    fn modifiers_track_latest_event() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        let shift = Modifiers { shift: true, ..Modifiers::default() };
        state.apply_event(&mut frame, InputEvent::ModifiersChanged(shift));

        assert_eq!(state.modifiers, shift);
        assert!(state.modifiers.any());
    }
}
