//! Keyboard modifier state tracking.

use super::events::Key;

/// Keyboard modifier state.
///
/// Tracks which modifier keys are currently held. Tools read Shift to constrain
/// shapes; keybinding lookup reads all three.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key pressed
    pub shift: bool,
    /// Ctrl key pressed
    pub ctrl: bool,
    /// Alt key pressed
    pub alt: bool,
}

impl Modifiers {
    /// Creates a new Modifiers instance with all keys released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a modifier press or release. Returns false for non-modifier keys.
    pub fn update(&mut self, key: Key, pressed: bool) -> bool {
        match key {
            Key::Shift => self.shift = pressed,
            Key::Ctrl => self.ctrl = pressed,
            Key::Alt => self.alt = pressed,
            _ => return false,
        }
        true
    }

    /// True when Ctrl or Alt is held, i.e. the key is a command chord.
    pub fn has_command(&self) -> bool {
        self.ctrl || self.alt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_press_and_release() {
        let mut m = Modifiers::new();
        assert!(m.update(Key::Shift, true));
        assert!(m.shift);
        assert!(m.update(Key::Shift, false));
        assert!(!m.shift);
        assert!(!m.update(Key::Char('a'), true));
        assert_eq!(m, Modifiers::new());
    }
}
