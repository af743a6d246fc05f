//! Generic input event types.

/// Generic key representation.
///
/// Front ends map their native key codes to these values; the editor core
/// never sees platform key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Regular character key (a-z, 0-9, symbols)
    Char(char),
    /// Escape key
    Escape,
    /// Return/Enter key
    Return,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Tab key
    Tab,
    /// Space bar
    Space,
    /// Shift modifier
    Shift,
    /// Ctrl modifier
    Ctrl,
    /// Alt modifier
    Alt,
    /// Unmapped or unrecognized key
    Unknown,
}

impl Key {
    /// Name used when matching against configured keybindings.
    ///
    /// Modifier keys and unknown keys have no binding name.
    pub fn binding_name(self) -> Option<String> {
        let name = match self {
            Key::Char(c) => c.to_string(),
            Key::Escape => "Escape".to_string(),
            Key::Return => "Return".to_string(),
            Key::Backspace => "Backspace".to_string(),
            Key::Delete => "Delete".to_string(),
            Key::Tab => "Tab".to_string(),
            Key::Space => "Space".to_string(),
            Key::Shift | Key::Ctrl | Key::Alt | Key::Unknown => return None,
        };
        Some(name)
    }
}

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Left mouse button (drives the active tool)
    Left,
    /// Right mouse button (cancels the current gesture)
    Right,
    /// Middle mouse button (pans the view)
    Middle,
}
