//! Replayable input scripts for driving an [`Editor`] without a display.
//!
//! A script is a TOML list of device-space events:
//!
//! ```toml
//! [[event]]
//! kind = "tool"
//! tool = "rectangle"
//!
//! [[event]]
//! kind = "press"
//! x = 10.0
//! y = 10.0
//!
//! [[event]]
//! kind = "release"
//! x = 120.0
//! y = 80.0
//!
//! [[event]]
//! kind = "key"
//! key = "Ctrl+Z"
//! ```

use crate::config::KeyBinding;
use crate::editor::Editor;
use crate::input::{Key, MouseButton, ToolKind};
use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Pointer button as written in scripts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl From<ScriptButton> for MouseButton {
    fn from(button: ScriptButton) -> Self {
        match button {
            ScriptButton::Left => MouseButton::Left,
            ScriptButton::Right => MouseButton::Right,
            ScriptButton::Middle => MouseButton::Middle,
        }
    }
}

/// One scripted input event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScriptEvent {
    Tool {
        tool: ToolKind,
    },
    Press {
        x: f64,
        y: f64,
        #[serde(default)]
        button: ScriptButton,
    },
    Motion {
        x: f64,
        y: f64,
    },
    Release {
        x: f64,
        y: f64,
        #[serde(default)]
        button: ScriptButton,
    },
    /// A key chord such as "Ctrl+Shift+Z" or "Escape"
    Key {
        key: String,
    },
    /// Plain characters, one key press each
    Type {
        text: String,
    },
    Scroll {
        x: f64,
        y: f64,
        steps: f64,
    },
    Viewport {
        width: f64,
        height: f64,
    },
    Undo,
    Redo,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub event: Vec<ScriptEvent>,
}

impl Script {
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse input script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::from_toml(&source).with_context(|| format!("Invalid script {}", path.display()))
    }

    /// Feeds every event to `editor` in order.
    pub fn replay(&self, editor: &mut Editor) -> Result<()> {
        for (index, event) in self.event.iter().enumerate() {
            debug!("Script event {}: {:?}", index, event);
            replay_event(editor, event).with_context(|| format!("Script event {}", index + 1))?;
        }
        Ok(())
    }
}

fn replay_event(editor: &mut Editor, event: &ScriptEvent) -> Result<()> {
    match event {
        ScriptEvent::Tool { tool } => editor.set_tool(*tool),
        ScriptEvent::Press { x, y, button } => editor.on_pointer_press((*button).into(), *x, *y),
        ScriptEvent::Motion { x, y } => editor.on_pointer_motion(*x, *y),
        ScriptEvent::Release { x, y, button } => {
            editor.on_pointer_release((*button).into(), *x, *y)
        }
        ScriptEvent::Key { key } => press_chord(editor, key)?,
        ScriptEvent::Type { text } => {
            for c in text.chars() {
                let key = match c {
                    ' ' => Key::Space,
                    '\n' => Key::Return,
                    c => Key::Char(c),
                };
                editor.on_key_press(key);
                editor.on_key_release(key);
            }
        }
        ScriptEvent::Scroll { x, y, steps } => editor.on_scroll(*x, *y, *steps),
        ScriptEvent::Viewport { width, height } => editor.set_viewport_size(*width, *height),
        ScriptEvent::Undo => {
            editor.undo();
        }
        ScriptEvent::Redo => {
            editor.redo();
        }
    }
    Ok(())
}

/// Presses the chord's modifiers, taps the key, then releases the modifiers.
fn press_chord(editor: &mut Editor, chord: &str) -> Result<()> {
    let binding = KeyBinding::parse(chord).map_err(|e| anyhow!(e))?;
    let key = key_from_name(&binding.key).ok_or_else(|| anyhow!("Unknown key '{}'", chord))?;

    let modifiers: Vec<Key> = [
        (binding.ctrl, Key::Ctrl),
        (binding.shift, Key::Shift),
        (binding.alt, Key::Alt),
    ]
    .into_iter()
    .filter_map(|(held, key)| held.then_some(key))
    .collect();

    for m in &modifiers {
        editor.on_key_press(*m);
    }
    editor.on_key_press(key);
    editor.on_key_release(key);
    for m in modifiers.iter().rev() {
        editor.on_key_release(*m);
    }
    Ok(())
}

/// Maps a (lowercased) binding key name back to a [`Key`].
fn key_from_name(name: &str) -> Option<Key> {
    let key = match name {
        "escape" | "esc" => Key::Escape,
        "return" | "enter" => Key::Return,
        "backspace" => Key::Backspace,
        "delete" => Key::Delete,
        "tab" => Key::Tab,
        "space" => Key::Space,
        _ => {
            let mut chars = name.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            Key::Char(c)
        }
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_events() {
        let script = Script::from_toml(
            r#"
            [[event]]
            kind = "tool"
            tool = "step_counter"

            [[event]]
            kind = "press"
            x = 1.0
            y = 2.0
            button = "middle"

            [[event]]
            kind = "undo"
            "#,
        )
        .unwrap();
        assert_eq!(
            script.event,
            vec![
                ScriptEvent::Tool {
                    tool: ToolKind::StepCounter
                },
                ScriptEvent::Press {
                    x: 1.0,
                    y: 2.0,
                    button: ScriptButton::Middle
                },
                ScriptEvent::Undo,
            ]
        );
    }

    #[test]
    fn empty_script_has_no_events() {
        assert!(Script::from_toml("").unwrap().event.is_empty());
    }

    #[test]
    fn unknown_event_kind_is_rejected() {
        assert!(Script::from_toml("[[event]]\nkind = \"teleport\"\n").is_err());
    }

    #[test]
    fn key_names_map_to_keys() {
        assert_eq!(key_from_name("escape"), Some(Key::Escape));
        assert_eq!(key_from_name("z"), Some(Key::Char('z')));
        assert_eq!(key_from_name("+"), Some(Key::Char('+')));
        assert_eq!(key_from_name("f13"), None);
    }
}
