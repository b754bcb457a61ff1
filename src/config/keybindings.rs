//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps keyboard events to actions.
///
/// Only non-character keys are bound; printable characters always go to the
/// composer.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    ///
    /// Key state and kind flags are ignored so that press events from
    /// terminals reporting extra detail still match.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings
            .get(&KeyEvent::new(key.code, key.modifiers))
            .copied()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = HashMap::new();
        let mut bind = |code, modifiers, action| {
            bindings.insert(KeyEvent::new(code, modifiers), action);
        };

        bind(KeyCode::Up, KeyModifiers::NONE, KeyAction::ScrollUp);
        bind(KeyCode::Down, KeyModifiers::NONE, KeyAction::ScrollDown);
        bind(KeyCode::PageUp, KeyModifiers::NONE, KeyAction::PageUp);
        bind(KeyCode::PageDown, KeyModifiers::NONE, KeyAction::PageDown);
        bind(KeyCode::Home, KeyModifiers::NONE, KeyAction::ScrollToTop);
        bind(KeyCode::End, KeyModifiers::NONE, KeyAction::ScrollToBottom);

        bind(KeyCode::Enter, KeyModifiers::NONE, KeyAction::Submit);
        bind(KeyCode::Backspace, KeyModifiers::NONE, KeyAction::DeleteBack);
        bind(KeyCode::Left, KeyModifiers::NONE, KeyAction::CursorLeft);
        bind(KeyCode::Right, KeyModifiers::NONE, KeyAction::CursorRight);

        // Raw mode swallows SIGINT, so Ctrl+C arrives as a key.
        bind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyAction::Quit);
        bind(KeyCode::Char('d'), KeyModifiers::CONTROL, KeyAction::Quit);

        Self { bindings }
    }
}
