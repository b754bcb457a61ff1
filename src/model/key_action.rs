//! Domain-level keyboard actions independent of key bindings.

/// Domain-level actions that can be mapped to key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `KeyAction` is handled by `KeyBindings`.
/// Printable characters without a binding are typed into the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Scrolling
    /// Scroll the log up by one line. Default: ↑
    ScrollUp,
    /// Scroll the log down by one line. Default: ↓
    ScrollDown,
    /// Scroll up by one viewport height. Default: Page Up
    PageUp,
    /// Scroll down by one viewport height. Default: Page Down
    PageDown,
    /// Jump to the oldest line. Default: Home
    ScrollToTop,
    /// Jump to the newest line. Default: End
    ScrollToBottom,

    // Composer
    /// Send the composed line and clear it. Default: Enter
    Submit,
    /// Delete the character before the cursor. Default: Backspace
    DeleteBack,
    /// Move the composer cursor left. Default: ←
    CursorLeft,
    /// Move the composer cursor right. Default: →
    CursorRight,

    // Application
    /// Exit the client. Default: Ctrl+C
    Quit,
}

impl KeyAction {
    /// Whether this action moves the log viewport.
    pub fn is_scroll(self) -> bool {
        matches!(
            self,
            KeyAction::ScrollUp
                | KeyAction::ScrollDown
                | KeyAction::PageUp
                | KeyAction::PageDown
                | KeyAction::ScrollToTop
                | KeyAction::ScrollToBottom
        )
    }
}
