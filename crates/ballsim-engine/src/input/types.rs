/// Keyboard key identifier.
///
/// Only the keys the demo reacts to are named; everything else is carried as
/// `Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Space,
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Event produced by polling the window system.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The window's native close control was used.
    CloseRequested,

    Key {
        key: Key,
        state: KeyState,
        /// Auto-repeat while held.
        repeat: bool,
    },

    /// New drawable size in physical pixels.
    Resized { width: u32, height: u32 },
}

impl InputEvent {
    /// Whether this event asks the frame loop to close.
    ///
    /// Escape closes on release, not press.
    pub fn is_close_request(&self) -> bool {
        matches!(
            self,
            InputEvent::CloseRequested
                | InputEvent::Key {
                    key: Key::Escape,
                    state: KeyState::Released,
                    ..
                }
        )
    }
}
