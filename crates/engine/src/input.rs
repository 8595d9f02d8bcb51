use crate::sim::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ArrowUp,
    ArrowRight,
    ArrowDown,
    ArrowLeft,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// One discrete event from the input feed, delivered in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    MouseDown {
        button: MouseButton,
        position: (i32, i32),
    },
}

pub fn direction_for_key(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::ArrowUp => Some(Direction::Up),
        KeyCode::ArrowRight => Some(Direction::Right),
        KeyCode::ArrowDown => Some(Direction::Down),
        KeyCode::ArrowLeft => Some(Direction::Left),
        KeyCode::Escape | KeyCode::Other => None,
    }
}
