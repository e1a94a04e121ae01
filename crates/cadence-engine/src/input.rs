//! Keyboard handling. Escape is the only key the sample reacts to.

use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

/// True for the key press that ends the frame loop.
pub fn is_quit_key(key: PhysicalKey, state: ElementState) -> bool {
    state == ElementState::Pressed && key == PhysicalKey::Code(KeyCode::Escape)
}
