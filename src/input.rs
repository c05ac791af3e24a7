//! Window input for the viewer.
//!
//! [`Input`] folds raw winit events into per-frame state: which keys went
//! down, how far the cursor was dragged, and how much the wheel turned. The
//! render loop reads it once per frame and then calls
//! [`begin_frame`](Input::begin_frame).

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    fn from_winit(btn: WinitMouseButton) -> Option<Self> {
        match btn {
            WinitMouseButton::Left => Some(MouseButton::Left),
            WinitMouseButton::Right => Some(MouseButton::Right),
            WinitMouseButton::Middle => Some(MouseButton::Middle),
            _ => None,
        }
    }
}

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Space,
    R,
    Escape,
    Other,
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::KeyR => KeyCode::R,
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other,
        }
    }
}

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Freeze or resume the simulation clock.
    TogglePause,
    /// Scatter every particle back into the spawn cube.
    Reset,
    /// Close the window.
    Quit,
}

impl Action {
    pub fn for_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Space => Some(Action::TogglePause),
            KeyCode::R => Some(Action::Reset),
            KeyCode::Escape => Some(Action::Quit),
            KeyCode::Other => None,
        }
    }
}

/// Per-frame keyboard and mouse state.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: Vec<KeyCode>,
    mouse_held: HashSet<MouseButton>,
    cursor: Option<Vec2>,
    drag_delta: Vec2,
    scroll_delta: f32,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor movement this frame while the left button was held, in pixels.
    pub fn drag_delta(&self) -> Vec2 {
        self.drag_delta
    }

    /// Wheel movement this frame in lines. Positive scrolls away from the user.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Actions triggered by keys that went down this frame, in press order.
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.keys_pressed.iter().filter_map(|k| Action::for_key(*k))
    }

    /// Clear per-frame state. Held keys and buttons persist.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.drag_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.key_down(code.into()),
                        ElementState::Released => self.key_up(code.into()),
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(btn) = MouseButton::from_winit(*button) {
                    match state {
                        ElementState::Pressed => self.button_down(btn),
                        ElementState::Released => self.button_up(btn),
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scrolled(match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                });
            }
            _ => {}
        }
    }

    fn key_down(&mut self, key: KeyCode) {
        // auto-repeat reports Pressed again; only the first counts
        if self.keys_held.insert(key) {
            self.keys_pressed.push(key);
        }
    }

    fn key_up(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    fn button_down(&mut self, button: MouseButton) {
        self.mouse_held.insert(button);
    }

    fn button_up(&mut self, button: MouseButton) {
        self.mouse_held.remove(&button);
    }

    fn cursor_moved(&mut self, position: Vec2) {
        if let Some(last) = self.cursor {
            if self.mouse_held(MouseButton::Left) {
                self.drag_delta += position - last;
            }
        }
        self.cursor = Some(position);
    }

    fn scrolled(&mut self, lines: f32) {
        self.scroll_delta += lines;
    }
}
