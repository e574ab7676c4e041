//! Input adapter
//!
//! Normalizes pointer, touch and keyboard events into a device-independent
//! `Intent`. The adapter only records intent; it never touches the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::Board;

/// Cricket shot selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotKind {
    Defend,
    Drive,
    Loft,
}

/// Logical keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    /// Launch / fire / swing
    Action,
    Shot(ShotKind),
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code` (or `key`) to a logical key
    pub fn from_code(code: &str) -> Key {
        match code {
            "ArrowLeft" | "KeyA" | "a" | "A" => Key::Left,
            "ArrowRight" | "KeyD" | "d" | "D" => Key::Right,
            "Space" | " " | "Enter" | "ArrowUp" | "KeyW" => Key::Action,
            "Digit1" | "1" => Key::Shot(ShotKind::Defend),
            "Digit2" | "2" => Key::Shot(ShotKind::Drive),
            "Digit3" | "3" => Key::Shot(ShotKind::Loft),
            _ => Key::Other,
        }
    }
}

/// Raw device event in display coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Mouse moved to (x, y) on a surface of the given display size
    PointerMove { x: f32, y: f32, surface: Vec2 },
    /// Mouse button pressed
    PointerDown { x: f32, y: f32, surface: Vec2 },
    PointerUp,
    TouchStart { x: f32, y: f32, surface: Vec2 },
    TouchMove { x: f32, y: f32, surface: Vec2 },
    TouchEnd,
    KeyDown { key: Key, repeat: bool },
    KeyUp { key: Key },
}

/// Which device spoke last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    None,
    Pointer,
    Touch,
    Keyboard,
}

/// Per-tick player intent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Intent {
    /// Desired avatar x in board units (pointer/touch)
    pub target_x: Option<f32>,
    /// Keyboard steering in [-1, 1]
    pub steer: f32,
    /// Primary action pressed since the last sample
    pub primary: bool,
    /// Shot selected since the last sample
    pub shot: Option<ShotKind>,
}

/// Records the most recent device intent
#[derive(Debug, Clone, Default)]
pub struct InputAdapter {
    board: Board,
    device: Device,
    target_x: Option<f32>,
    left_held: bool,
    right_held: bool,
    action_held: bool,
    pointer_held: bool,
    primary_pending: bool,
    shot_pending: Option<ShotKind>,
}

impl InputAdapter {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            ..Default::default()
        }
    }

    /// Forget everything (new session)
    pub fn reset(&mut self) {
        *self = Self::new(self.board);
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Record one device event; malformed events are ignored
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y, surface } => {
                if let Some(bx) = self.to_board_x(x, y, surface) {
                    self.device = Device::Pointer;
                    self.target_x = Some(bx);
                }
            }
            InputEvent::PointerDown { x, y, surface } => {
                if let Some(bx) = self.to_board_x(x, y, surface) {
                    self.device = Device::Pointer;
                    self.target_x = Some(bx);
                    if !self.pointer_held {
                        self.primary_pending = true;
                    }
                    self.pointer_held = true;
                }
            }
            InputEvent::PointerUp | InputEvent::TouchEnd => {
                self.pointer_held = false;
            }
            InputEvent::TouchStart { x, y, surface } => {
                if let Some(bx) = self.to_board_x(x, y, surface) {
                    self.device = Device::Touch;
                    self.target_x = Some(bx);
                    if !self.pointer_held {
                        self.primary_pending = true;
                    }
                    self.pointer_held = true;
                }
            }
            InputEvent::TouchMove { x, y, surface } => {
                if let Some(bx) = self.to_board_x(x, y, surface) {
                    self.device = Device::Touch;
                    self.target_x = Some(bx);
                }
            }
            InputEvent::KeyDown { key, repeat } => self.key_down(key, repeat),
            InputEvent::KeyUp { key } => self.key_up(key),
        }
    }

    fn key_down(&mut self, key: Key, repeat: bool) {
        match key {
            Key::Left => {
                self.left_held = true;
                self.take_keyboard();
            }
            Key::Right => {
                self.right_held = true;
                self.take_keyboard();
            }
            Key::Action => {
                if !repeat && !self.action_held {
                    self.primary_pending = true;
                }
                self.action_held = true;
            }
            Key::Shot(shot) => {
                if !repeat {
                    self.shot_pending = Some(shot);
                }
            }
            Key::Other => log::trace!("Ignoring unmapped key"),
        }
    }

    fn key_up(&mut self, key: Key) {
        match key {
            Key::Left => self.left_held = false,
            Key::Right => self.right_held = false,
            Key::Action => self.action_held = false,
            _ => {}
        }
    }

    fn take_keyboard(&mut self) {
        self.device = Device::Keyboard;
        self.target_x = None;
    }

    /// Display x -> board x; None for malformed coordinates
    fn to_board_x(&self, x: f32, y: f32, surface: Vec2) -> Option<f32> {
        if !(x.is_finite() && y.is_finite() && surface.x.is_finite() && surface.y.is_finite()) {
            log::trace!("Ignoring non-finite input event");
            return None;
        }
        if surface.x <= 0.0 || surface.y <= 0.0 {
            log::trace!("Ignoring input event with empty surface");
            return None;
        }
        Some((x / surface.x * self.board.width).clamp(0.0, self.board.width))
    }

    /// Current intent; edge-triggered actions are consumed
    pub fn sample(&mut self) -> Intent {
        let steer = if self.device == Device::Keyboard {
            (self.right_held as i32 - self.left_held as i32) as f32
        } else {
            0.0
        };
        Intent {
            target_x: self.target_x,
            steer,
            primary: std::mem::take(&mut self.primary_pending),
            shot: self.shot_pending.take(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> InputAdapter {
        InputAdapter::new(Board {
            width: 480.0,
            height: 640.0,
        })
    }

    #[test]
    fn test_pointer_rescaled_to_board() {
        let mut input = adapter();
        input.handle(InputEvent::PointerMove {
            x: 480.0,
            y: 10.0,
            surface: Vec2::new(960.0, 1280.0),
        });
        assert_eq!(input.sample().target_x, Some(240.0));
    }

    #[test]
    fn test_touch_sets_target_and_fires_once() {
        let mut input = adapter();
        let surface = Vec2::new(240.0, 320.0);
        input.handle(InputEvent::TouchStart {
            x: 60.0,
            y: 10.0,
            surface,
        });
        let intent = input.sample();
        assert_eq!(intent.target_x, Some(120.0));
        assert!(intent.primary);
        input.handle(InputEvent::TouchMove {
            x: 120.0,
            y: 10.0,
            surface,
        });
        let intent = input.sample();
        assert_eq!(intent.target_x, Some(240.0));
        assert!(!intent.primary);
    }

    #[test]
    fn test_malformed_events_ignored() {
        let mut input = adapter();
        input.handle(InputEvent::PointerMove {
            x: f32::NAN,
            y: 0.0,
            surface: Vec2::new(480.0, 640.0),
        });
        input.handle(InputEvent::PointerDown {
            x: 10.0,
            y: 0.0,
            surface: Vec2::ZERO,
        });
        let intent = input.sample();
        assert_eq!(intent, Intent::default());
    }

    #[test]
    fn test_action_is_edge_triggered() {
        let mut input = adapter();
        input.handle(InputEvent::KeyDown {
            key: Key::Action,
            repeat: false,
        });
        assert!(input.sample().primary);
        // Held key auto-repeats and stays down across frames
        input.handle(InputEvent::KeyDown {
            key: Key::Action,
            repeat: true,
        });
        assert!(!input.sample().primary);
        assert!(!input.sample().primary);
        input.handle(InputEvent::KeyUp { key: Key::Action });
        input.handle(InputEvent::KeyDown {
            key: Key::Action,
            repeat: false,
        });
        assert!(input.sample().primary);
    }

    #[test]
    fn test_keyboard_steer_while_held() {
        let mut input = adapter();
        input.handle(InputEvent::KeyDown {
            key: Key::Left,
            repeat: false,
        });
        assert_eq!(input.sample().steer, -1.0);
        assert_eq!(input.sample().steer, -1.0);
        input.handle(InputEvent::KeyDown {
            key: Key::Right,
            repeat: false,
        });
        assert_eq!(input.sample().steer, 0.0);
        input.handle(InputEvent::KeyUp { key: Key::Left });
        assert_eq!(input.sample().steer, 1.0);
    }

    #[test]
    fn test_latest_device_wins() {
        let mut input = adapter();
        let surface = Vec2::new(480.0, 640.0);
        input.handle(InputEvent::PointerMove {
            x: 100.0,
            y: 0.0,
            surface,
        });
        input.handle(InputEvent::KeyDown {
            key: Key::Right,
            repeat: false,
        });
        let intent = input.sample();
        assert_eq!(intent.target_x, None);
        assert_eq!(intent.steer, 1.0);

        input.handle(InputEvent::PointerMove {
            x: 300.0,
            y: 0.0,
            surface,
        });
        let intent = input.sample();
        assert_eq!(intent.target_x, Some(300.0));
        assert_eq!(intent.steer, 0.0);
    }

    #[test]
    fn test_shot_selection_consumed() {
        let mut input = adapter();
        input.handle(InputEvent::KeyDown {
            key: Key::from_code("Digit3"),
            repeat: false,
        });
        assert_eq!(input.sample().shot, Some(ShotKind::Loft));
        assert_eq!(input.sample().shot, None);
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code("ArrowLeft"), Key::Left);
        assert_eq!(Key::from_code("Space"), Key::Action);
        assert_eq!(Key::from_code("KeyQ"), Key::Other);
    }
}
