//! Input events for mouse, touch and keyboard.

use kurbo::Point;
use serde::{Deserialize, Serialize};

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. } => position,
        }
    }
}

/// Touch event with the positions of all active touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TouchEvent {
    Start(Vec<Point>),
    Move(Vec<Point>),
    /// Touches still on the surface after the lift.
    End(Vec<Point>),
}

impl TouchEvent {
    /// Translate to the equivalent pointer event.
    ///
    /// Only single-touch gestures map to a pointer; anything with two or
    /// more touches yields `None`. A lift maps to a primary-button release
    /// at `last_position`.
    pub fn to_pointer(&self, last_position: Point) -> Option<PointerEvent> {
        match self {
            TouchEvent::Start(touches) => match touches.as_slice() {
                [only] => Some(PointerEvent::Down {
                    position: *only,
                    button: MouseButton::Left,
                }),
                _ => None,
            },
            TouchEvent::Move(touches) => match touches.as_slice() {
                [only] => Some(PointerEvent::Move { position: *only }),
                _ => None,
            },
            TouchEvent::End(_) => Some(PointerEvent::Up {
                position: last_position,
                button: MouseButton::Left,
            }),
        }
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Escape,
    Other(String),
}

impl Key {
    /// Map a key name, as reported by the platform, to a key.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" => Key::Delete,
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

/// Double-click detection thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubleClickConfig {
    /// Longest gap between the two presses, in milliseconds.
    pub max_interval_ms: u64,
    /// Largest distance between the two presses, in screen pixels.
    pub max_distance: f64,
}

impl Default for DoubleClickConfig {
    fn default() -> Self {
        Self {
            max_interval_ms: 500,
            max_distance: 5.0,
        }
    }
}

/// Detects double clicks from consecutive presses.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    config: DoubleClickConfig,
    last_click_time: Option<Instant>,
    last_click_position: Option<Point>,
}

impl ClickTracker {
    pub fn new(config: DoubleClickConfig) -> Self {
        Self {
            config,
            last_click_time: None,
            last_click_position: None,
        }
    }

    /// Record a primary press and report whether it completes a double click.
    pub fn press(&mut self, position: Point) -> bool {
        self.press_at(position, Instant::now())
    }

    fn press_at(&mut self, position: Point, now: Instant) -> bool {
        if let (Some(last_time), Some(last_pos)) = (self.last_click_time, self.last_click_position) {
            let elapsed = now.saturating_duration_since(last_time);
            let distance = (position - last_pos).hypot();
            if elapsed < Duration::from_millis(self.config.max_interval_ms)
                && distance < self.config.max_distance
            {
                // Reset to prevent triple-click being detected as another double-click
                self.reset();
                return true;
            }
        }
        self.last_click_time = Some(now);
        self.last_click_position = Some(position);
        false
    }

    pub fn reset(&mut self) {
        self.last_click_time = None;
        self.last_click_position = None;
    }
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DoubleClickConfig::default())
    }
}
