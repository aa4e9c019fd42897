//! Discrete input events delivered to the player-controlled entity.
//!
//! The engine never polls a device. A shell translates key presses into
//! [`InputEvent`]s and hands them to
//! [`Arena::handle_input`](crate::arena::Arena::handle_input) between ticks.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One of the four movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward negative Y.
    Up,
    /// Toward positive Y.
    Down,
    /// Toward negative X.
    Left,
    /// Toward positive X.
    Right,
}

impl Direction {
    /// All directions, in the order used to pick a fallback when keys are released.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit vector for this direction in screen coordinates.
    #[must_use]
    pub const fn unit(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Sprite rotation in degrees when facing this direction.
    #[must_use]
    pub const fn rotation_deg(self) -> f32 {
        match self {
            Self::Up => 270.0,
            Self::Down => 90.0,
            Self::Left => 180.0,
            Self::Right => 0.0,
        }
    }

    /// The flag bit tracking this direction in [`DirectionKeys`].
    #[must_use]
    pub const fn key(self) -> DirectionKeys {
        match self {
            Self::Up => DirectionKeys::UP,
            Self::Down => DirectionKeys::DOWN,
            Self::Left => DirectionKeys::LEFT,
            Self::Right => DirectionKeys::RIGHT,
        }
    }
}

bitflags! {
    /// Direction keys currently held down.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DirectionKeys: u8 {
        /// Up key held.
        const UP = 1 << 0;
        /// Down key held.
        const DOWN = 1 << 1;
        /// Left key held.
        const LEFT = 1 << 2;
        /// Right key held.
        const RIGHT = 1 << 3;
    }
}

/// A key event for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// A direction key went down.
    Pressed(Direction),
    /// A direction key went up.
    Released(Direction),
    /// The interact key was pressed.
    Interact,
}
