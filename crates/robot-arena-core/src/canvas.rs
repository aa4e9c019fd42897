//! Draw surface capability.
//!
//! The engine draws through the [`Canvas`] trait and never depends on a
//! concrete renderer. A GUI shell implements it over its graphics context;
//! [`RecordingCanvas`] keeps the calls of the latest frame in memory for the
//! headless driver and for tests.

use serde::{Deserialize, Serialize};

/// Image to draw for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKind {
    /// Tree obstacle.
    Tree,
    /// Rock obstacle.
    Rock,
    /// Wood drop.
    WoodDrop,
    /// Rock drop.
    RockDrop,
    /// Basic robot, with animation frame.
    Wanderer(u8),
    /// Smart robot, with animation frame.
    SensorAvoider(u8),
    /// Sensor cone in front of a smart robot. `true` when something is detected.
    SensorBeam(bool),
    /// Predator robot, with animation frame.
    Pursuer(u8),
    /// Lumber robot, with animation frame.
    Lumber(u8),
    /// Miner robot, with animation frame.
    Miner(u8),
    /// Player robot, with animation frame.
    Player(u8),
    /// Shopkeeper.
    Trader,
    /// Night enemy, with animation frame.
    Enemy(u8),
}

/// Draw calls the engine issues.
pub trait Canvas {
    /// Starts a frame by clearing the surface.
    fn clear(&mut self);

    /// Draws the arena outline.
    fn draw_border(&mut self, width: f32, height: f32);

    /// Draws a sprite centered at `(x, y)`, rotated clockwise by `rotation_deg`.
    fn draw_sprite(
        &mut self,
        sprite: SpriteKind,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rotation_deg: f32,
    );

    /// Draws a line of text anchored at `(x, y)`.
    fn draw_text(&mut self, x: f32, y: f32, text: &str);

    /// Draws the "press E" prompt above an interactable entity.
    fn draw_key_indicator(&mut self, x: f32, y: f32) {
        self.draw_text(x, y, "E");
    }

    /// Darkens the whole surface; `darkness` runs from 0 (none) to 1 (black).
    fn apply_lighting_overlay(&mut self, _darkness: f32) {}
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCall {
    /// `clear`.
    Clear,
    /// `draw_border`.
    Border {
        /// Width.
        width: f32,
        /// Height.
        height: f32,
    },
    /// `draw_sprite`.
    Sprite {
        /// Image.
        sprite: SpriteKind,
        /// Center x.
        x: f32,
        /// Center y.
        y: f32,
        /// Width.
        width: f32,
        /// Height.
        height: f32,
        /// Rotation in degrees.
        rotation_deg: f32,
    },
    /// `draw_text`.
    Text {
        /// Anchor x.
        x: f32,
        /// Anchor y.
        y: f32,
        /// Text.
        text: String,
    },
    /// `draw_key_indicator`.
    KeyIndicator {
        /// Anchor x.
        x: f32,
        /// Anchor y.
        y: f32,
    },
    /// `apply_lighting_overlay`.
    Lighting {
        /// Darkness level.
        darkness: f32,
    },
}

/// Canvas that records the calls of the most recent frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls since the last `clear`, including the `clear` itself.
    #[must_use]
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Sprites drawn this frame, in draw order.
    pub fn sprites(&self) -> impl Iterator<Item = SpriteKind> + '_ {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Sprite { sprite, .. } => Some(*sprite),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self) {
        self.calls.clear();
        self.calls.push(DrawCall::Clear);
    }

    fn draw_border(&mut self, width: f32, height: f32) {
        self.calls.push(DrawCall::Border { width, height });
    }

    fn draw_sprite(
        &mut self,
        sprite: SpriteKind,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rotation_deg: f32,
    ) {
        self.calls.push(DrawCall::Sprite {
            sprite,
            x,
            y,
            width,
            height,
            rotation_deg,
        });
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) {
        self.calls.push(DrawCall::Text {
            x,
            y,
            text: text.to_owned(),
        });
    }

    fn draw_key_indicator(&mut self, x: f32, y: f32) {
        self.calls.push(DrawCall::KeyIndicator { x, y });
    }

    fn apply_lighting_overlay(&mut self, darkness: f32) {
        self.calls.push(DrawCall::Lighting { darkness });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_starts_a_new_frame() {
        let mut canvas = RecordingCanvas::new();
        canvas.draw_text(1.0, 2.0, "old");
        canvas.clear();
        canvas.draw_sprite(SpriteKind::Tree, 10.0, 10.0, 75.0, 75.0, 0.0);
        assert_eq!(canvas.calls().len(), 2);
        assert_eq!(canvas.sprites().collect::<Vec<_>>(), vec![SpriteKind::Tree]);
    }

    #[test]
    fn default_key_indicator_draws_text() {
        struct TextOnly(Vec<String>);
        impl Canvas for TextOnly {
            fn clear(&mut self) {}
            fn draw_border(&mut self, _: f32, _: f32) {}
            fn draw_sprite(&mut self, _: SpriteKind, _: f32, _: f32, _: f32, _: f32, _: f32) {}
            fn draw_text(&mut self, _: f32, _: f32, text: &str) {
                self.0.push(text.to_owned());
            }
        }

        let mut canvas = TextOnly(Vec::new());
        canvas.draw_key_indicator(0.0, 0.0);
        canvas.apply_lighting_overlay(0.5);
        assert_eq!(canvas.0, vec!["E".to_owned()]);
    }
}
