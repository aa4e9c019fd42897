//! Sensor-avoider behavior.
//!
//! After the shared bounce motion the robot scans a forward cone. Entities
//! inside the cone and in range add a fixed steering correction away from
//! themselves, but only while each detection is closer than every earlier
//! one. Sample rays spread across the cone add the same correction for every
//! ray whose endpoint leaves the arena. Half of the summed correction is
//! applied to the heading, so the robot curves away instead of snapping.

use glam::Vec2;

use crate::behavior::{mismatch, Behavior, TickContext};
use crate::canvas::{Canvas, SpriteKind};
use crate::config::SensorConfig;
use crate::entity::{Entity, EntityId, EntityInner, EntityTag};
use crate::error::UpdateError;
use crate::geometry::{from_heading, heading_of, normalize_angle};
use crate::view::ArenaView;

use super::wander::bounce_step;

/// Behavior of smart robots.
#[derive(Debug, Default, Clone, Copy)]
pub struct SensorBehavior;

/// Steering correction in degrees and whether anything was seen.
fn scan(
    id: EntityId,
    position: Vec2,
    heading: f32,
    view: &ArenaView<'_>,
    sensor: &SensorConfig,
) -> (f32, bool) {
    let half_angle_deg = sensor.angle_deg / 2.0;
    let half_angle = half_angle_deg.to_radians();
    let mut correction_deg = 0.0;
    let mut detected = false;
    let mut closest = f32::INFINITY;

    for other in view.iter() {
        if other.id() == id {
            continue;
        }
        let offset = other.position() - position;
        let distance = offset.length();
        if distance > sensor.range {
            continue;
        }
        let relative = normalize_angle(heading_of(offset) - heading);
        if relative.abs() > half_angle {
            continue;
        }
        detected = true;
        if distance < closest {
            closest = distance;
            correction_deg += if relative > 0.0 {
                -sensor.steer_deg
            } else {
                sensor.steer_deg
            };
        }
    }

    let bounds = view.bounds();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rays = (sensor.angle_deg / sensor.ray_step_deg).floor() as u32;
    for i in 0..=rays {
        #[allow(clippy::cast_precision_loss)]
        let ray_deg = -half_angle_deg + i as f32 * sensor.ray_step_deg;
        let end = position + from_heading(heading + ray_deg.to_radians(), sensor.range);
        if !bounds.contains_point(end) {
            detected = true;
            correction_deg += if ray_deg > 0.0 {
                -sensor.steer_deg
            } else {
                sensor.steer_deg
            };
        }
    }

    (correction_deg, detected)
}

impl Behavior for SensorBehavior {
    fn name(&self, _entity: &Entity) -> &'static str {
        "Smart Robot"
    }

    fn description(&self, _entity: &Entity) -> &'static str {
        "Sweeps a sensor beam ahead and steers away from anything it picks up."
    }

    fn update(&self, entity: &mut Entity, ctx: &mut TickContext<'_>) -> Result<(), UpdateError> {
        let id = entity.id();
        let EntityInner::SensorAvoider(robot) = &mut entity.inner else {
            return Err(mismatch(id, EntityTag::SensorAvoider));
        };
        bounce_step(id, &mut entity.body, &mut robot.motion, ctx);

        let heading = robot.motion.heading();
        let (correction_deg, detected) = scan(
            id,
            entity.body.position,
            heading,
            &ctx.view,
            &ctx.config.sensor,
        );
        if detected {
            robot
                .motion
                .set_heading(heading + (correction_deg / 2.0).to_radians());
        }
        robot.alert = detected;
        robot
            .frame
            .advance(ctx.frame_ticks(), ctx.config.agents.frame_count);
        Ok(())
    }

    fn draw(&self, entity: &Entity, canvas: &mut dyn Canvas) {
        let Some(robot) = entity.inner.as_sensor() else {
            return;
        };
        let heading = robot.motion.heading();
        let beam = entity.radius() * 4.0;
        let tip = entity.position() + from_heading(heading, entity.radius() + beam / 2.0);
        canvas.draw_sprite(
            SpriteKind::SensorBeam(robot.alert),
            tip.x,
            tip.y,
            beam,
            beam,
            heading.to_degrees(),
        );
        super::draw_body(
            canvas,
            SpriteKind::SensorAvoider(robot.frame.index),
            &entity.body,
            heading,
        );
    }
}
