//! Surface watercraft: a self-integrated planar model. No solver-owned body;
//! a 2-D velocity and yaw are integrated directly, pinned to the buoyancy
//! plane with a small bob, bouncing off beaches and map walls.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use terrain_query::{MapBounds, TerrainQuery};

use crate::input::DriveInput;
use crate::math::{exp_approach, heading_2d, wrap_angle};
use crate::types::Phase;
use crate::vehicle::{Model, Vehicle};
use data_runtime::configs::vehicles::{SurfaceTunables, WorldTunables};

pub struct SurfaceModel {
    pub tun: SurfaceTunables,
    pub water_level: f32,
    /// Planar velocity in XZ.
    pub vel: Vec2,
    pub yaw_rate: f32,
    bob_t: f32,
}

impl SurfaceModel {
    pub fn new(tun: &SurfaceTunables, world: &WorldTunables) -> Self {
        Self {
            tun: tun.clone(),
            water_level: world.water_level,
            vel: Vec2::ZERO,
            yaw_rate: 0.0,
            bob_t: 0.0,
        }
    }

    pub fn reset_motion(&mut self) {
        self.vel = Vec2::ZERO;
        self.yaw_rate = 0.0;
        self.bob_t = 0.0;
    }
}

/// One tick of planar integration. Runs after the solver step purely for
/// ordering symmetry with the aircraft; the boat never touches the solver.
pub fn update(v: &mut Vehicle, dt: f32, terrain: &dyn TerrainQuery, bounds: MapBounds) {
    if v.phase != Phase::Active {
        return;
    }
    let occupied = v.driver.is_some();
    let input = if occupied { v.input.clamped() } else { DriveInput::default() };
    let yaw0 = v.yaw;
    let pos0 = v.pos;
    let Model::Surface(m) = &mut v.model else {
        return;
    };
    let tun = &m.tun;

    // Steering: same critically-damped smoothing as the aircraft, active
    // only above a minimum speed and scaled up with speed. No steering at a
    // stop.
    let speed = m.vel.length();
    let target_rate = if occupied && speed > tun.min_steer_speed {
        let factor = (speed / tun.steer_ref_speed).clamp(0.0, 1.0);
        input.steer_axis() * tun.turn_speed * factor
    } else {
        0.0
    };
    m.yaw_rate = exp_approach(m.yaw_rate, target_rate, tun.yaw_response, dt);
    let mut yaw = wrap_angle(yaw0 + m.yaw_rate * dt);

    let heading = heading_2d(yaw);
    let accel = tun.accel * input.thrust - tun.brake_accel * input.brake;
    m.vel += heading * (accel * dt);
    let drag = if occupied { tun.drag } else { tun.unoccupied_drag };
    m.vel *= (-drag * dt).exp();
    let speed = m.vel.length();
    if speed > tun.max_speed {
        m.vel *= tun.max_speed / speed;
    }

    // Shoreline: probe the projected position; terrain above the water line
    // means beach. Roll back, reflect the forward component, damp both --
    // a bounce off the sand, not a hard stop.
    let mut cur = Vec2::new(pos0.x, pos0.z);
    let next = cur + m.vel * dt;
    let ground = terrain.height_at(next.x, next.y);
    if ground > m.water_level + tun.shore_clearance {
        let fwd = m.vel.dot(heading);
        let lat = m.vel - heading * fwd;
        m.vel = (heading * (-fwd * tun.bounce_restitution) + lat) * tun.bounce_damping;
    } else {
        cur = next;
    }

    // Map walls: reflect heading and velocity across the violated axis and
    // scrub speed. Stricter than the aircraft's clamp.
    let mut bounced = false;
    if cur.x.abs() > bounds.half_x {
        cur.x = cur.x.clamp(-bounds.half_x, bounds.half_x);
        m.vel.x = -m.vel.x;
        yaw = wrap_angle(-yaw);
        bounced = true;
    }
    if cur.y.abs() > bounds.half_z {
        cur.y = cur.y.clamp(-bounds.half_z, bounds.half_z);
        m.vel.y = -m.vel.y;
        yaw = wrap_angle(PI - yaw);
        bounced = true;
    }
    if bounced {
        m.vel *= tun.wall_speed_scrub;
    }

    m.bob_t += dt;
    let y = tun.hull_y + tun.bob_amplitude * (m.bob_t * tun.bob_frequency * TAU).sin();

    v.yaw = yaw;
    v.pos = Vec3::new(cur.x, y, cur.y);
}
