//! Rotary-wing flight model: force-driven with anti-gravity compensation.
//!
//! Two passes per tick around the solver step. `drive` turns driver intent
//! into forces and writes the directly-integrated heading into the body;
//! `resolve` reads the solver's answer, applies the safety-net constraints,
//! updates the cosmetic attitude, and clears the tick's forces.
//!
//! Yaw is never left to solver torque integration: rotations stay locked at
//! the solver level and the heading comes from a critically-damped target
//! yaw rate, so precise player-controlled heading is decoupled from the
//! cosmetic pitch/roll lean.

use glam::{Quat, Vec3};
use rapier3d::prelude::RigidBodyType;
use terrain_query::{MapBounds, TerrainQuery};

use crate::input::DriveInput;
use crate::math::{attack_release, exp_approach, heading_xz, right_xz, wrap_angle};
use crate::solver::{BodyProfile, SolverWorld};
use crate::types::Phase;
use crate::vehicle::{Model, Vehicle};
use data_runtime::configs::vehicles::{RotaryTunables, WorldTunables};

pub struct RotaryModel {
    pub tun: RotaryTunables,
    pub gravity: f32,
    /// Smoothed yaw rate, rad/s.
    pub yaw_rate: f32,
    /// Occupancy baked into the last applied Active profile.
    pub applied_occupancy: Option<bool>,
}

impl RotaryModel {
    pub fn new(tun: &RotaryTunables, world: &WorldTunables) -> Self {
        Self {
            tun: tun.clone(),
            gravity: world.gravity,
            yaw_rate: 0.0,
            applied_occupancy: None,
        }
    }
}

/// Body configuration for each phase and occupancy, applied atomically on
/// transitions. Occupancy only matters while Active (empty craft settle
/// under heavier damping).
pub fn profile(phase: Phase, occupied: bool, tun: &RotaryTunables) -> BodyProfile {
    match phase {
        Phase::Active => BodyProfile {
            body_type: RigidBodyType::Dynamic,
            linear_damping: if occupied { tun.linear_damping } else { tun.unoccupied_damping },
            angular_damping: 4.0,
            rotations_locked: true,
            collider_enabled: true,
            gravity_scale: 1.0,
        },
        // Free tumble: rotations unlocked, damping loosened, lift hook gone.
        Phase::Crashing => BodyProfile {
            body_type: RigidBodyType::Dynamic,
            linear_damping: 0.1,
            angular_damping: 0.5,
            rotations_locked: false,
            collider_enabled: true,
            gravity_scale: 1.0,
        },
        Phase::AwaitingRespawn => BodyProfile {
            body_type: RigidBodyType::KinematicPositionBased,
            linear_damping: 0.0,
            angular_damping: 0.0,
            rotations_locked: true,
            collider_enabled: false,
            gravity_scale: 0.0,
        },
    }
}

/// Intent phase: driver input -> forces and heading, before the solver steps.
pub fn drive(v: &mut Vehicle, dt: f32, solver: &mut SolverWorld) {
    if v.phase != Phase::Active {
        return;
    }
    let Some(b) = v.body else {
        return;
    };
    let Model::Rotary(m) = &mut v.model else {
        return;
    };
    let occupied = v.driver.is_some();
    let tun = &m.tun;
    let mass = tun.mass;

    // Lift must act once per solver sub-step, not once per render tick, or
    // gravity accumulates unbounded velocity between renders.
    solver.set_pre_step_force(b, Some(Vec3::Y * mass * m.gravity));
    if m.applied_occupancy != Some(occupied) {
        solver.apply_profile(b, &profile(Phase::Active, occupied, tun));
        m.applied_occupancy = Some(occupied);
    }

    let input = if occupied { v.input.clamped() } else { DriveInput::default() };
    let heading = heading_xz(v.yaw);

    let throttle = input.thrust - input.brake;
    if throttle != 0.0 {
        solver.add_force(b, heading * (tun.accel * mass * throttle));
    }

    // Soft speed cap: counter-force on the excess rather than a hard clamp,
    // so collision response stays physically consistent.
    let vel = solver.linvel(b);
    let horiz = Vec3::new(vel.x, 0.0, vel.z);
    let speed = horiz.length();
    if speed > tun.max_speed {
        let excess = speed - tun.max_speed;
        solver.add_force(b, horiz * (-excess * mass * tun.overspeed_gain / speed));
    }

    if input.ascend {
        solver.add_force(b, Vec3::Y * (tun.climb_accel * mass));
    } else if input.descend {
        solver.add_force(b, Vec3::NEG_Y * (tun.climb_accel * mass));
    }
    if !occupied {
        // Empty craft settle instead of drifting forever.
        solver.add_force(b, Vec3::NEG_Y * tun.settle_force);
    }

    let target_rate = if occupied { input.steer_axis() * tun.turn_speed } else { 0.0 };
    m.yaw_rate = exp_approach(m.yaw_rate, target_rate, tun.yaw_response, dt);
    v.yaw = wrap_angle(v.yaw + m.yaw_rate * dt);
    // Rotations are locked at the solver, so this write is the only source
    // of body orientation.
    solver.set_rotation(b, Quat::from_rotation_y(v.yaw));
}

/// Resolve phase: read the solver's pose, apply safety nets, update the
/// cosmetic attitude, and clear the tick's forces.
pub fn resolve(
    v: &mut Vehicle,
    dt: f32,
    solver: &mut SolverWorld,
    terrain: &dyn TerrainQuery,
    bounds: MapBounds,
) {
    if v.phase != Phase::Active {
        return;
    }
    let Some(b) = v.body else {
        return;
    };
    let (tun, yaw_rate) = match &v.model {
        Model::Rotary(m) => (m.tun.clone(), m.yaw_rate),
        Model::Surface(_) => return,
    };

    let mut pos = solver.translation(b);
    let mut vel = solver.linvel(b);
    let mut touched = false;

    let floor = (terrain.height_at(pos.x, pos.z) + tun.skid_clearance).max(tun.min_altitude);
    if pos.y < floor {
        pos.y = floor;
        if vel.y < 0.0 {
            vel.y = 0.0;
        }
        touched = true;
    } else if pos.y > tun.max_altitude {
        pos.y = tun.max_altitude;
        if vel.y > 0.0 {
            vel.y = 0.0;
        }
        touched = true;
    }

    let (x_out, z_out) = bounds.violated_axes(pos);
    if x_out {
        pos.x = pos.x.clamp(-bounds.half_x, bounds.half_x);
        if vel.x * pos.x.signum() > 0.0 {
            vel.x = 0.0;
        }
        touched = true;
    }
    if z_out {
        pos.z = pos.z.clamp(-bounds.half_z, bounds.half_z);
        if vel.z * pos.z.signum() > 0.0 {
            vel.z = 0.0;
        }
        touched = true;
    }

    if touched {
        solver.set_translation(b, pos);
        solver.set_linvel(b, vel);
    }
    v.pos = pos;

    // Cosmetic attitude: speed-proportional dip plus an anticipatory input
    // term, banking from the yaw rate plus lateral drift. Faster attack than
    // release gives the snap-then-settle feel.
    let heading = heading_xz(v.yaw);
    let fwd_speed = vel.dot(heading);
    let lateral = vel.dot(right_xz(v.yaw));
    let throttle = v.input.thrust - v.input.brake;
    let target_pitch = (tun.pitch_per_speed * (fwd_speed / tun.max_speed)
        + tun.pitch_per_input * throttle
        - tun.pitch_per_climb * vel.y)
        .clamp(-tun.max_pitch, tun.max_pitch);
    let target_roll = (-tun.roll_per_yaw * (yaw_rate / tun.turn_speed)
        - tun.roll_per_drift * lateral)
        .clamp(-tun.max_roll, tun.max_roll);
    v.pitch = attack_release(v.pitch, target_pitch, tun.attitude_attack, tun.attitude_release, dt);
    v.roll = attack_release(v.roll, target_roll, tun.attitude_attack, tun.attitude_release, dt);

    // Forces accumulate for exactly one tick.
    solver.reset_forces(b);
}
