//! Small smoothing/heading helpers shared by both vehicle models.

use glam::{Vec2, Vec3};

/// Frame-rate independent exponential approach toward `target`.
#[inline]
pub fn exp_approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (1.0 - (-rate * dt).exp())
}

/// Exponential approach with separate rates: `attack` while the magnitude is
/// growing, `release` while it recovers toward zero (snap-then-settle).
#[inline]
pub fn attack_release(current: f32, target: f32, attack: f32, release: f32, dt: f32) -> f32 {
    let rate = if target.abs() > current.abs() { attack } else { release };
    exp_approach(current, target, rate, dt)
}

/// Wrap an angle into (-PI, PI].
#[inline]
pub fn wrap_angle(a: f32) -> f32 {
    let mut a = a.rem_euclid(std::f32::consts::TAU);
    if a > std::f32::consts::PI {
        a -= std::f32::consts::TAU;
    }
    a
}

/// Facing vector from yaw (CCW, +Z forward at yaw 0).
#[inline]
pub fn heading_xz(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

#[inline]
pub fn heading_2d(yaw: f32) -> Vec2 {
    Vec2::new(yaw.sin(), yaw.cos())
}

/// Rightward vector for the same yaw convention.
#[inline]
pub fn right_xz(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}
