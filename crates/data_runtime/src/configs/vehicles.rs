//! Vehicle tuning loaded from data/config/vehicles.toml with sensible
//! defaults and clamping.
//!
//! Seat offsets are local-space `[x, y, z]` with slot 0 always the driver.

use anyhow::{Context, Result};
use glam::Vec3;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct VehicleTunables {
    #[serde(default)]
    pub world: WorldTunables,
    #[serde(default)]
    pub rotary: RotaryTunables,
    #[serde(default)]
    pub surface: SurfaceTunables,
    #[serde(default)]
    pub spawn: SpawnTunables,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldTunables {
    pub water_level: f32,
    /// Positive magnitude; the solver gravity vector is `-Y * gravity`.
    pub gravity: f32,
    pub substep_hz: f32,
    pub map_half_x: f32,
    pub map_half_z: f32,
}

impl Default for WorldTunables {
    fn default() -> Self {
        Self {
            water_level: 0.0,
            gravity: 9.81,
            substep_hz: 60.0,
            map_half_x: 240.0,
            map_half_z: 240.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RotaryTunables {
    pub mass: f32,
    pub max_hp: i32,
    /// Horizontal thrust/brake acceleration, m/s^2 at full input.
    pub accel: f32,
    pub max_speed: f32,
    /// Counter-force gain on horizontal speed above `max_speed`, 1/s.
    pub overspeed_gain: f32,
    /// Max yaw rate, rad/s.
    pub turn_speed: f32,
    /// Yaw-rate approach gain, 1/s (critically-damped feel).
    pub yaw_response: f32,
    pub climb_accel: f32,
    pub min_altitude: f32,
    pub max_altitude: f32,
    pub skid_clearance: f32,
    pub linear_damping: f32,
    pub unoccupied_damping: f32,
    /// Constant downward force on an empty craft, N.
    pub settle_force: f32,
    pub enter_radius: f32,
    pub exit_offset: f32,
    /// Driver seat first, then passengers.
    pub seats: Vec<[f32; 3]>,
    pub wreck_seconds: f32,
    pub respawn_seconds: f32,
    /// Random tumble angular speed added on destruction, rad/s.
    pub tumble_speed: f32,
    // Cosmetic attitude (radians at reference magnitudes).
    pub pitch_per_speed: f32,
    pub pitch_per_input: f32,
    pub pitch_per_climb: f32,
    pub roll_per_yaw: f32,
    pub roll_per_drift: f32,
    pub attitude_attack: f32,
    pub attitude_release: f32,
    pub max_pitch: f32,
    pub max_roll: f32,
    pub half_extents: [f32; 3],
}

impl Default for RotaryTunables {
    fn default() -> Self {
        Self {
            mass: 3200.0,
            max_hp: 6000,
            accel: 22.0,
            max_speed: 42.0,
            overspeed_gain: 2.0,
            turn_speed: 1.6,
            yaw_response: 6.0,
            climb_accel: 14.0,
            min_altitude: 2.0,
            max_altitude: 120.0,
            skid_clearance: 1.6,
            linear_damping: 0.4,
            unoccupied_damping: 1.6,
            settle_force: 2400.0,
            enter_radius: 6.0,
            exit_offset: 3.5,
            seats: vec![
                [0.0, 1.1, 1.2],
                [-0.9, 1.0, -0.6],
                [0.9, 1.0, -0.6],
                [-0.9, 1.0, -1.6],
                [0.9, 1.0, -1.6],
            ],
            wreck_seconds: 10.0,
            respawn_seconds: 8.0,
            tumble_speed: 3.0,
            pitch_per_speed: 0.32,
            pitch_per_input: 0.10,
            pitch_per_climb: 0.012,
            roll_per_yaw: 0.45,
            roll_per_drift: 0.015,
            attitude_attack: 6.0,
            attitude_release: 2.0,
            max_pitch: 0.55,
            max_roll: 0.65,
            half_extents: [1.6, 1.2, 3.4],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SurfaceTunables {
    pub max_hp: i32,
    pub accel: f32,
    pub brake_accel: f32,
    pub max_speed: f32,
    /// Velocity-proportional drag, 1/s.
    pub drag: f32,
    pub unoccupied_drag: f32,
    pub turn_speed: f32,
    pub yaw_response: f32,
    /// No steering below this speed.
    pub min_steer_speed: f32,
    /// Speed at which the steer factor saturates.
    pub steer_ref_speed: f32,
    /// Buoyancy plane (absolute world Y of the hull).
    pub hull_y: f32,
    pub bob_amplitude: f32,
    pub bob_frequency: f32,
    /// Terrain above `water_level + shore_clearance` counts as beach.
    pub shore_clearance: f32,
    pub bounce_restitution: f32,
    pub bounce_damping: f32,
    /// Post-wall-bounce speed multiplier.
    pub wall_speed_scrub: f32,
    pub enter_radius: f32,
    pub exit_offset: f32,
    pub seats: Vec<[f32; 3]>,
    pub respawn_seconds: f32,
    pub half_extents: [f32; 3],
}

impl Default for SurfaceTunables {
    fn default() -> Self {
        Self {
            max_hp: 3000,
            accel: 9.0,
            brake_accel: 14.0,
            max_speed: 18.0,
            drag: 0.35,
            unoccupied_drag: 1.2,
            turn_speed: 1.2,
            yaw_response: 4.0,
            min_steer_speed: 0.5,
            steer_ref_speed: 8.0,
            hull_y: 0.3,
            bob_amplitude: 0.12,
            bob_frequency: 0.5,
            shore_clearance: 0.25,
            bounce_restitution: 0.45,
            bounce_damping: 0.85,
            wall_speed_scrub: 0.5,
            enter_radius: 5.0,
            exit_offset: 2.5,
            seats: vec![[0.0, 0.8, 0.9], [-0.8, 0.8, -0.7], [0.8, 0.8, -0.7]],
            respawn_seconds: 8.0,
            half_extents: [1.2, 0.8, 2.6],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnTunables {
    /// Radial step between probe rings, m.
    pub probe_step: f32,
    /// Points per ring.
    pub probe_ring: u32,
    pub max_probes: u32,
    /// Aircraft want land: height above water within [band_min, band_max].
    pub aircraft_band_min: f32,
    pub aircraft_band_max: f32,
    /// Surface craft want water at least this deep.
    pub surface_draft: f32,
    /// Disembark shore search: step and probe cap.
    pub shore_step: f32,
    pub shore_max_probes: u32,
}

impl Default for SpawnTunables {
    fn default() -> Self {
        Self {
            probe_step: 6.0,
            probe_ring: 8,
            max_probes: 48,
            aircraft_band_min: 0.5,
            aircraft_band_max: 30.0,
            surface_draft: 1.0,
            shore_step: 3.0,
            shore_max_probes: 24,
        }
    }
}

pub fn seat_offsets(seats: &[[f32; 3]]) -> Vec<Vec3> {
    seats.iter().map(|s| Vec3::from_array(*s)).collect()
}

fn data_root() -> PathBuf {
    let here = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let ws = here.join("../../data");
    if ws.is_dir() { ws } else { here.join("data") }
}

fn clamp(mut cfg: VehicleTunables) -> VehicleTunables {
    if cfg.world.substep_hz < 15.0 {
        log::warn!("vehicles config: substep_hz {} too low; clamping to 15", cfg.world.substep_hz);
        cfg.world.substep_hz = 15.0;
    }
    if cfg.rotary.mass < 1.0 {
        cfg.rotary.mass = 1.0;
    }
    if cfg.rotary.max_hp < 1 {
        cfg.rotary.max_hp = 1;
    }
    if cfg.surface.max_hp < 1 {
        cfg.surface.max_hp = 1;
    }
    if cfg.rotary.seats.is_empty() {
        cfg.rotary.seats = RotaryTunables::default().seats;
    }
    if cfg.surface.seats.is_empty() {
        cfg.surface.seats = SurfaceTunables::default().seats;
    }
    cfg.surface.wall_speed_scrub = cfg.surface.wall_speed_scrub.clamp(0.0, 1.0);
    cfg.surface.bounce_restitution = cfg.surface.bounce_restitution.clamp(0.0, 1.0);
    cfg.surface.bounce_damping = cfg.surface.bounce_damping.clamp(0.0, 1.0);
    if cfg.spawn.max_probes == 0 {
        cfg.spawn.max_probes = 1;
    }
    cfg
}

/// Load the vehicle config from the default location, falling back to defaults.
pub fn load_default() -> Result<VehicleTunables> {
    let path = data_root().join("config/vehicles.toml");
    if !path.is_file() {
        return Ok(VehicleTunables::default());
    }
    let txt = std::fs::read_to_string(&path)
        .with_context(|| format!("read {}", path.display()))?;
    let parsed: VehicleTunables = toml::from_str(&txt).context("parse TOML")?;
    Ok(clamp(parsed))
}
