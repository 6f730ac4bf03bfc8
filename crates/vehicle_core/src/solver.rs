//! Thin bridge over the external rigid-body solver (rapier3d).
//!
//! Owns the pipeline and body/collider sets, runs fixed sub-steps, and keeps
//! two force ledgers:
//! - tick forces: accumulated by vehicles for exactly one render tick and
//!   cleared after the resolved pose is read;
//! - pre-step forces: steady per-body forces (anti-gravity compensation)
//!   applied once per solver sub-step, never once per render tick.
//!
//! Bodies are never removed. Detaching a body means zeroing its motion and
//! parking it off-map with its collider disabled, so the broad phase never
//! churns on respawn cycles.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use rapier3d::prelude::*;

/// Where detached bodies are parked, far below any playable terrain.
const PARK_Y: f32 = -10_000.0;
/// Bound on sub-steps per `step` call so a long frame cannot spiral.
const MAX_SUBSTEPS_PER_CALL: u32 = 32;

#[inline]
fn nvec(v: Vec3) -> Vector<f32> {
    vector![v.x, v.y, v.z]
}

#[inline]
fn gvec(v: &Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
fn nquat(q: Quat) -> Rotation<f32> {
    nalgebra::Unit::new_normalize(nalgebra::Quaternion::new(q.w, q.x, q.y, q.z))
}

#[inline]
fn gquat(r: &Rotation<f32>) -> Quat {
    Quat::from_xyzw(r.i, r.j, r.k, r.w)
}

/// Body configuration as a pure function of vehicle phase and occupancy,
/// applied atomically on every transition (no scattered flag toggling).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyProfile {
    pub body_type: RigidBodyType,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub rotations_locked: bool,
    pub collider_enabled: bool,
    pub gravity_scale: f32,
}

pub struct SolverWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<f32>,
    integration: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    query_pipeline: QueryPipeline,
    substep_dt: f32,
    accumulator: f32,
    tick_forces: HashMap<RigidBodyHandle, Vector<f32>>,
    pre_step_forces: HashMap<RigidBodyHandle, Vector<f32>>,
}

impl SolverWorld {
    /// `gravity` is the positive magnitude; the world gravity vector is -Y.
    pub fn new(gravity: f32, substep_hz: f32) -> Self {
        let substep_dt = 1.0 / substep_hz.max(1.0);
        let mut integration = IntegrationParameters::default();
        integration.dt = substep_dt;
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, -gravity, 0.0],
            integration,
            islands: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            substep_dt,
            accumulator: 0.0,
            tick_forces: HashMap::new(),
            pre_step_forces: HashMap::new(),
        }
    }

    /// Advance by `dt`, running whole fixed sub-steps. Returns how many ran.
    pub fn step(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);
        let mut steps = 0u32;
        while self.accumulator + 1e-6 >= self.substep_dt && steps < MAX_SUBSTEPS_PER_CALL {
            self.apply_accumulated_forces();
            self.pipeline.step(
                &self.gravity,
                &self.integration,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd,
                Some(&mut self.query_pipeline),
                &(),
                &(),
            );
            self.accumulator -= self.substep_dt;
            steps += 1;
        }
        steps
    }

    /// Rebuild each body's applied force from the ledgers so a pre-step hook
    /// acts exactly once per sub-step and tick forces never compound.
    fn apply_accumulated_forces(&mut self) {
        for (h, rb) in self.bodies.iter_mut() {
            rb.reset_forces(false);
            let mut f = Vector::zeros();
            let mut any = false;
            if let Some(t) = self.tick_forces.get(&h) {
                f += t;
                any = true;
            }
            if let Some(p) = self.pre_step_forces.get(&h) {
                f += p;
                any = true;
            }
            if any {
                rb.add_force(f, true);
            }
        }
    }

    // ---- body lifecycle -------------------------------------------------

    pub fn add_dynamic_cuboid(&mut self, pos: Vec3, yaw: f32, half: Vec3, mass: f32) -> RigidBodyHandle {
        let rb = RigidBodyBuilder::dynamic()
            .translation(nvec(pos))
            .rotation(vector![0.0, yaw, 0.0])
            .build();
        let h = self.bodies.insert(rb);
        let co = ColliderBuilder::cuboid(half.x, half.y, half.z)
            .mass(mass)
            .friction(0.6)
            .restitution(0.2)
            .build();
        self.colliders.insert_with_parent(co, h, &mut self.bodies);
        h
    }

    /// Occupant bodies are kinematic: seat followers author their transform
    /// while seated, and game logic walks them while on foot.
    pub fn add_occupant_capsule(&mut self, pos: Vec3) -> RigidBodyHandle {
        let rb = RigidBodyBuilder::kinematic_position_based()
            .translation(nvec(pos))
            .build();
        let h = self.bodies.insert(rb);
        let co = ColliderBuilder::capsule_y(0.5, 0.3).mass(80.0).build();
        self.colliders.insert_with_parent(co, h, &mut self.bodies);
        h
    }

    pub fn apply_profile(&mut self, h: RigidBodyHandle, p: &BodyProfile) {
        let collider_handles = if let Some(rb) = self.bodies.get_mut(h) {
            rb.set_body_type(p.body_type, true);
            rb.set_linear_damping(p.linear_damping);
            rb.set_angular_damping(p.angular_damping);
            rb.lock_rotations(p.rotations_locked, true);
            rb.set_gravity_scale(p.gravity_scale, true);
            rb.colliders().to_vec()
        } else {
            Vec::new()
        };
        for ch in collider_handles {
            if let Some(co) = self.colliders.get_mut(ch) {
                co.set_enabled(p.collider_enabled);
            }
        }
    }

    /// Zero motion and forces and park the body off-map. The body stays in
    /// the sets; pair with a hidden profile to also disable its collider.
    pub fn park(&mut self, h: RigidBodyHandle) {
        self.tick_forces.remove(&h);
        self.pre_step_forces.remove(&h);
        if let Some(rb) = self.bodies.get_mut(h) {
            rb.reset_forces(false);
            rb.reset_torques(false);
            rb.set_linvel(Vector::zeros(), false);
            rb.set_angvel(Vector::zeros(), false);
            rb.set_translation(vector![0.0, PARK_Y, 0.0], false);
        }
    }

    // ---- force ledgers --------------------------------------------------

    /// Accumulate a force on a body for the current tick.
    pub fn add_force(&mut self, h: RigidBodyHandle, f: Vec3) {
        *self.tick_forces.entry(h).or_insert_with(Vector::zeros) += nvec(f);
    }

    /// Clear the body's tick forces (call after reading the resolved pose).
    pub fn reset_forces(&mut self, h: RigidBodyHandle) {
        self.tick_forces.remove(&h);
        if let Some(rb) = self.bodies.get_mut(h) {
            rb.reset_forces(false);
            rb.reset_torques(false);
        }
    }

    /// Install or remove the steady per-sub-step force for a body.
    pub fn set_pre_step_force(&mut self, h: RigidBodyHandle, f: Option<Vec3>) {
        match f {
            Some(v) => {
                self.pre_step_forces.insert(h, nvec(v));
            }
            None => {
                self.pre_step_forces.remove(&h);
            }
        }
    }

    // ---- accessors ------------------------------------------------------

    pub fn translation(&self, h: RigidBodyHandle) -> Vec3 {
        self.bodies.get(h).map(|rb| gvec(rb.translation())).unwrap_or(Vec3::ZERO)
    }

    pub fn set_translation(&mut self, h: RigidBodyHandle, v: Vec3) {
        if let Some(rb) = self.bodies.get_mut(h) {
            rb.set_translation(nvec(v), true);
        }
    }

    pub fn rotation(&self, h: RigidBodyHandle) -> Quat {
        self.bodies.get(h).map(|rb| gquat(rb.rotation())).unwrap_or(Quat::IDENTITY)
    }

    pub fn set_rotation(&mut self, h: RigidBodyHandle, q: Quat) {
        if let Some(rb) = self.bodies.get_mut(h) {
            rb.set_rotation(nquat(q), true);
        }
    }

    pub fn linvel(&self, h: RigidBodyHandle) -> Vec3 {
        self.bodies.get(h).map(|rb| gvec(rb.linvel())).unwrap_or(Vec3::ZERO)
    }

    pub fn set_linvel(&mut self, h: RigidBodyHandle, v: Vec3) {
        if let Some(rb) = self.bodies.get_mut(h) {
            rb.set_linvel(nvec(v), true);
        }
    }

    pub fn angvel(&self, h: RigidBodyHandle) -> Vec3 {
        self.bodies.get(h).map(|rb| gvec(rb.angvel())).unwrap_or(Vec3::ZERO)
    }

    pub fn set_angvel(&mut self, h: RigidBodyHandle, v: Vec3) {
        if let Some(rb) = self.bodies.get_mut(h) {
            rb.set_angvel(nvec(v), true);
        }
    }

    pub fn mass(&self, h: RigidBodyHandle) -> f32 {
        self.bodies.get(h).map(|rb| rb.mass()).unwrap_or(0.0)
    }

    /// Collision-response toggle for a body's colliders (seat decoupling).
    pub fn set_collision_response(&mut self, h: RigidBodyHandle, on: bool) {
        let collider_handles = self
            .bodies
            .get(h)
            .map(|rb| rb.colliders().to_vec())
            .unwrap_or_default();
        for ch in collider_handles {
            if let Some(co) = self.colliders.get_mut(ch) {
                co.set_enabled(on);
            }
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_step_hook_cancels_gravity_exactly() {
        let mut w = SolverWorld::new(9.81, 60.0);
        let h = w.add_dynamic_cuboid(Vec3::new(0.0, 50.0, 0.0), 0.0, Vec3::splat(1.0), 3000.0);
        let lift = Vec3::Y * w.mass(h) * 9.81;
        w.set_pre_step_force(h, Some(lift));
        let steps = w.step(1.0);
        assert!(steps >= 30, "expected many sub-steps, got {steps}");
        assert!(w.linvel(h).y.abs() < 1e-3);
        assert!((w.translation(h).y - 50.0).abs() < 1e-2);
    }

    #[test]
    fn unhooked_body_falls() {
        let mut w = SolverWorld::new(9.81, 60.0);
        let h = w.add_dynamic_cuboid(Vec3::new(0.0, 50.0, 0.0), 0.0, Vec3::splat(1.0), 3000.0);
        w.step(0.5);
        assert!(w.linvel(h).y < -3.0);
    }

    #[test]
    fn tick_force_does_not_compound_across_substeps() {
        let mut w = SolverWorld::new(0.0, 60.0);
        let h = w.add_dynamic_cuboid(Vec3::ZERO, 0.0, Vec3::splat(1.0), 100.0);
        // a = F/m = 10 m/s^2 held for one second.
        w.add_force(h, Vec3::X * 1000.0);
        w.step(0.5);
        w.step(0.5);
        let vx = w.linvel(h).x;
        assert!((vx - 10.0).abs() < 0.5, "vx = {vx}");
        w.reset_forces(h);
        w.step(0.5);
        assert!((w.linvel(h).x - vx).abs() < 1e-3);
    }

    #[test]
    fn parked_body_stays_in_the_set() {
        let mut w = SolverWorld::new(9.81, 60.0);
        let h = w.add_dynamic_cuboid(Vec3::new(0.0, 10.0, 0.0), 0.0, Vec3::splat(1.0), 500.0);
        let n = w.body_count();
        w.apply_profile(
            h,
            &BodyProfile {
                body_type: RigidBodyType::KinematicPositionBased,
                linear_damping: 0.0,
                angular_damping: 0.0,
                rotations_locked: true,
                collider_enabled: false,
                gravity_scale: 0.0,
            },
        );
        w.park(h);
        w.step(0.25);
        assert_eq!(w.body_count(), n);
        assert!(w.translation(h).y < -1000.0);
        assert_eq!(w.linvel(h), Vec3::ZERO);
    }
}
