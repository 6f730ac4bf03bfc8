//! Shared vehicle state and lifecycle: damage/destroy/respawn, seat
//! negotiation, and per-tick cached seat transforms.
//!
//! Both sides of the occupant<->vehicle back-reference are written at exactly
//! two call sites: `enter`/`exit`, and the eject loop inside the destroy path.

use std::cell::Cell;

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use rand::rngs::SmallRng;
use rapier3d::prelude::RigidBodyHandle;

use crate::events::VehicleEvent;
use crate::input::DriveInput;
use crate::math::right_xz;
use crate::occupant::{ControllerCache, Occupant, OccupantId, OccupantRegistry};
use crate::rotary::{self, RotaryModel};
use crate::solver::SolverWorld;
use crate::surface::SurfaceModel;
use crate::types::{DamageOutcome, Phase, Team, VehicleId, VehicleKind};
use data_runtime::configs::vehicles::{RotaryTunables, SurfaceTunables, WorldTunables, seat_offsets};

pub enum Model {
    Rotary(RotaryModel),
    Surface(SurfaceModel),
}

/// Fixed local seat offsets plus entry/exit geometry. Slot 0 is the driver.
pub struct SeatPlan {
    pub seats: Vec<Vec3>,
    pub enter_radius: f32,
    pub exit_offset: f32,
}

/// Oriented box exposed to the hit-scan collaborator.
#[derive(Copy, Clone, Debug)]
pub struct HitShape {
    pub vehicle: VehicleId,
    pub team: Team,
    pub pos: Vec3,
    pub yaw: f32,
    pub half_extents: Vec3,
}

pub struct Vehicle {
    pub id: VehicleId,
    pub team: Team,
    pub kind: VehicleKind,
    pub hp: i32,
    pub max_hp: i32,
    pub alive: bool,
    pub anchor_pos: Vec3,
    pub anchor_yaw: f32,
    pub phase: Phase,
    /// Remaining seconds in the current non-Active phase.
    pub phase_timer: f32,
    pub driver: Option<OccupantId>,
    pub passengers: Vec<OccupantId>,
    pub input: DriveInput,
    /// Non-owning handle; the body is never removed from the solver.
    pub body: Option<RigidBodyHandle>,
    pub pos: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub half_extents: Vec3,
    pub seat_plan: SeatPlan,
    pub wreck_seconds: f32,
    pub respawn_seconds: f32,
    pub model: Model,
    attitude_cache: Cell<Option<(u64, Quat)>>,
}

impl Vehicle {
    pub fn new_rotary(
        id: VehicleId,
        team: Team,
        anchor_pos: Vec3,
        anchor_yaw: f32,
        world: &WorldTunables,
        tun: &RotaryTunables,
        solver: &mut SolverWorld,
    ) -> Self {
        let half = Vec3::from_array(tun.half_extents);
        let body = solver.add_dynamic_cuboid(anchor_pos, anchor_yaw, half, tun.mass);
        solver.apply_profile(body, &rotary::profile(Phase::Active, false, tun));
        Self {
            id,
            team,
            kind: VehicleKind::Rotary,
            hp: tun.max_hp,
            max_hp: tun.max_hp,
            alive: true,
            anchor_pos,
            anchor_yaw,
            phase: Phase::Active,
            phase_timer: 0.0,
            driver: None,
            passengers: Vec::new(),
            input: DriveInput::default(),
            body: Some(body),
            pos: anchor_pos,
            yaw: anchor_yaw,
            pitch: 0.0,
            roll: 0.0,
            half_extents: half,
            seat_plan: SeatPlan {
                seats: seat_offsets(&tun.seats),
                enter_radius: tun.enter_radius,
                exit_offset: tun.exit_offset,
            },
            wreck_seconds: tun.wreck_seconds,
            respawn_seconds: tun.respawn_seconds,
            model: Model::Rotary(RotaryModel::new(tun, world)),
            attitude_cache: Cell::new(None),
        }
    }

    pub fn new_surface(
        id: VehicleId,
        team: Team,
        anchor_pos: Vec3,
        anchor_yaw: f32,
        world: &WorldTunables,
        tun: &SurfaceTunables,
    ) -> Self {
        Self {
            id,
            team,
            kind: VehicleKind::Surface,
            hp: tun.max_hp,
            max_hp: tun.max_hp,
            alive: true,
            anchor_pos,
            anchor_yaw,
            phase: Phase::Active,
            phase_timer: 0.0,
            driver: None,
            passengers: Vec::new(),
            input: DriveInput::default(),
            body: None,
            pos: anchor_pos,
            yaw: anchor_yaw,
            pitch: 0.0,
            roll: 0.0,
            half_extents: Vec3::from_array(tun.half_extents),
            seat_plan: SeatPlan {
                seats: seat_offsets(&tun.seats),
                enter_radius: tun.enter_radius,
                exit_offset: tun.exit_offset,
            },
            wreck_seconds: 0.0,
            respawn_seconds: tun.respawn_seconds,
            model: Model::Surface(SurfaceModel::new(tun, world)),
            attitude_cache: Cell::new(None),
        }
    }

    // ---- occupancy ------------------------------------------------------

    #[inline]
    pub fn seat_capacity(&self) -> usize {
        self.seat_plan.seats.len()
    }

    #[inline]
    pub fn occupant_count(&self) -> usize {
        self.driver.is_some() as usize + self.passengers.len()
    }

    /// Seat slot of an occupant: 0 for the driver, 1.. for passengers.
    pub fn seat_of(&self, occ: OccupantId) -> Option<usize> {
        if self.driver == Some(occ) {
            return Some(0);
        }
        self.passengers.iter().position(|p| *p == occ).map(|i| i + 1)
    }

    /// Entry gate: alive, same team, free seat, and squared distance strictly
    /// under `enter_radius^2` (exclusive boundary, no square root).
    pub fn can_enter(&self, occ: &Occupant) -> bool {
        if !self.alive || !occ.alive || occ.vehicle.is_some() {
            return false;
        }
        if occ.team != self.team {
            return false;
        }
        if self.occupant_count() >= self.seat_capacity() {
            return false;
        }
        let r = self.seat_plan.enter_radius;
        occ.pos.distance_squared(self.pos) < r * r
    }

    /// Driver-first seat assignment. Disables the occupant's collision
    /// response and sets both back-references.
    pub fn enter(&mut self, id: OccupantId, occs: &mut OccupantRegistry, solver: &mut SolverWorld) -> bool {
        let Some(occ) = occs.get(id) else {
            return false;
        };
        if !self.can_enter(occ) {
            return false;
        }
        let driver_seat = self.driver.is_none();
        if driver_seat {
            self.driver = Some(id);
        } else {
            self.passengers.push(id);
        }
        occs.set_collision_response(id, false, solver);
        if let Some(o) = occs.get_mut(id) {
            o.vehicle = Some(self.id);
            if driver_seat && let Some(c) = o.controller.as_mut() {
                c.driving = Some(self.id);
            }
        }
        true
    }

    /// Remove the occupant and return a laterally offset exit position.
    /// If the driver leaves and passengers remain, the first passenger (in
    /// insertion order) is promoted to driver and held input is cleared.
    pub fn exit(&mut self, id: OccupantId, occs: &mut OccupantRegistry, solver: &mut SolverWorld) -> Option<Vec3> {
        let was_driver = self.driver == Some(id);
        if was_driver {
            self.driver = None;
            self.input = DriveInput::default();
            if !self.passengers.is_empty() {
                let promoted = self.passengers.remove(0);
                self.driver = Some(promoted);
                if let Some(o) = occs.get_mut(promoted)
                    && let Some(c) = o.controller.as_mut()
                {
                    c.driving = Some(self.id);
                }
            }
        } else {
            let before = self.passengers.len();
            self.passengers.retain(|p| *p != id);
            if self.passengers.len() == before {
                return None;
            }
        }
        let exit_pos = self.pos + right_xz(self.yaw) * self.seat_plan.exit_offset;
        occs.set_collision_response(id, true, solver);
        if let Some(o) = occs.get_mut(id) {
            o.vehicle = None;
            o.pos = exit_pos;
            if let Some(c) = o.controller.as_mut() {
                c.driving = None;
            }
            if let Some(b) = o.body {
                solver.set_translation(b, exit_pos);
            }
        }
        Some(exit_pos)
    }

    // ---- damage / destruction / respawn ---------------------------------

    /// No-op when already destroyed. Clamps hp at 0 and runs the destroy
    /// path exactly once, on the crossing edge.
    pub fn take_damage(
        &mut self,
        amount: i32,
        src_team: Team,
        occs: &mut OccupantRegistry,
        solver: &mut SolverWorld,
        rng: &mut SmallRng,
        events: &mut Vec<VehicleEvent>,
    ) -> DamageOutcome {
        if !self.alive || amount <= 0 {
            return DamageOutcome::default();
        }
        let applied = amount.min(self.hp);
        self.hp -= applied;
        if self.hp == 0 {
            self.destroy(src_team, occs, solver, rng, events);
            return DamageOutcome { destroyed: true, applied };
        }
        DamageOutcome { destroyed: false, applied }
    }

    /// Eject-and-kill every occupant, switch the physical representation to
    /// its crash mode, and emit the scorekeeping events.
    pub fn destroy(
        &mut self,
        destroyer_team: Team,
        occs: &mut OccupantRegistry,
        solver: &mut SolverWorld,
        rng: &mut SmallRng,
        events: &mut Vec<VehicleEvent>,
    ) {
        self.alive = false;
        self.hp = 0;
        let seated: Vec<OccupantId> = self.driver.take().into_iter().chain(self.passengers.drain(..)).collect();
        for id in seated {
            // Restore the occupant's own collision response before ejection.
            occs.set_collision_response(id, true, solver);
            if let Some(o) = occs.get_mut(id) {
                o.vehicle = None;
                if let Some(c) = o.controller.as_mut() {
                    *c = ControllerCache::default();
                }
            }
            occs.kill(id);
            events.push(VehicleEvent::OccupantKilled {
                occupant: id,
                vehicle_team: self.team,
                destroyer_team,
            });
        }
        self.input = DriveInput::default();
        match &mut self.model {
            Model::Rotary(m) => {
                self.phase = Phase::Crashing;
                self.phase_timer = self.wreck_seconds;
                if let Some(b) = self.body {
                    solver.set_pre_step_force(b, None);
                    solver.apply_profile(b, &rotary::profile(Phase::Crashing, false, &m.tun));
                    // Random tumble on top of the impact angular velocity.
                    let tumble = Vec3::new(
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                    ) * m.tun.tumble_speed;
                    solver.set_angvel(b, solver.angvel(b) + tumble);
                }
                m.yaw_rate = 0.0;
                m.applied_occupancy = None;
            }
            Model::Surface(m) => {
                // No solver body to tumble: straight to hidden countdown.
                self.phase = Phase::AwaitingRespawn;
                self.phase_timer = self.respawn_seconds;
                m.reset_motion();
            }
        }
        log::info!(
            "vehicle {:?} ({:?}, {:?}) destroyed by {:?}",
            self.id,
            self.kind,
            self.team,
            destroyer_team
        );
        events.push(VehicleEvent::Destroyed {
            destroyer_team,
            vehicle_team: self.team,
            kind: self.kind,
        });
    }

    /// Restore full health and the scripted representation at the spawn
    /// anchor. Idempotent when repeated without intervening damage; safe from
    /// the internal countdown or an external call.
    pub fn respawn(&mut self, solver: &mut SolverWorld) {
        self.hp = self.max_hp;
        self.alive = true;
        self.phase = Phase::Active;
        self.phase_timer = 0.0;
        self.pos = self.anchor_pos;
        self.yaw = self.anchor_yaw;
        self.pitch = 0.0;
        self.roll = 0.0;
        self.input = DriveInput::default();
        self.attitude_cache.set(None);
        match &mut self.model {
            Model::Rotary(m) => {
                m.yaw_rate = 0.0;
                m.applied_occupancy = Some(false);
                if let Some(b) = self.body {
                    solver.apply_profile(b, &rotary::profile(Phase::Active, false, &m.tun));
                    solver.reset_forces(b);
                    solver.set_linvel(b, Vec3::ZERO);
                    solver.set_angvel(b, Vec3::ZERO);
                    solver.set_translation(b, self.anchor_pos);
                    solver.set_rotation(b, Quat::from_rotation_y(self.anchor_yaw));
                    solver.set_pre_step_force(b, Some(Vec3::Y * m.tun.mass * m.gravity));
                }
            }
            Model::Surface(m) => m.reset_motion(),
        }
        log::debug!("vehicle {:?} respawned at {:?}", self.id, self.anchor_pos);
    }

    /// Countdown logic for the non-Active phases. Runs inside the directory
    /// tick, after the solver has resolved.
    pub fn tick_lifecycle(&mut self, dt: f32, solver: &mut SolverWorld) {
        match self.phase {
            Phase::Active => {}
            Phase::Crashing => {
                // Mirror the tumbling wreck so hit-tests track it.
                if let Some(b) = self.body {
                    self.pos = solver.translation(b);
                    self.yaw = solver.rotation(b).to_euler(EulerRot::YXZ).0;
                }
                self.phase_timer -= dt;
                if self.phase_timer <= 0.0 {
                    self.phase = Phase::AwaitingRespawn;
                    self.phase_timer = self.respawn_seconds;
                    if let Some(b) = self.body
                        && let Model::Rotary(m) = &self.model
                    {
                        // Zero motion while the body is still dynamic; velocity
                        // writes are ignored once it is position-based kinematic.
                        solver.park(b);
                        solver.apply_profile(b, &rotary::profile(Phase::AwaitingRespawn, false, &m.tun));
                    }
                    log::debug!("vehicle {:?} wreck expired; hidden until respawn", self.id);
                }
            }
            Phase::AwaitingRespawn => {
                self.phase_timer -= dt;
                if self.phase_timer <= 0.0 {
                    self.respawn(solver);
                }
            }
        }
    }

    // ---- derived transforms ---------------------------------------------

    /// Full yaw+pitch+roll attitude, recomputed at most once per tick no
    /// matter how many occupants query seats.
    pub fn attitude(&self, tick: u64) -> Quat {
        if let Some((stamp, q)) = self.attitude_cache.get()
            && stamp == tick
        {
            return q;
        }
        let q = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll);
        self.attitude_cache.set(Some((tick, q)));
        q
    }

    /// World seat position under the full cosmetic attitude (AI bodies,
    /// passenger placement).
    pub fn seat_world(&self, seat: usize, tick: u64) -> Option<Vec3> {
        let local = *self.seat_plan.seats.get(seat)?;
        Some(self.pos + self.attitude(tick) * local)
    }

    /// Yaw-only seat transform for the player camera, immune to cosmetic
    /// pitch/roll sway.
    pub fn seat_world_stable(&self, seat: usize) -> Option<Vec3> {
        let local = *self.seat_plan.seats.get(seat)?;
        Some(self.pos + Quat::from_rotation_y(self.yaw) * local)
    }

    /// Hit-test geometry while alive or still physically present mid-crash.
    pub fn hit_shape(&self) -> Option<HitShape> {
        if !self.alive && self.phase != Phase::Crashing {
            return None;
        }
        Some(HitShape {
            vehicle: self.id,
            team: self.team,
            pos: self.pos,
            yaw: self.yaw,
            half_extents: self.half_extents,
        })
    }
}
