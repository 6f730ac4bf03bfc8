//! Vehicle roster: spawn placement, the per-tick update order, enter/exit
//! routing, and the occupancy/hit-test queries other systems consume.
//!
//! Ordering guarantee: `update` fully resolves every vehicle (intent ->
//! solver -> safety nets -> lifecycle -> seat followers) before returning,
//! so same-tick consumers always read post-update state.

use glam::{Quat, Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use terrain_query::{MapBounds, TerrainQuery};

use crate::events::VehicleEvent;
use crate::input::DriveInput;
use crate::occupant::{OccupantId, OccupantRegistry};
use crate::rotary;
use crate::solver::SolverWorld;
use crate::surface;
use crate::types::{DamageOutcome, Team, VehicleId, VehicleKind};
use crate::vehicle::{HitShape, Vehicle};
use data_runtime::configs::vehicles::VehicleTunables;

pub struct VehicleDirectory {
    vehicles: Vec<Vehicle>,
    next_id: u32,
    cfg: VehicleTunables,
    bounds: MapBounds,
    rng: SmallRng,
    events: Vec<VehicleEvent>,
    tick: u64,
}

impl VehicleDirectory {
    pub fn new(cfg: &VehicleTunables, seed: u64) -> Self {
        let bounds = MapBounds::new(cfg.world.map_half_x, cfg.world.map_half_z);
        Self {
            vehicles: Vec::new(),
            next_id: 0,
            cfg: cfg.clone(),
            bounds,
            rng: SmallRng::seed_from_u64(seed),
            events: Vec::new(),
            tick: 0,
        }
    }

    fn alloc_id(&mut self) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    // ---- spawn placement ------------------------------------------------

    /// Probe ring/fan points outward from the anchor until the kind's
    /// terrain band holds; bounded, then fall back to the anchor itself.
    fn probe_spawn_xz(&self, kind: VehicleKind, anchor: Vec3, terrain: &dyn TerrainQuery) -> Vec2 {
        let s = &self.cfg.spawn;
        let base = Vec2::new(anchor.x, anchor.z);
        let mut probes = 0u32;
        let mut ring = 0u32;
        loop {
            let points: u32 = if ring == 0 { 1 } else { s.probe_ring.max(1) };
            for i in 0..points {
                if probes >= s.max_probes {
                    log::warn!(
                        "spawn probe budget exhausted for {kind:?} near {base:?}; using anchor"
                    );
                    return base;
                }
                probes += 1;
                let angle = i as f32 / points as f32 * std::f32::consts::TAU;
                let r = ring as f32 * s.probe_step;
                let p = base + Vec2::new(angle.cos(), angle.sin()) * r;
                let p3 = self.bounds.clamp_xz(Vec3::new(p.x, 0.0, p.y));
                if self.band_ok(kind, p3.x, p3.z, terrain) {
                    return Vec2::new(p3.x, p3.z);
                }
            }
            ring += 1;
        }
    }

    fn band_ok(&self, kind: VehicleKind, x: f32, z: f32, terrain: &dyn TerrainQuery) -> bool {
        let s = &self.cfg.spawn;
        let water = self.cfg.world.water_level;
        let h = terrain.height_at(x, z);
        match kind {
            VehicleKind::Rotary => {
                let above = h - water;
                above >= s.aircraft_band_min && above <= s.aircraft_band_max
            }
            VehicleKind::Surface => h <= water - s.surface_draft,
        }
    }

    pub fn spawn_rotary(
        &mut self,
        team: Team,
        anchor: Vec3,
        yaw: f32,
        solver: &mut SolverWorld,
        terrain: &dyn TerrainQuery,
    ) -> VehicleId {
        let xz = self.probe_spawn_xz(VehicleKind::Rotary, anchor, terrain);
        let id = self.alloc_id();
        let tun = &self.cfg.rotary;
        let ground = terrain.height_at(xz.x, xz.y);
        let pos = Vec3::new(xz.x, (ground + tun.skid_clearance).max(tun.min_altitude), xz.y);
        let v = Vehicle::new_rotary(id, team, pos, yaw, &self.cfg.world, tun, solver);
        log::info!("spawned rotary {id:?} for {team:?} at {pos:?}");
        self.vehicles.push(v);
        id
    }

    pub fn spawn_surface(&mut self, team: Team, anchor: Vec3, yaw: f32, terrain: &dyn TerrainQuery) -> VehicleId {
        let xz = self.probe_spawn_xz(VehicleKind::Surface, anchor, terrain);
        let id = self.alloc_id();
        let tun = &self.cfg.surface;
        let pos = Vec3::new(xz.x, tun.hull_y, xz.y);
        let v = Vehicle::new_surface(id, team, pos, yaw, &self.cfg.world, tun);
        log::info!("spawned surface craft {id:?} for {team:?} at {pos:?}");
        self.vehicles.push(v);
        id
    }

    // ---- tick -----------------------------------------------------------

    pub fn update(
        &mut self,
        dt: f32,
        solver: &mut SolverWorld,
        terrain: &dyn TerrainQuery,
        occs: &mut OccupantRegistry,
    ) {
        self.tick += 1;
        for v in &mut self.vehicles {
            rotary::drive(v, dt, solver);
        }
        solver.step(dt);
        let bounds = self.bounds;
        for v in &mut self.vehicles {
            match v.kind {
                VehicleKind::Rotary => rotary::resolve(v, dt, solver, terrain, bounds),
                VehicleKind::Surface => surface::update(v, dt, terrain, bounds),
            }
            v.tick_lifecycle(dt, solver);
        }
        // Seat followers: registry positions (and disabled bodies) of seated
        // occupants track the full-attitude seat transform, post-resolve.
        let tick = self.tick;
        for v in &self.vehicles {
            let seated: Vec<(usize, OccupantId)> = v
                .driver
                .iter()
                .map(|d| (0usize, *d))
                .chain(v.passengers.iter().enumerate().map(|(i, p)| (i + 1, *p)))
                .collect();
            for (seat, id) in seated {
                let Some(p) = v.seat_world(seat, tick) else {
                    continue;
                };
                if let Some(o) = occs.get_mut(id) {
                    o.pos = p;
                    if let Some(b) = o.body {
                        solver.set_translation(b, p);
                    }
                }
            }
        }
    }

    // ---- damage / control routing ---------------------------------------

    pub fn apply_damage(
        &mut self,
        id: VehicleId,
        amount: i32,
        src_team: Team,
        occs: &mut OccupantRegistry,
        solver: &mut SolverWorld,
    ) -> DamageOutcome {
        let Some(v) = self.vehicles.iter_mut().find(|v| v.id == id) else {
            return DamageOutcome::default();
        };
        v.take_damage(amount, src_team, occs, solver, &mut self.rng, &mut self.events)
    }

    /// Routed only when the occupant holds the driver seat.
    pub fn apply_input(&mut self, occ: OccupantId, input: DriveInput) {
        if let Some(v) = self.vehicles.iter_mut().find(|v| v.driver == Some(occ)) {
            v.input = input.clamped();
        }
    }

    // ---- enter / exit ---------------------------------------------------

    /// Nearest vehicle the occupant may enter (squared-distance comparison),
    /// or none. Seats on success.
    pub fn try_enter(
        &mut self,
        occ: OccupantId,
        occs: &mut OccupantRegistry,
        solver: &mut SolverWorld,
    ) -> Option<VehicleId> {
        let candidate = occs.get(occ)?;
        let mut best: Option<(f32, usize)> = None;
        for (i, v) in self.vehicles.iter().enumerate() {
            if !v.can_enter(candidate) {
                continue;
            }
            let d2 = v.pos.distance_squared(candidate.pos);
            if best.map(|(b, _)| d2 < b).unwrap_or(true) {
                best = Some((d2, i));
            }
        }
        let (_, i) = best?;
        let v = &mut self.vehicles[i];
        v.enter(occ, occs, solver).then_some(v.id)
    }

    /// Exit the occupant's vehicle. Surface craft additionally walk the exit
    /// point outward to the nearest shore so nobody is dropped in open water.
    pub fn exit(
        &mut self,
        occ: OccupantId,
        occs: &mut OccupantRegistry,
        solver: &mut SolverWorld,
        terrain: &dyn TerrainQuery,
    ) -> Option<Vec3> {
        let v = self.vehicles.iter_mut().find(|v| v.seat_of(occ).is_some())?;
        let kind = v.kind;
        let raw = v.exit(occ, occs, solver)?;
        if kind != VehicleKind::Surface {
            return Some(raw);
        }
        let s = &self.cfg.spawn;
        let water = self.cfg.world.water_level;
        let base = Vec2::new(raw.x, raw.z);
        let mut probes = 0u32;
        let mut ring = 1u32;
        let shore = 'search: loop {
            for i in 0..s.probe_ring.max(1) {
                if probes >= s.shore_max_probes {
                    break 'search None;
                }
                probes += 1;
                let angle = i as f32 / s.probe_ring.max(1) as f32 * std::f32::consts::TAU;
                let p = base + Vec2::new(angle.cos(), angle.sin()) * (ring as f32 * s.shore_step);
                let h = terrain.height_at(p.x, p.y);
                if h > water {
                    break 'search Some(Vec3::new(p.x, h, p.y));
                }
            }
            ring += 1;
        };
        let placed = shore.unwrap_or(raw);
        if let Some(o) = occs.get_mut(occ) {
            o.pos = placed;
            if let Some(b) = o.body {
                solver.set_translation(b, placed);
            }
        }
        Some(placed)
    }

    // ---- exposure -------------------------------------------------------

    #[inline]
    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    pub fn respawn(&mut self, id: VehicleId, solver: &mut SolverWorld) {
        if let Some(v) = self.vehicles.iter_mut().find(|v| v.id == id) {
            v.respawn(solver);
        }
    }

    /// Geometry for the hit-scan collaborator: alive vehicles plus wrecks
    /// still physically present mid-crash.
    pub fn hit_shapes(&self) -> Vec<HitShape> {
        self.vehicles.iter().filter_map(|v| v.hit_shape()).collect()
    }

    /// Team-filtered nearest vehicle with a free seat, for AI entry.
    pub fn nearest_enterable_for_ai(&self, team: Team, pos: Vec3) -> Option<VehicleId> {
        let mut best: Option<(f32, VehicleId)> = None;
        for v in &self.vehicles {
            if !v.alive || v.team != team {
                continue;
            }
            if v.occupant_count() >= v.seat_capacity() {
                continue;
            }
            let d2 = v.pos.distance_squared(pos);
            if best.map(|(b, _)| d2 < b).unwrap_or(true) {
                best = Some((d2, v.id));
            }
        }
        best.map(|(_, id)| id)
    }

    /// World seat pose under the full attitude (AI body placement).
    pub fn seat_world(&self, id: VehicleId, seat: usize) -> Option<Vec3> {
        self.get(id)?.seat_world(seat, self.tick)
    }

    /// Seat position plus the vehicle attitude, for consumers that orient a
    /// body or camera at the seat.
    pub fn seat_pose(&self, id: VehicleId, seat: usize) -> Option<(Vec3, Quat)> {
        let v = self.get(id)?;
        Some((v.seat_world(seat, self.tick)?, v.attitude(self.tick)))
    }

    /// Yaw-only seat pose for the player camera.
    pub fn seat_world_stable(&self, id: VehicleId, seat: usize) -> Option<Vec3> {
        self.get(id)?.seat_world_stable(seat)
    }

    pub fn drain_events(&mut self) -> Vec<VehicleEvent> {
        std::mem::take(&mut self.events)
    }

    #[inline]
    pub fn bounds(&self) -> MapBounds {
        self.bounds
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrain_query::FlatTerrain;

    fn setup() -> (VehicleDirectory, SolverWorld, OccupantRegistry) {
        let cfg = VehicleTunables::default();
        let solver = SolverWorld::new(cfg.world.gravity, cfg.world.substep_hz);
        (VehicleDirectory::new(&cfg, 7), solver, OccupantRegistry::default())
    }

    #[test]
    fn nearest_enterable_skips_full_and_hostile() {
        let (mut dir, mut solver, mut occs) = setup();
        let land = FlatTerrain(2.0);
        let near = dir.spawn_rotary(Team::Red, Vec3::new(10.0, 0.0, 0.0), 0.0, &mut solver, &land);
        let far = dir.spawn_rotary(Team::Red, Vec3::new(60.0, 0.0, 0.0), 0.0, &mut solver, &land);
        let _foe = dir.spawn_rotary(Team::Blue, Vec3::new(5.0, 0.0, 0.0), 0.0, &mut solver, &land);

        let from = Vec3::ZERO;
        assert_eq!(dir.nearest_enterable_for_ai(Team::Red, from), Some(near));

        // Fill the near one completely; query should fall through to `far`.
        let cap = dir.get(near).expect("vehicle").seat_capacity();
        let near_pos = dir.get(near).expect("vehicle").pos;
        for _ in 0..cap {
            let o = occs.add(Team::Red, near_pos, 100);
            assert_eq!(dir.try_enter(o, &mut occs, &mut solver), Some(near));
        }
        assert_eq!(dir.nearest_enterable_for_ai(Team::Red, from), Some(far));
    }

    #[test]
    fn input_routes_to_driver_only() {
        let (mut dir, mut solver, mut occs) = setup();
        let land = FlatTerrain(2.0);
        let id = dir.spawn_rotary(Team::Red, Vec3::ZERO, 0.0, &mut solver, &land);
        let pos = dir.get(id).expect("vehicle").pos;
        let driver = occs.add(Team::Red, pos, 100);
        let pax = occs.add(Team::Red, pos, 100);
        assert_eq!(dir.try_enter(driver, &mut occs, &mut solver), Some(id));
        assert_eq!(dir.try_enter(pax, &mut occs, &mut solver), Some(id));

        let input = DriveInput { thrust: 1.0, ..Default::default() };
        dir.apply_input(pax, input);
        assert_eq!(dir.get(id).expect("vehicle").input, DriveInput::default());
        dir.apply_input(driver, input);
        assert_eq!(dir.get(id).expect("vehicle").input, input);
    }

    #[test]
    fn probe_falls_back_to_anchor_when_no_band_matches() {
        let cfg = VehicleTunables::default();
        let mut solver = SolverWorld::new(cfg.world.gravity, cfg.world.substep_hz);
        let mut dir = VehicleDirectory::new(&cfg, 1);
        // All water: no land band for an aircraft anywhere.
        let sea = FlatTerrain(-10.0);
        let anchor = Vec3::new(12.0, 0.0, -7.0);
        let id = dir.spawn_rotary(Team::Red, anchor, 0.0, &mut solver, &sea);
        let v = dir.get(id).expect("vehicle");
        assert!((v.pos.x - anchor.x).abs() < 1e-4);
        assert!((v.pos.z - anchor.z).abs() < 1e-4);
    }
}
