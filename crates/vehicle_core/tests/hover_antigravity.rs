use glam::Vec3;
use terrain_query::FlatTerrain;
use vehicle_core::{OccupantRegistry, SolverWorld, Team, VehicleDirectory};
use data_runtime::configs::vehicles::VehicleTunables;

// Anti-gravity correctness: a piloted craft with zero input, simulated one
// second at 60 sub-steps/s, must hold altitude. The lift hook fires once per
// solver sub-step; applying it per render tick instead would let gravity
// accumulate visibly within this window.
#[test]
fn zero_input_hover_holds_altitude() {
    let cfg = VehicleTunables::default();
    let mut solver = SolverWorld::new(cfg.world.gravity, cfg.world.substep_hz);
    let mut dir = VehicleDirectory::new(&cfg, 42);
    let mut occs = OccupantRegistry::default();
    let land = FlatTerrain(20.0);
    let id = dir.spawn_rotary(Team::Red, Vec3::ZERO, 0.0, &mut solver, &land);
    let start = dir.get(id).expect("vehicle").pos;
    assert!(start.y > cfg.rotary.min_altitude, "hovering above the safety floor");

    let pilot = occs.add(Team::Red, start, 100);
    assert_eq!(dir.try_enter(pilot, &mut occs, &mut solver), Some(id));

    for _ in 0..60 {
        dir.update(1.0 / 60.0, &mut solver, &land, &mut occs);
    }

    let v = dir.get(id).expect("vehicle");
    assert!(
        (v.pos.y - start.y).abs() < 0.05,
        "altitude drifted from {} to {}",
        start.y,
        v.pos.y
    );
    let drift = v.pos - start;
    assert!(drift.x.abs() < 0.05 && drift.z.abs() < 0.05, "no lateral drift either");
}

#[test]
fn empty_craft_settles_instead_of_hovering() {
    let cfg = VehicleTunables::default();
    let mut solver = SolverWorld::new(cfg.world.gravity, cfg.world.substep_hz);
    let mut dir = VehicleDirectory::new(&cfg, 42);
    let mut occs = OccupantRegistry::default();
    let land = FlatTerrain(0.0);
    let id = dir.spawn_rotary(Team::Red, Vec3::ZERO, 0.0, &mut solver, &land);

    // Lift it well above the floor, then leave it unoccupied.
    let body = dir.get(id).expect("vehicle").body.expect("rotary body");
    solver.set_translation(body, Vec3::new(0.0, 40.0, 0.0));

    for _ in 0..300 {
        dir.update(1.0 / 60.0, &mut solver, &land, &mut occs);
    }
    let v = dir.get(id).expect("vehicle");
    assert!(v.pos.y < 40.0 - 1.0, "settle force should pull an empty craft down");
    let floor = (0.0f32 + cfg.rotary.skid_clearance).max(cfg.rotary.min_altitude);
    assert!(v.pos.y >= floor - 1e-3, "but never through the safety floor");
}
