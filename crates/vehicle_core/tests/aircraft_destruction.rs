use glam::Vec3;
use terrain_query::FlatTerrain;
use vehicle_core::{
    ControllerCache, OccupantRegistry, Phase, SolverWorld, Team, VehicleDirectory, VehicleEvent,
};
use data_runtime::configs::vehicles::VehicleTunables;

#[test]
fn split_damage_destroys_exactly_once_and_kills_occupants() {
    let cfg = VehicleTunables::default();
    let mut solver = SolverWorld::new(cfg.world.gravity, cfg.world.substep_hz);
    let mut dir = VehicleDirectory::new(&cfg, 99);
    let mut occs = OccupantRegistry::default();
    let land = FlatTerrain(2.0);
    let id = dir.spawn_rotary(Team::Red, Vec3::ZERO, 0.0, &mut solver, &land);
    let pos = dir.get(id).expect("vehicle").pos;

    let pilot = occs.add_with_body(Team::Red, pos, 100, &mut solver);
    if let Some(o) = occs.get_mut(pilot) {
        o.controller = Some(ControllerCache::default());
    }
    let pax = occs.add_with_body(Team::Red, pos, 100, &mut solver);
    assert_eq!(dir.try_enter(pilot, &mut occs, &mut solver), Some(id));
    assert_eq!(dir.try_enter(pax, &mut occs, &mut solver), Some(id));
    assert_eq!(
        occs.get(pilot).expect("occ").controller,
        Some(ControllerCache { driving: Some(id) })
    );

    // 6000 cumulative damage in an arbitrary split.
    for amount in [900, 2100, 1500, 1499, 1] {
        dir.apply_damage(id, amount, Team::Blue, &mut occs, &mut solver);
    }

    let v = dir.get(id).expect("vehicle");
    assert_eq!(v.hp, 0);
    assert!(!v.alive);
    assert_eq!(v.phase, Phase::Crashing, "representation switched to crash mode");
    assert_eq!(v.occupant_count(), 0);

    // Free tumble: rotations unlocked and a random angular velocity applied.
    let body = v.body.expect("rotary body");
    assert!(solver.angvel(body).length() > 0.1);

    // Occupants ejected with lethal damage, references and caches cleared,
    // collision response restored.
    for o in [pilot, pax] {
        let occ = occs.get(o).expect("occ");
        assert!(!occ.alive);
        assert_eq!(occ.vehicle, None);
        assert!(occ.collision_response);
    }
    assert_eq!(
        occs.get(pilot).expect("occ").controller,
        Some(ControllerCache { driving: None })
    );

    let events = dir.drain_events();
    let destroyed: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, VehicleEvent::Destroyed { .. }))
        .collect();
    assert_eq!(destroyed.len(), 1, "destroy fires exactly once");
    assert!(matches!(
        destroyed[0],
        VehicleEvent::Destroyed {
            destroyer_team: Team::Blue,
            vehicle_team: Team::Red,
            ..
        }
    ));
    let kills = events
        .iter()
        .filter(|e| matches!(e, VehicleEvent::OccupantKilled { .. }))
        .count();
    assert_eq!(kills, 2);
}

#[test]
fn wreck_is_still_hit_testable_while_crashing() {
    let cfg = VehicleTunables::default();
    let mut solver = SolverWorld::new(cfg.world.gravity, cfg.world.substep_hz);
    let mut dir = VehicleDirectory::new(&cfg, 99);
    let mut occs = OccupantRegistry::default();
    let land = FlatTerrain(2.0);
    let id = dir.spawn_rotary(Team::Red, Vec3::ZERO, 0.0, &mut solver, &land);

    assert_eq!(dir.hit_shapes().len(), 1);
    dir.apply_damage(id, 6000, Team::Blue, &mut occs, &mut solver);
    assert_eq!(dir.get(id).expect("vehicle").phase, Phase::Crashing);
    assert_eq!(dir.hit_shapes().len(), 1, "mid-crash wreck stays hit-testable");
}
