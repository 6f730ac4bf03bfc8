use glam::{Vec2, Vec3};
use terrain_query::{IslandTerrain, TerrainQuery};
use vehicle_core::{DriveInput, Model, OccupantRegistry, SolverWorld, Team, VehicleDirectory};
use data_runtime::configs::vehicles::VehicleTunables;

// Driving full throttle at the island must bounce off the beach, never park
// the boat on land and never hard-stop it.
#[test]
fn beach_contact_bounces_instead_of_stopping() {
    let cfg = VehicleTunables::default();
    let mut solver = SolverWorld::new(cfg.world.gravity, cfg.world.substep_hz);
    let mut dir = VehicleDirectory::new(&cfg, 8);
    let mut occs = OccupantRegistry::default();
    let island = IslandTerrain::new(Vec2::ZERO, 100.0, 12.0, -20.0);
    let water = cfg.world.water_level;

    let id = dir.spawn_surface(Team::Red, Vec3::new(0.0, 0.0, -80.0), 0.0, &island);
    let pos = dir.get(id).expect("vehicle").pos;
    let pilot = occs.add(Team::Red, pos, 100);
    assert_eq!(dir.try_enter(pilot, &mut occs, &mut solver), Some(id));
    dir.apply_input(pilot, DriveInput { thrust: 1.0, ..Default::default() });

    let mut bounced = false;
    let mut speed_at_bounce = 0.0f32;
    for _ in 0..600 {
        dir.update(1.0 / 60.0, &mut solver, &island, &mut occs);
        let v = dir.get(id).expect("vehicle");
        let ground = island.height_at(v.pos.x, v.pos.z);
        assert!(
            ground <= water + cfg.surface.shore_clearance + 1e-3,
            "boat ended on land at {:?} (ground {ground})",
            v.pos
        );
        let Model::Surface(m) = &v.model else {
            panic!("surface model");
        };
        if !bounced && m.vel.y < -0.1 {
            // Forward (+Z) velocity reflected: the beach pushed back.
            bounced = true;
            speed_at_bounce = m.vel.length();
        }
    }
    assert!(bounced, "the boat should have reached and bounced off the beach");
    assert!(
        speed_at_bounce > 0.3,
        "a bounce keeps some speed, not a hard stop ({speed_at_bounce})"
    );

    let v = dir.get(id).expect("vehicle");
    assert!(v.pos.z > -70.0, "the boat made progress toward the island");
}

// The hull stays pinned to the buoyancy plane with only the bob on top.
#[test]
fn hull_rides_the_buoyancy_plane() {
    let cfg = VehicleTunables::default();
    let mut solver = SolverWorld::new(cfg.world.gravity, cfg.world.substep_hz);
    let mut dir = VehicleDirectory::new(&cfg, 8);
    let mut occs = OccupantRegistry::default();
    let sea = terrain_query::FlatTerrain(-10.0);

    let id = dir.spawn_surface(Team::Red, Vec3::ZERO, 0.0, &sea);
    let mut min_y = f32::MAX;
    let mut max_y = f32::MIN;
    for _ in 0..240 {
        dir.update(1.0 / 60.0, &mut solver, &sea, &mut occs);
        let y = dir.get(id).expect("vehicle").pos.y;
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    let hull = cfg.surface.hull_y;
    let amp = cfg.surface.bob_amplitude;
    assert!(min_y >= hull - amp - 1e-3 && max_y <= hull + amp + 1e-3);
    assert!(max_y - min_y > amp, "the bob actually moves the hull");
}
