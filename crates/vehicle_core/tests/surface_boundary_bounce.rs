use glam::{Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;
use terrain_query::FlatTerrain;
use vehicle_core::{Model, OccupantRegistry, SolverWorld, Team, VehicleDirectory, math};
use data_runtime::configs::vehicles::VehicleTunables;

// Scenario: a craft at speed `s` heading straight into the +X wall. After
// the bounce the heading points back into the map and no more than 0.6 s of
// speed survives.
#[test]
fn wall_bounce_reflects_heading_and_scrubs_speed() {
    let cfg = VehicleTunables::default();
    let mut solver = SolverWorld::new(cfg.world.gravity, cfg.world.substep_hz);
    let mut dir = VehicleDirectory::new(&cfg, 21);
    let mut occs = OccupantRegistry::default();
    let sea = FlatTerrain(-5.0);

    let half_x = cfg.world.map_half_x;
    let anchor = Vec3::new(half_x - 3.0, 0.0, 0.0);
    let id = dir.spawn_surface(Team::Red, anchor, 0.0, &sea);

    let s = 10.0;
    {
        let v = dir.get_mut(id).expect("vehicle");
        v.yaw = FRAC_PI_2; // heading +X
        let Model::Surface(m) = &mut v.model else {
            panic!("surface model");
        };
        m.vel = Vec2::new(s, 0.0);
    }

    for _ in 0..60 {
        dir.update(1.0 / 60.0, &mut solver, &sea, &mut occs);
    }

    let v = dir.get(id).expect("vehicle");
    assert!(v.pos.x <= half_x + 1e-3, "held inside the map");
    assert!(
        math::heading_xz(v.yaw).x < 0.0,
        "post-bounce heading points back into the map (yaw = {})",
        v.yaw
    );
    let Model::Surface(m) = &v.model else {
        panic!("surface model");
    };
    assert!(
        m.vel.length() <= 0.6 * s,
        "speed after the wall bounce: {}",
        m.vel.length()
    );
    assert!(m.vel.x <= 0.0, "velocity reflected across the violated axis");
}

#[test]
fn bounce_is_stricter_than_the_aircraft_clamp() {
    // The aircraft merely clamps at the border; the boat must turn around.
    let cfg = VehicleTunables::default();
    let mut solver = SolverWorld::new(cfg.world.gravity, cfg.world.substep_hz);
    let mut dir = VehicleDirectory::new(&cfg, 21);
    let mut occs = OccupantRegistry::default();
    let sea = FlatTerrain(-5.0);

    let half_z = cfg.world.map_half_z;
    let id = dir.spawn_surface(Team::Blue, Vec3::new(0.0, 0.0, half_z - 2.0), 0.0, &sea);
    {
        let v = dir.get_mut(id).expect("vehicle");
        v.yaw = 0.0; // heading +Z
        let Model::Surface(m) = &mut v.model else {
            panic!("surface model");
        };
        m.vel = Vec2::new(0.0, 8.0);
    }
    for _ in 0..60 {
        dir.update(1.0 / 60.0, &mut solver, &sea, &mut occs);
    }
    let v = dir.get(id).expect("vehicle");
    assert!(math::heading_xz(v.yaw).z < 0.0, "yaw reflected across Z");
    assert!(v.pos.z <= half_z + 1e-3);
}
