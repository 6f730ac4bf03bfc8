//! Headless vehicle-sim harness: builds an island world, spawns both teams'
//! fleets, scripts a pilot and a boat driver, and runs a fixed-step session.

use anyhow::Result;
use glam::{Vec2, Vec3};
use terrain_query::IslandTerrain;
use vehicle_core::{DriveInput, OccupantRegistry, SolverWorld, Team, VehicleDirectory};

fn main() -> Result<()> {
    let default = "info";
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_secs()
        .try_init();

    let cfg = data_runtime::configs::vehicles::load_default()?;
    let island = IslandTerrain::new(Vec2::ZERO, 120.0, 14.0, -25.0);
    let mut solver = SolverWorld::new(cfg.world.gravity, cfg.world.substep_hz);
    let mut dir = VehicleDirectory::new(&cfg, 0xC0FFEE);
    let mut occs = OccupantRegistry::default();

    let red_heli = dir.spawn_rotary(Team::Red, Vec3::new(0.0, 0.0, -40.0), 0.0, &mut solver, &island);
    let _blue_heli = dir.spawn_rotary(Team::Blue, Vec3::new(0.0, 0.0, 40.0), std::f32::consts::PI, &mut solver, &island);
    let red_boat = dir.spawn_surface(Team::Red, Vec3::new(0.0, 0.0, -90.0), 0.0, &island);
    let _blue_boat = dir.spawn_surface(Team::Blue, Vec3::new(0.0, 0.0, 90.0), std::f32::consts::PI, &island);

    let pilot = occs.add(Team::Red, dir.get(red_heli).map(|v| v.pos).unwrap_or_default(), 100);
    let skipper = occs.add(Team::Red, dir.get(red_boat).map(|v| v.pos).unwrap_or_default(), 100);
    dir.try_enter(pilot, &mut occs, &mut solver);
    dir.try_enter(skipper, &mut occs, &mut solver);

    let dt = 1.0 / 60.0;
    let ticks = 2400;
    for tick in 0..ticks {
        // Scripted intents: fly out and bank, drive the boat at the beach.
        let fly = match tick {
            0..=299 => DriveInput { thrust: 1.0, ascend: true, ..Default::default() },
            300..=599 => DriveInput { thrust: 1.0, steer_left: true, ..Default::default() },
            600..=899 => DriveInput { brake: 0.6, descend: true, ..Default::default() },
            _ => DriveInput::default(),
        };
        dir.apply_input(pilot, fly);
        dir.apply_input(skipper, DriveInput { thrust: 1.0, ..Default::default() });

        // A scripted shoot-down two-thirds through the session exercises the
        // crash -> hidden -> respawn cycle.
        if tick == 1600 {
            dir.apply_damage(red_heli, 10_000, Team::Blue, &mut occs, &mut solver);
        }

        dir.update(dt, &mut solver, &island, &mut occs);

        if tick % 300 == 0 {
            for v in dir.iter() {
                log::info!(
                    "t={:>5.1}s {:?} {:?} {:?} hp={} pos=({:6.1},{:5.1},{:6.1})",
                    tick as f32 * dt,
                    v.id,
                    v.kind,
                    v.phase,
                    v.hp,
                    v.pos.x,
                    v.pos.y,
                    v.pos.z
                );
            }
        }
    }

    let events = dir.drain_events();
    log::info!("session done: {} ticks, {} events", ticks, events.len());
    for e in events {
        log::info!("event: {e:?}");
    }
    println!("ok");
    Ok(())
}
