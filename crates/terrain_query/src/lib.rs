//! Terrain sampling seam used by the vehicle sim.
//!
//! Vehicles never see terrain geometry; they only ask for the ground height
//! under an XZ point. Keep this crate free of sim dependencies.

use glam::{Vec2, Vec3};

/// Height query contract: `height_at(x, z)` returns the terrain surface Y.
pub trait TerrainQuery {
    fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Constant-height terrain for tests.
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain(pub f32);

impl TerrainQuery for FlatTerrain {
    #[inline]
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}

/// Analytic island: a land plateau falling off smoothly to a seafloor.
///
/// Gives spawn probing and shoreline tests a real land/water boundary without
/// any mesh construction. Heights are absolute world Y; pair with a world
/// water level between `seafloor` and `peak` to get a shoreline ring at
/// roughly `radius * sqrt(1 - water/peak)` from center.
#[derive(Debug, Clone, Copy)]
pub struct IslandTerrain {
    pub center: Vec2,
    /// Distance from center at which land reaches the seafloor.
    pub radius: f32,
    pub peak: f32,
    pub seafloor: f32,
}

impl IslandTerrain {
    pub fn new(center: Vec2, radius: f32, peak: f32, seafloor: f32) -> Self {
        Self { center, radius, peak, seafloor }
    }
}

impl TerrainQuery for IslandTerrain {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        let d = Vec2::new(x, z).distance(self.center);
        let t = (d / self.radius.max(1e-3)).clamp(0.0, 1.0);
        // Smooth quadratic falloff: flat-ish top, steep mid, level seafloor.
        let f = 1.0 - t * t * (3.0 - 2.0 * t);
        self.seafloor + (self.peak - self.seafloor) * f
    }
}

/// Playable rectangle centered on the origin.
#[derive(Debug, Clone, Copy)]
pub struct MapBounds {
    pub half_x: f32,
    pub half_z: f32,
}

impl MapBounds {
    pub fn new(half_x: f32, half_z: f32) -> Self {
        Self { half_x, half_z }
    }

    #[inline]
    pub fn contains_xz(&self, p: Vec3) -> bool {
        p.x.abs() <= self.half_x && p.z.abs() <= self.half_z
    }

    /// Clamp a point into the rectangle (Y untouched).
    #[inline]
    pub fn clamp_xz(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(-self.half_x, self.half_x),
            p.y,
            p.z.clamp(-self.half_z, self.half_z),
        )
    }

    /// Which axes the point violates: `(x_out, z_out)`.
    #[inline]
    pub fn violated_axes(&self, p: Vec3) -> (bool, bool) {
        (p.x.abs() > self.half_x, p.z.abs() > self.half_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn island_is_land_at_center_and_sea_at_edge() {
        let isl = IslandTerrain::new(Vec2::ZERO, 100.0, 12.0, -20.0);
        assert!((isl.height_at(0.0, 0.0) - 12.0).abs() < 1e-4);
        assert!((isl.height_at(100.0, 0.0) - -20.0).abs() < 1e-4);
        // Monotone falloff between the two.
        let mid = isl.height_at(50.0, 0.0);
        assert!(mid < 12.0 && mid > -20.0);
    }

    #[test]
    fn bounds_clamp_and_violation() {
        let b = MapBounds::new(10.0, 20.0);
        let p = Vec3::new(15.0, 3.0, -25.0);
        assert_eq!(b.violated_axes(p), (true, true));
        let c = b.clamp_xz(p);
        assert_eq!(c, Vec3::new(10.0, 3.0, -20.0));
        assert!(b.contains_xz(c));
    }
}
