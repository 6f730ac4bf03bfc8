//! Per-tick control intent snapshot from whichever controller holds the
//! driver seat.

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DriveInput {
    /// Forward thrust, 0..=1.
    pub thrust: f32,
    /// Reverse thrust / brake, 0..=1.
    pub brake: f32,
    pub steer_left: bool,
    pub steer_right: bool,
    pub ascend: bool,
    pub descend: bool,
}

impl DriveInput {
    /// +1 left, -1 right, 0 neutral (yaw is CCW-positive).
    #[inline]
    pub fn steer_axis(&self) -> f32 {
        (self.steer_left as i32 - self.steer_right as i32) as f32
    }

    /// Clamp analog channels into range; bools pass through.
    #[inline]
    pub fn clamped(mut self) -> Self {
        self.thrust = self.thrust.clamp(0.0, 1.0);
        self.brake = self.brake.clamp(0.0, 1.0);
        self
    }
}
