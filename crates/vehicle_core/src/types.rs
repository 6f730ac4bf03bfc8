//! Shared vehicle-sim types.

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VehicleId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    #[inline]
    pub fn hostile_to(self, other: Team) -> bool {
        self != other
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VehicleKind {
    Rotary,
    Surface,
}

/// Lifecycle phase of a vehicle's physical representation.
///
/// `Active` is force-driven (aircraft) or self-integrated (surface craft);
/// `Crashing` is a free dynamic tumble under the solver; `AwaitingRespawn` is
/// hidden and scripted while the respawn countdown runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Active,
    Crashing,
    AwaitingRespawn,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    pub destroyed: bool,
    pub applied: i32,
}
