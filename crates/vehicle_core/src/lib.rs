//! Authoritative vehicle simulation: a rotary-wing aircraft and a surface
//! watercraft with multi-occupant seating, damage/destruction, and
//! scripted-to-simulated crash transitions.
//!
//! Single-threaded and cooperative: `VehicleDirectory::update` runs the whole
//! tick (driver intent -> solver sub-steps -> resolved pose + safety nets ->
//! seat followers -> phase timers) so every consumer query in the same tick
//! reads post-update state.

pub mod directory;
pub mod events;
pub mod input;
pub mod math;
pub mod occupant;
pub mod rotary;
pub mod solver;
pub mod surface;
pub mod types;
pub mod vehicle;

pub use directory::VehicleDirectory;
pub use events::VehicleEvent;
pub use input::DriveInput;
pub use occupant::{ControllerCache, Occupant, OccupantId, OccupantRegistry};
pub use solver::{BodyProfile, SolverWorld};
pub use types::{DamageOutcome, Phase, Team, VehicleId, VehicleKind};
pub use vehicle::{HitShape, Model, Vehicle};
