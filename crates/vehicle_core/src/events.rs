//! Outbound event bus entries for scorekeeping/kill-feed consumers.

use crate::occupant::OccupantId;
use crate::types::{Team, VehicleKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VehicleEvent {
    Destroyed {
        destroyer_team: Team,
        vehicle_team: Team,
        kind: VehicleKind,
    },
    OccupantKilled {
        occupant: OccupantId,
        vehicle_team: Team,
        destroyer_team: Team,
    },
}
