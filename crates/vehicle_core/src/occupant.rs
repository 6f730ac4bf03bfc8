//! Occupant registry. Seats hold `OccupantId`s into this store, never
//! references, so ejection can never dangle.

use glam::Vec3;
use rapier3d::prelude::RigidBodyHandle;

use crate::solver::SolverWorld;
use crate::types::{Team, VehicleId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OccupantId(pub u32);

/// AI-side cached navigation state that must be cleared on every eject path.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ControllerCache {
    pub driving: Option<VehicleId>,
}

#[derive(Clone, Debug)]
pub struct Occupant {
    pub id: OccupantId,
    pub team: Team,
    pub pos: Vec3,
    pub hp: i32,
    pub max_hp: i32,
    pub alive: bool,
    /// Back-reference set/cleared only by vehicle enter/exit/eject.
    pub vehicle: Option<VehicleId>,
    pub controller: Option<ControllerCache>,
    pub body: Option<RigidBodyHandle>,
    /// Mirrors the physical body's collision-response flag.
    pub collision_response: bool,
}

#[derive(Default)]
pub struct OccupantRegistry {
    next_id: u32,
    occupants: Vec<Occupant>,
}

impl OccupantRegistry {
    pub fn add(&mut self, team: Team, pos: Vec3, max_hp: i32) -> OccupantId {
        let id = OccupantId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.occupants.push(Occupant {
            id,
            team,
            pos,
            hp: max_hp,
            max_hp,
            alive: true,
            vehicle: None,
            controller: None,
            body: None,
            collision_response: true,
        });
        id
    }

    /// Variant with an AI controller cache and a physical body.
    pub fn add_with_body(
        &mut self,
        team: Team,
        pos: Vec3,
        max_hp: i32,
        solver: &mut SolverWorld,
    ) -> OccupantId {
        let id = self.add(team, pos, max_hp);
        let body = solver.add_occupant_capsule(pos);
        if let Some(o) = self.get_mut(id) {
            o.body = Some(body);
        }
        id
    }

    #[inline]
    pub fn get(&self, id: OccupantId) -> Option<&Occupant> {
        self.occupants.iter().find(|o| o.id == id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: OccupantId) -> Option<&mut Occupant> {
        self.occupants.iter_mut().find(|o| o.id == id)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Occupant> {
        self.occupants.iter()
    }

    /// Clamps at 0 and flips `alive` on the crossing edge.
    pub fn take_damage(&mut self, id: OccupantId, amount: i32) {
        if let Some(o) = self.get_mut(id) {
            if !o.alive {
                return;
            }
            o.hp = (o.hp - amount.max(0)).max(0);
            if o.hp == 0 {
                o.alive = false;
            }
        }
    }

    /// Guaranteed-lethal variant used by vehicle destruction.
    pub fn kill(&mut self, id: OccupantId) {
        let max = self.get(id).map(|o| o.max_hp).unwrap_or(0);
        self.take_damage(id, max);
    }

    /// Toggle the occupant's physical collision response and mirror the flag.
    pub fn set_collision_response(&mut self, id: OccupantId, on: bool, solver: &mut SolverWorld) {
        if let Some(o) = self.get_mut(id) {
            o.collision_response = on;
            if let Some(b) = o.body {
                solver.set_collision_response(b, on);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_clamps_and_kills_once() {
        let mut reg = OccupantRegistry::default();
        let id = reg.add(Team::Red, Vec3::ZERO, 100);
        reg.take_damage(id, 60);
        assert_eq!(reg.get(id).map(|o| o.hp), Some(40));
        reg.take_damage(id, 500);
        let o = reg.get(id).expect("occupant");
        assert_eq!(o.hp, 0);
        assert!(!o.alive);
        // Dead occupants ignore further damage.
        reg.take_damage(id, 10);
        assert_eq!(reg.get(id).map(|o| o.hp), Some(0));
    }

    #[test]
    fn kill_is_lethal_from_full_health() {
        let mut reg = OccupantRegistry::default();
        let id = reg.add(Team::Blue, Vec3::ZERO, 250);
        reg.kill(id);
        assert!(!reg.get(id).expect("occupant").alive);
    }
}
