use std::collections::HashSet;

use crate::geometry::Loc;
use crate::world::{PlayerState, Sighting, WorldState};

/// A self-consistent view of everything one planning tick uses, cloned out
/// of the world state in a single lock acquisition so the planner never
/// sees a torn update.
#[derive(Debug, Clone)]
pub struct Observation {
    pub player: PlayerState,
    pub exit: Option<Loc>,
    pub my_key: Option<Loc>,
    pub walls: HashSet<Loc>,
    pub enemy: Option<Sighting>,
    pub ammo_items: Vec<Sighting>,
    pub food_items: Vec<Sighting>,
}

impl Observation {
    pub fn from_world(world: &WorldState) -> Self {
        Self {
            player: world.player.clone(),
            exit: world.exit,
            my_key: world.my_key,
            walls: world.walls.clone(),
            enemy: world.enemy,
            ammo_items: world.ammo_items.clone(),
            food_items: world.food_items.clone(),
        }
    }
}
