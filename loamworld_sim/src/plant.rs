// Plant physiology.
//
// A plant cell has no stored role: its role is re-derived every tick from
// the neighbour-type cache, so a plant that loses its canopy position (a
// neighbour reproduced over its light) reverts behaviour on the very next
// tick without any state migration.
//
// Roles form a vertical division of labour. Leaves photosynthesise (see
// `Cell::update_sunlight`) and feed energy down the stem; shoots relay water
// upward; roots push soil water into the stem and extend the plant into new
// cells. All thresholds come from `PlantParams`.

use crate::cell::Cell;
use crate::config::PlantParams;
use crate::types::{CellType, Colour, Direction};
use serde::{Deserialize, Serialize};

pub const LEAF_COLOUR: Colour = Colour::new(0.0, 1.0, 0.0, 1.0);
pub const SHOOT_COLOUR: Colour = Colour::new(0.13, 0.55, 0.13, 1.0);
pub const ROOT_COLOUR: Colour = Colour::new(0.85, 0.8, 0.6, 1.0);

/// Functional role of a plant cell, derived from its neighbourhood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Leaf,
    Shoot,
    Root,
}

impl Role {
    /// Air above makes a leaf; plant on both vertical faces makes a shoot;
    /// everything else is a root.
    pub fn classify(neighbour_type: &[CellType; 6]) -> Self {
        let above = neighbour_type[Direction::Above.index()];
        let below = neighbour_type[Direction::Below.index()];
        if above == CellType::Air {
            Role::Leaf
        } else if above == CellType::Plant && below == CellType::Plant {
            Role::Shoot
        } else {
            Role::Root
        }
    }

    pub fn colour(self) -> Colour {
        match self {
            Role::Leaf => LEAF_COLOUR,
            Role::Shoot => SHOOT_COLOUR,
            Role::Root => ROOT_COLOUR,
        }
    }
}

/// Per-tick behaviour of a plant cell, called from `Cell::update`.
pub fn update_plant(cell: &mut Cell, params: &PlantParams) {
    let role = Role::classify(&cell.neighbour_type);
    let above = cell.neighbour_type[Direction::Above.index()];
    let below = cell.neighbour_type[Direction::Below.index()];

    match role {
        Role::Leaf => {
            if below == CellType::Plant && cell.energy > params.leaf_feed_min_energy {
                cell.send_energy(params.leaf_feed_amount, Direction::Below);
            }
            if below == CellType::Soil
                && cell.energy > params.reproduce_min_energy
                && cell.water > params.reproduce_down_min_water
            {
                cell.set_reproduce(Direction::Below);
            }
            // A lone sprout rooted in soil may still grow its canopy upward.
            let earth_contact = Direction::ALL.iter().any(|&d| {
                d != Direction::Above
                    && cell.neighbour_type[d.index()] == CellType::Soil
            });
            if earth_contact
                && cell.energy > params.reproduce_min_energy
                && cell.water > params.reproduce_up_min_water
            {
                cell.set_reproduce(Direction::Above);
            }
            if cell.energy > params.leaf_pump_min_energy {
                cell.pump(Direction::Below, -params.pump_force);
            }
        }
        Role::Shoot => {
            if cell.energy > params.stem_pump_min_energy {
                cell.pump(Direction::Above, params.pump_force);
                cell.pump(Direction::Below, -params.pump_force);
            }
        }
        Role::Root => {
            if below == CellType::Soil
                && cell.energy > params.reproduce_min_energy
                && cell.water > params.reproduce_down_min_water
            {
                cell.set_reproduce(Direction::Below);
            }
            if above != CellType::Plant
                && cell.energy > params.reproduce_min_energy
                && cell.water > params.reproduce_up_min_water
            {
                cell.set_reproduce(Direction::Above);
            }
            if cell.energy > params.stem_pump_min_energy {
                cell.pump(Direction::Above, params.pump_force);
            }
        }
    }

    cell.colour = role.colour();
}
