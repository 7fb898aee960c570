// Per-voxel cell state and variant behaviour.
//
// A `Cell` is a plain record tagged by `CellType`; variant behaviour is match
// dispatch on the tag rather than an open trait hierarchy — the set of kinds
// is closed and classification rules elsewhere (pressure boundaries,
// reproduction) need the tag anyway.
//
// Air and Rock are rigid boundaries: they never gain or move water, their
// external pressure is pinned at the boundary sentinel, and any water
// delivered to them is a bug upstream (reported by `apply_flux`, discarded,
// never fatal). Soil and Plant are the porous media the diffusion model
// operates on.
//
// See also: `flux.rs` for the outflow rationing called from `update_flux`,
// `plant.rs` for the physiology run from `update`, `grid.rs` for the tick
// phases that call into here.
//
// **Critical constraint: non-negative resources.** `water` and `energy`
// never go below zero. Every outflow path (flux allocation, send_energy,
// pump) clamps to what the cell actually owns.

use crate::config::{PlantParams, PressureParams, SimConfig};
use crate::flux;
use crate::plant;
use crate::types::{CellType, Colour, Direction, FACE_COUNT, Message};
use serde::{Deserialize, Serialize};

/// Fixed colours for the non-soil variants.
pub const AIR_COLOUR: Colour = Colour::TRANSPARENT;
pub const ROCK_COLOUR: Colour = Colour::new(0.6, 0.6, 0.6, 1.0);
/// Dry earth; interpolated toward `WATER_COLOUR` as soil wets.
pub const SOIL_DRY_COLOUR: Colour = Colour::new(0.8, 0.3, 0.0, 0.8);
pub const WATER_COLOUR: Colour = Colour::new(0.075, 0.416, 0.636, 0.8);

/// One voxel of the world.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,

    // Resources. Always >= 0.
    pub water: f32,
    pub energy: f32,

    // Water model parameters (copied from config at construction so a cell
    // is self-contained when cloned by reproduction).
    pub wsat: f32,
    pub permeability: f32,

    // Per-face state, indexed by `Direction::index()`.
    /// Externally imposed pressure per face, refreshed every tick by the
    /// grid's post-update (pinned at the boundary sentinel for Air/Rock).
    pub water_pressure_external: [f32; FACE_COUNT],
    /// Transient per-face pressure bias from pump actions; consumed and
    /// zeroed by the next `update_water`.
    pub pressure_gradient: [f32; FACE_COUNT],
    /// Outgoing water committed per face for the current tick.
    pub flux: [f32; FACE_COUNT],
    /// Energy committed to leave via each face this tick.
    pub energy_outgoing: [f32; FACE_COUNT],
    /// Cached neighbour tags, refreshed each tick before `update`.
    pub neighbour_type: [CellType; FACE_COUNT],
    /// Message slots exchanged with neighbours before `update`.
    pub incoming: [Message; FACE_COUNT],
    pub outgoing: [Message; FACE_COUNT],
    /// Per-face intent to replace the neighbour on that face this tick.
    pub reproduce: [bool; FACE_COUNT],

    /// Derived render colour, recomputed by `update`.
    pub colour: Colour,
}

impl Cell {
    fn blank(cell_type: CellType, colour: Colour, config: &SimConfig) -> Self {
        Self {
            cell_type,
            water: 0.0,
            energy: 0.0,
            wsat: config.pressure.wsat,
            permeability: config.pressure.permeability,
            water_pressure_external: [0.0; FACE_COUNT],
            pressure_gradient: [0.0; FACE_COUNT],
            flux: [0.0; FACE_COUNT],
            energy_outgoing: [0.0; FACE_COUNT],
            neighbour_type: [CellType::Air; FACE_COUNT],
            incoming: [Message::default(); FACE_COUNT],
            outgoing: [Message::default(); FACE_COUNT],
            reproduce: [false; FACE_COUNT],
            colour,
        }
    }

    pub fn air(config: &SimConfig) -> Self {
        let mut cell = Self::blank(CellType::Air, AIR_COLOUR, config);
        cell.water_pressure_external = [config.pressure.boundary_pressure; FACE_COUNT];
        cell
    }

    pub fn rock(config: &SimConfig) -> Self {
        let mut cell = Self::blank(CellType::Rock, ROCK_COLOUR, config);
        cell.water_pressure_external = [config.pressure.boundary_pressure; FACE_COUNT];
        cell.energy = config.rock_energy;
        cell
    }

    pub fn soil(config: &SimConfig) -> Self {
        Self::blank(CellType::Soil, SOIL_DRY_COLOUR, config)
    }

    pub fn plant(config: &SimConfig) -> Self {
        Self::blank(CellType::Plant, plant::LEAF_COLOUR, config)
    }

    // -----------------------------------------------------------------------
    // Tick-phase operations
    // -----------------------------------------------------------------------

    /// Recompute the tentative per-face flux from internal pressure.
    ///
    /// Air/Rock are rigid and do nothing. For porous cells the internal
    /// pressure is regime-dependent (unsaturated below `wsat`, saturated at
    /// or above), the per-face flux follows the pressure difference across
    /// the face, and the Below face gets an extra gravity term. The pump
    /// bias in `pressure_gradient` is consumed here and zeroed — a pump
    /// action lasts a single tick.
    pub fn update_water(&mut self, params: &PressureParams) {
        if !self.cell_type.is_porous() {
            return;
        }

        let pressure = if self.water < self.wsat {
            params.unsaturated_gradient * self.water
        } else {
            match self.cell_type {
                CellType::Soil => params.saturated_gradient * self.water,
                CellType::Plant => {
                    params.plant_saturated_base
                        + (self.water - self.wsat) * params.saturated_gradient
                }
                // Porous check above excludes Air/Rock.
                CellType::Air | CellType::Rock => unreachable!(),
            }
        };

        for direction in Direction::ALL {
            let d = direction.index();
            self.flux[d] = (pressure + self.pressure_gradient[d]
                - self.water_pressure_external[d])
                * self.permeability;
        }
        self.flux[Direction::Below.index()] += self.water * self.permeability;

        self.pressure_gradient = [0.0; FACE_COUNT];
    }

    /// Ration the tentative flux against available water (see `flux.rs`).
    /// Committed water leaves the cell immediately.
    pub fn update_flux(&mut self) {
        if !self.cell_type.is_porous() {
            return;
        }
        self.flux = flux::allocate(self.flux, &mut self.water);
    }

    /// Photosynthesis. Plants gain energy from every air-exposed face:
    /// direct light from above, ambient light from the sides and below.
    pub fn update_sunlight(&mut self, params: &PlantParams) {
        if self.cell_type != CellType::Plant {
            return;
        }
        for direction in Direction::ALL {
            if self.neighbour_type[direction.index()] != CellType::Air {
                continue;
            }
            self.energy += if direction == Direction::Above {
                params.sunlight_direct
            } else {
                params.sunlight_ambient
            };
        }
    }

    /// Variant-specific per-tick behaviour, run after the message exchange.
    pub fn update(&mut self, config: &SimConfig) {
        match self.cell_type {
            CellType::Air | CellType::Rock => {}
            CellType::Soil => {
                let scale = (self.water / config.soil_colour_water_scale).min(1.0);
                let mut colour = SOIL_DRY_COLOUR.lerp_rgb(WATER_COLOUR, scale);
                colour.a = if scale > 0.2 { scale.min(0.8) } else { 0.2 };
                self.colour = colour;
            }
            CellType::Plant => plant::update_plant(self, &config.plant),
        }
    }

    /// Commit inbound transport.
    ///
    /// Porous cells accumulate both resources. Air/Rock accumulate energy
    /// only; positive water inflow is a boundary violation — the inflow is
    /// returned to the caller for reporting and discarded here, so the rigid
    /// invariant (`water == 0`) holds no matter what upstream did.
    pub fn apply_flux(&mut self, water_incoming: f32, energy_incoming: f32) -> f32 {
        self.energy += energy_incoming;
        if self.cell_type.is_porous() {
            self.water += water_incoming;
            0.0
        } else {
            water_incoming
        }
    }

    // -----------------------------------------------------------------------
    // Actions (used by plant physiology)
    // -----------------------------------------------------------------------

    /// Commit up to `amount` of owned energy to leave via `direction` during
    /// transport. The energy is deducted immediately — committed energy is
    /// no longer the cell's to spend.
    pub fn send_energy(&mut self, amount: f32, direction: Direction) {
        let amount = amount.clamp(0.0, self.energy);
        self.energy_outgoing[direction.index()] += amount;
        self.energy -= amount;
    }

    /// Bias the internal pressure on one face for the next tick, at an
    /// energy cost equal to the force magnitude. A cell that cannot afford
    /// the full force applies (and pays for) only what it can.
    pub fn pump(&mut self, direction: Direction, force: f32) {
        let mut force = force;
        let mut cost = force.abs();
        if cost > self.energy {
            force = force.signum() * self.energy;
            cost = self.energy;
        }
        self.pressure_gradient[direction.index()] += force;
        self.energy -= cost;
    }

    /// Record the intent to replace the neighbour on `direction` this tick.
    /// The grid's fight pass consumes and clears the flag.
    pub fn set_reproduce(&mut self, direction: Direction) {
        self.reproduce[direction.index()] = true;
    }
}
