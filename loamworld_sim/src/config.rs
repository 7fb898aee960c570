// Data-driven simulation configuration.
//
// All tunable parameters live in `SimConfig`, loadable from JSON at startup.
// The sim never uses magic numbers — it reads from the config, so behaviour
// experiments (different permeabilities, sunlight levels, reproduction
// thresholds) need no recompilation. `Default` is the reference parameter
// set; every documented behaviour and every test assumes it.
//
// Parameters are grouped into nested structs: `PressureParams` for the
// water-pressure model, `PlantParams` for physiology thresholds, and
// `TerrainParams` for one-time world population.
//
// See also: `cell.rs` which reads `PressureParams` in `update_water`,
// `plant.rs` which reads `PlantParams`, `terrain.rs` which reads
// `TerrainParams`, `grid.rs` which owns the `SimConfig` as part of `Grid`.

use serde::{Deserialize, Serialize};

/// Water-pressure model parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PressureParams {
    /// Pressure per unit water below the saturation threshold.
    pub unsaturated_gradient: f32,
    /// Pressure per unit water at or above saturation.
    pub saturated_gradient: f32,
    /// Base pressure for a saturated Plant cell; the saturated-regime
    /// pressure is `base + (water - wsat) * saturated_gradient`, a steeper
    /// response above saturation than soil's.
    pub plant_saturated_base: f32,
    /// Saturation threshold: the water level at which a cell switches from
    /// the unsaturated to the saturated pressure regime.
    pub wsat: f32,
    /// Flux per unit pressure difference across a face.
    pub permeability: f32,
    /// External pressure reported for faces adjoining Air or Rock —
    /// effectively infinite, so no flux is ever allocated toward a rigid
    /// boundary.
    pub boundary_pressure: f32,
}

impl Default for PressureParams {
    fn default() -> Self {
        Self {
            unsaturated_gradient: 0.5,
            saturated_gradient: 1.0,
            // Continuous with the unsaturated regime at wsat: 0.5 * 128.
            plant_saturated_base: 64.0,
            wsat: 128.0,
            permeability: 1.0 / 32.0,
            boundary_pressure: 10_000.0,
        }
    }
}

/// Plant physiology thresholds and action strengths.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlantParams {
    /// Energy gained per tick by a plant face directly under open sky
    /// (Air above).
    pub sunlight_direct: f32,
    /// Energy gained per tick for each other air-exposed face.
    pub sunlight_ambient: f32,
    /// Leaf: minimum energy before it feeds the stem below.
    pub leaf_feed_min_energy: f32,
    /// Leaf: maximum energy sent down the stem per tick.
    pub leaf_feed_amount: f32,
    /// Minimum energy before any reproduction attempt.
    pub reproduce_min_energy: f32,
    /// Minimum water for reproducing downward (into soil).
    pub reproduce_down_min_water: f32,
    /// Minimum water for reproducing upward (growing the stem).
    pub reproduce_up_min_water: f32,
    /// Leaf: minimum energy before it pumps water up from below.
    pub leaf_pump_min_energy: f32,
    /// Shoot and Root: minimum energy before relaying water up the stem.
    pub stem_pump_min_energy: f32,
    /// Magnitude of the pressure bias a pump action applies. The energy
    /// cost equals the magnitude actually applied.
    pub pump_force: f32,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            sunlight_direct: 8.0,
            sunlight_ambient: 1.0,
            leaf_feed_min_energy: 5.0,
            leaf_feed_amount: 5.0,
            reproduce_min_energy: 30.0,
            reproduce_down_min_water: 5.0,
            reproduce_up_min_water: 7.0,
            leaf_pump_min_energy: 40.0,
            stem_pump_min_energy: 10.0,
            pump_force: 2.0,
        }
    }
}

/// One-time world-population parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Peak height of the Gaussian hill, as a fraction of grid height.
    pub hill_amplitude: f32,
    /// Standard deviation of the hill along both horizontal axes, in voxels.
    pub hill_sigma: f32,
    /// Horizontal position of the hill summit, in voxels.
    pub hill_centre: (f32, f32),
    /// Thickness of the fertile soil skin laid over the rock surface.
    pub soil_depth: u32,
    /// Number of plant seeds scattered on random topsoil columns.
    pub plant_seed_count: u32,
    /// Water deposited at the spring (the highest fertile voxel).
    pub spring_water: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            hill_amplitude: 0.625,
            hill_sigma: 2.5,
            hill_centre: (5.0, 5.0),
            soil_depth: 2,
            plant_seed_count: 16,
            spring_water: 8192.0,
        }
    }
}

/// Complete simulation configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Grid extent along x.
    pub width: usize,
    /// Grid extent along y.
    pub depth: usize,
    /// Grid extent along z (vertical).
    pub height: usize,
    /// Energy stored in every Rock cell at construction. Rock acts as an
    /// inert energy reservoir: it accepts inflow but never acts.
    pub rock_energy: f32,
    /// Water level at which soil renders fully water-coloured.
    pub soil_colour_water_scale: f32,
    pub pressure: PressureParams,
    pub plant: PlantParams,
    pub terrain: TerrainParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 16,
            depth: 16,
            height: 8,
            rock_energy: 1000.0,
            soil_colour_water_scale: 16.0,
            pressure: PressureParams::default(),
            plant: PlantParams::default(),
            terrain: TerrainParams::default(),
        }
    }
}

impl SimConfig {
    /// Number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        self.width * self.depth * self.height
    }

    /// Load a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reference_dimensions() {
        let config = SimConfig::default();
        assert_eq!((config.width, config.depth, config.height), (16, 16, 8));
        assert_eq!(config.cell_count(), 16 * 16 * 8);
    }

    #[test]
    fn plant_pressure_continuous_at_saturation() {
        let p = PressureParams::default();
        let below = p.unsaturated_gradient * p.wsat;
        let at = p.plant_saturated_base;
        assert!((below - at).abs() < 1e-6);
    }

    #[test]
    fn json_roundtrip() {
        let config = SimConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored = SimConfig::from_json(&json).unwrap();
        assert_eq!(restored.width, config.width);
        assert_eq!(restored.pressure.wsat, config.pressure.wsat);
        assert_eq!(restored.plant.pump_force, config.plant.pump_force);
    }

    #[test]
    fn partial_json_fails_loudly() {
        // SimConfig has no serde defaults: a config file must be complete.
        assert!(SimConfig::from_json("{\"width\": 4}").is_err());
    }
}
