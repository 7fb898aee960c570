// One-time world population.
//
// The reference landscape is a Gaussian hill of rock rising from a bedrock
// floor, dressed with a fertile soil skin. A water spring is placed at the
// highest fertile voxel and plant seeds are scattered across random topsoil
// columns. All randomness comes from the seeded `GameRng`, so a (config,
// seed) pair always produces the same world.

use crate::cell::Cell;
use crate::config::SimConfig;
use crate::grid::Grid;
use crate::prng::GameRng;
use crate::types::CellType;

/// Height of the rock surface at (x, y), in voxels.
fn surface_height(config: &SimConfig, x: usize, y: usize) -> f32 {
    let terrain = &config.terrain;
    let (cx, cy) = terrain.hill_centre;
    let dx = x as f32 - cx;
    let dy = y as f32 - cy;
    let sigma_sq = terrain.hill_sigma * terrain.hill_sigma;
    let peak = terrain.hill_amplitude * config.height as f32;
    peak * (-(dx * dx + dy * dy) / (2.0 * sigma_sq)).exp()
}

fn land_cell(config: &SimConfig, x: usize, y: usize, z: usize) -> Cell {
    // z == 0 is always bedrock so the torus has a floor.
    if z == 0 {
        return Cell::rock(config);
    }
    let surface = surface_height(config, x, y);
    let z = z as f32;
    if z < surface {
        Cell::rock(config)
    } else if z < surface + config.terrain.soil_depth as f32 {
        Cell::soil(config)
    } else {
        Cell::air(config)
    }
}

impl Grid {
    /// Populate and build the reference world for a (config, seed) pair.
    pub fn generate(config: SimConfig, seed: u64) -> Result<Self, String> {
        let mut rng = GameRng::new(seed);
        let mut cells = Vec::with_capacity(config.cell_count());
        // Fertile soil voxels as (x, y, z), in index order.
        let mut fertile = Vec::new();

        for z in 0..config.height {
            for y in 0..config.depth {
                for x in 0..config.width {
                    let cell = land_cell(&config, x, y, z);
                    if cell.cell_type == CellType::Soil {
                        fertile.push((x, y, z));
                    }
                    cells.push(cell);
                }
            }
        }
        if fertile.is_empty() {
            return Err("terrain produced no fertile soil".to_string());
        }

        let flat =
            |x: usize, y: usize, z: usize| x + y * config.width + z * config.width * config.depth;
        let topsoil = |fertile: &[(usize, usize, usize)], x: usize, y: usize| {
            fertile
                .iter()
                .filter(|&&(fx, fy, _)| fx == x && fy == y)
                .map(|&(_, _, fz)| fz)
                .max()
        };

        // Scatter plant seeds on the topsoil of randomly chosen fertile
        // columns. Columns may be drawn more than once; replanting the same
        // topsoil voxel is harmless.
        for _ in 0..config.terrain.plant_seed_count {
            let pick = rng.range_u64(0, fertile.len() as u64) as usize;
            let (x, y, _) = fertile[pick];
            if let Some(z) = topsoil(&fertile, x, y) {
                cells[flat(x, y, z)] = Cell::plant(&config);
            }
        }

        // The spring sits at the highest voxel that is still soil after
        // seeding, so seeds never swallow it.
        let spring = fertile
            .iter()
            .filter(|&&(x, y, z)| cells[flat(x, y, z)].cell_type == CellType::Soil)
            .max_by_key(|&&(_, _, z)| z)
            .copied()
            .ok_or_else(|| "plant seeds covered every fertile voxel".to_string())?;
        cells[flat(spring.0, spring.1, spring.2)].water = config.terrain.spring_water;

        Self::from_cells(config, cells)
    }
}
