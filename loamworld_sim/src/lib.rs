// loamworld_sim — pure Rust ecosystem simulation library.
//
// This crate contains all simulation logic for Loamworld: a discrete 3-D
// cellular automaton of a soil/water/plant ecosystem on a toroidal voxel
// grid. It has zero rendering dependencies and can be tested, benchmarked,
// and run headless.
//
// Module overview:
// - `types.rs`:   Direction (6-connected face addressing), CellType, Colour,
//                 Message.
// - `prng.rs`:    GameRng — xoshiro256** PRNG with SplitMix64 seeding.
// - `config.rs`:  SimConfig — all tunable parameters (dimensions, pressure
//                 model, plant physiology, terrain), serde/JSON-loadable.
// - `cell.rs`:    The per-voxel Cell record and variant behaviour.
// - `flux.rs`:    Bounded greedy flux allocation (the water outflow solver).
// - `plant.rs`:   Plant physiology — Leaf/Shoot/Root roles and behaviours.
// - `grid.rs`:    Grid — flat voxel arena, toroidal wrapping, the message
//                 channel, resource transport, reproduction fights, and the
//                 three-phase `advance_tick` cycle with TickReport events.
// - `terrain.rs`: One-time world population (Gaussian hill, soil skin,
//                 spring, plant seeds).
//
// The companion crate `loamworld_bridge` runs this library on a background
// engine thread and publishes colour frames to a renderer. That boundary is
// enforced at the compiler level — this crate cannot depend on threads,
// frame timing, or any render type beyond the RGBA colour snapshot.
//
// **Critical constraint: determinism.** The simulation is a pure function of
// (cells, config, seed): each tick is single-threaded, iterates in fixed
// index order, and consumes no entropy beyond the seeded GameRng used at
// world generation. No HashMap iteration, no system time, no OS entropy.

pub mod cell;
pub mod config;
pub mod flux;
pub mod grid;
pub mod plant;
pub mod prng;
pub mod terrain;
pub mod types;

pub use cell::Cell;
pub use config::SimConfig;
pub use grid::{Grid, TickEvent, TickReport};
pub use types::{CellType, Colour, Direction};
