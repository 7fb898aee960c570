// Core types shared across the simulation.
//
// Defines the 6-connected face addressing (`Direction`), the closed cell tag
// (`CellType`), and the RGBA colour value published to the renderer
// (`Colour`). All types derive `Serialize` and `Deserialize` so grids can be
// snapshotted for debugging and test fixtures.
//
// **Critical constraint: topology consistency.** A quantity leaving face `d`
// of a cell must be read from face `opposite(d)` of the neighbour across that
// face. `opposite()` is an involution and `from_index()` fails loudly on any
// value outside the six faces — an out-of-range direction is a topology bug,
// never a runtime condition to recover from.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Direction — the 6-connected neighbourhood
// ---------------------------------------------------------------------------

/// One of the six face-adjacent directions in the voxel grid.
///
/// Axis mapping (right-handed, z up):
/// - Left / Right:   -x / +x
/// - Front / Behind: -y / +y
/// - Below / Above:  -z / +z
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Below,
    Above,
    Front,
    Behind,
}

/// Number of faces per cell. Per-face state is stored in `[T; FACE_COUNT]`
/// arrays indexed by `Direction::index()`.
pub const FACE_COUNT: usize = 6;

impl Direction {
    /// All six directions in index order. Iteration over faces always uses
    /// this array so scan order is identical everywhere.
    pub const ALL: [Direction; FACE_COUNT] = [
        Direction::Left,
        Direction::Right,
        Direction::Below,
        Direction::Above,
        Direction::Front,
        Direction::Behind,
    ];

    /// The face on the other side: a value leaving this face of a cell
    /// arrives through `opposite()` of its neighbour.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Below => Direction::Above,
            Direction::Above => Direction::Below,
            Direction::Front => Direction::Behind,
            Direction::Behind => Direction::Front,
        }
    }

    /// Stable index into per-face arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of `index()`.
    ///
    /// Panics on any value outside `0..6`: that indicates corrupted face
    /// bookkeeping somewhere, and silently wrapping would hide the bug.
    pub fn from_index(index: usize) -> Direction {
        match index {
            0 => Direction::Left,
            1 => Direction::Right,
            2 => Direction::Below,
            3 => Direction::Above,
            4 => Direction::Front,
            5 => Direction::Behind,
            _ => panic!("invalid direction index {index}"),
        }
    }

    /// Unit offset along the grid axes for this direction.
    pub fn offset(self) -> (i64, i64, i64) {
        match self {
            Direction::Left => (-1, 0, 0),
            Direction::Right => (1, 0, 0),
            Direction::Below => (0, 0, -1),
            Direction::Above => (0, 0, 1),
            Direction::Front => (0, -1, 0),
            Direction::Behind => (0, 1, 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell tag
// ---------------------------------------------------------------------------

/// The closed set of cell kinds. Classification decisions (pressure boundary
/// conditions, reproduction eligibility) dispatch on this tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellType {
    Air,
    Rock,
    Soil,
    Plant,
}

impl CellType {
    /// Whether water may occupy this medium. Air and Rock are rigid
    /// boundaries: their water is zero by definition.
    pub fn is_porous(self) -> bool {
        matches!(self, CellType::Soil | CellType::Plant)
    }
}

impl Default for CellType {
    fn default() -> Self {
        Self::Air
    }
}

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

/// RGBA colour, components in [0, 1]. Alpha doubles as voxel opacity for the
/// renderer: fully transparent cells (Air) are not drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black — the renderer skips these voxels.
    pub const TRANSPARENT: Colour = Colour::new(0.0, 0.0, 0.0, 0.0);

    /// Linear interpolation of the RGB channels from `self` toward `other`
    /// by `s` in [0, 1]. Alpha is left to the caller — the soil wetness ramp
    /// uses its own alpha curve.
    pub fn lerp_rgb(self, other: Colour, s: f32) -> Colour {
        Colour {
            r: other.r * s + self.r * (1.0 - s),
            g: other.g * s + self.g * (1.0 - s),
            b: other.b * s + self.b * (1.0 - s),
            a: self.a,
        }
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

// ---------------------------------------------------------------------------
// Message channel payload
// ---------------------------------------------------------------------------

/// Opaque per-face message slot exchanged between neighbours each tick.
///
/// The core physics never inspects the payload — it exists so cell variants
/// can signal across faces without new plumbing. An empty message is the
/// normal case, not an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub payload: Option<f32>,
}
