use serde::{Deserialize, Serialize};

/// A position in a named world, with full floating-point precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldLocation {
    /// The world this position is in.
    pub world: String,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl WorldLocation {
    /// Create a location in the given world.
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// The block this position falls in (coordinates floored).
    pub fn block(&self) -> BlockPos {
        BlockPos {
            world: self.world.clone(),
            x: self.x.floor() as i64,
            y: self.y.floor() as i64,
            z: self.z.floor() as i64,
        }
    }
}

/// A block position: integer coordinates in a named world.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// The world this block is in.
    pub world: String,
    /// Block X coordinate.
    pub x: i64,
    /// Block Y coordinate.
    pub y: i64,
    /// Block Z coordinate.
    pub z: i64,
}

impl BlockPos {
    /// Create a block position in the given world.
    pub fn new(world: impl Into<String>, x: i64, y: i64, z: i64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Whether this block lies inside the axis-aligned box spanned by the
    /// two corners, inclusive on every axis.
    ///
    /// The corners may be given in any order; min/max is taken per axis.
    /// All three positions must be in the same world — if either corner is
    /// in a different world than this position, the answer is `false`.
    pub fn in_box(&self, corner1: &BlockPos, corner2: &BlockPos) -> bool {
        self.same_world(corner1, corner2)
            && Self::between(corner1.x, corner2.x, self.x)
            && Self::between(corner1.y, corner2.y, self.y)
            && Self::between(corner1.z, corner2.z, self.z)
    }

    fn same_world(&self, corner1: &BlockPos, corner2: &BlockPos) -> bool {
        corner1.world == corner2.world && corner2.world == self.world
    }

    fn between(range1: i64, range2: i64, pos: i64) -> bool {
        range1.min(range2) <= pos && pos <= range1.max(range2)
    }
}
