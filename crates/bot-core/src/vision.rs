//! Line of sight against the known wall set.
//!
//! Brute force over every wall tile; the set stays small enough in practice
//! that nothing smarter has been needed.

use std::collections::HashSet;

use crate::geometry::{segment_hits_aabb, Aabb, Loc};

/// Wall tiles are 8x8 squares identified by their center: center +/- 4 in
/// both axes.
pub const WALL_HALF_EXTENT: i32 = 4;

/// True iff the straight segment between the two points crosses no known
/// wall tile. Knowing nothing means seeing everything: an empty wall set
/// never blocks. Symmetric under swapping `from` and `to`.
pub fn line_of_sight(walls: &HashSet<Loc>, from: Loc, to: Loc) -> bool {
    walls
        .iter()
        .all(|center| !segment_hits_aabb(from, to, &Aabb::from_center(*center, WALL_HALF_EXTENT)))
}
