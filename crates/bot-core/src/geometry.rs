//! Integer-grid geometry: locations, compass directions, and the
//! segment/box intersection primitives the line-of-sight test is built on.
//!
//! Everything here is exact integer arithmetic. The intersection predicate
//! must give the same answer regardless of which endpoint is "from" and
//! which is "to", so it is built from orientation tests rather than a
//! parametric clip.

/// A position on the world grid, in world coordinate units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Loc {
    pub x: i32,
    pub y: i32,
}

impl Loc {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// One of the eight compass directions. `y` grows southward, as on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Short protocol name ("n", "ne", ...).
    pub fn wire_name(self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::NorthEast => "ne",
            Direction::East => "e",
            Direction::SouthEast => "se",
            Direction::South => "s",
            Direction::SouthWest => "sw",
            Direction::West => "w",
            Direction::NorthWest => "nw",
        }
    }

    /// Signed unit components (dx, dy) of this direction.
    pub fn signs(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Mirror the x component (ne<->nw, se<->sw, e<->w).
    pub fn flip_x(self) -> Self {
        match self {
            Direction::NorthEast => Direction::NorthWest,
            Direction::NorthWest => Direction::NorthEast,
            Direction::SouthEast => Direction::SouthWest,
            Direction::SouthWest => Direction::SouthEast,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            other => other,
        }
    }

    /// Mirror the y component (ne<->se, nw<->sw, n<->s).
    pub fn flip_y(self) -> Self {
        match self {
            Direction::NorthEast => Direction::SouthEast,
            Direction::SouthEast => Direction::NorthEast,
            Direction::NorthWest => Direction::SouthWest,
            Direction::SouthWest => Direction::NorthWest,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            other => other,
        }
    }

    /// Facing from one location toward another. Exact axis alignment yields
    /// a cardinal; anything else yields a diagonal by the sign of each
    /// coordinate difference. `from == to` degenerates to north.
    pub fn toward(from: Loc, to: Loc) -> Direction {
        if to.x == from.x {
            if to.y > from.y {
                Direction::South
            } else {
                Direction::North
            }
        } else if to.y == from.y {
            if to.x > from.x {
                Direction::East
            } else {
                Direction::West
            }
        } else if to.x > from.x {
            if to.y > from.y {
                Direction::SouthEast
            } else {
                Direction::NorthEast
            }
        } else if to.y > from.y {
            Direction::SouthWest
        } else {
            Direction::NorthWest
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Axis-aligned box with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub min: Loc,
    pub max: Loc,
}

impl Aabb {
    pub fn from_center(center: Loc, half: i32) -> Self {
        Self {
            min: Loc::new(center.x - half, center.y - half),
            max: Loc::new(center.x + half, center.y + half),
        }
    }

    pub fn contains(&self, p: Loc) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// The four edges, as segments.
    fn edges(&self) -> [(Loc, Loc); 4] {
        let Loc { x: x0, y: y0 } = self.min;
        let Loc { x: x1, y: y1 } = self.max;
        [
            (Loc::new(x0, y0), Loc::new(x1, y0)),
            (Loc::new(x1, y0), Loc::new(x1, y1)),
            (Loc::new(x1, y1), Loc::new(x0, y1)),
            (Loc::new(x0, y1), Loc::new(x0, y0)),
        ]
    }
}

/// Cross product of (b - a) and (c - a). Widened to i64 so coordinates up
/// to the full i32 range cannot overflow.
fn orient(a: Loc, b: Loc, c: Loc) -> i64 {
    let abx = (b.x - a.x) as i64;
    let aby = (b.y - a.y) as i64;
    let acx = (c.x - a.x) as i64;
    let acy = (c.y - a.y) as i64;
    abx * acy - aby * acx
}

/// Collinear `p` lies within the bounding box of segment `ab`.
fn on_segment(a: Loc, b: Loc, p: Loc) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closed segment intersection test, touching endpoints included.
pub fn segments_intersect(p1: Loc, p2: Loc, q1: Loc, q2: Loc) -> bool {
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);

    if ((d1 > 0 && d2 < 0) || (d1 < 0 && d2 > 0)) && ((d3 > 0 && d4 < 0) || (d3 < 0 && d4 > 0)) {
        return true;
    }

    (d1 == 0 && on_segment(q1, q2, p1))
        || (d2 == 0 && on_segment(q1, q2, p2))
        || (d3 == 0 && on_segment(p1, p2, q1))
        || (d4 == 0 && on_segment(p1, p2, q2))
}

/// Does the segment `a..b` touch the box? Checks all four edges, not just
/// the horizontal or vertical pair, so the answer cannot depend on the
/// direction of travel; a segment entirely inside the box also counts.
pub fn segment_hits_aabb(a: Loc, b: Loc, bb: &Aabb) -> bool {
    if bb.contains(a) || bb.contains(b) {
        return true;
    }
    bb.edges()
        .iter()
        .any(|&(e1, e2)| segments_intersect(a, b, e1, e2))
}
