/// Cardinal directions of a 2d cartesian grid.
///
/// The discriminants are used as indexes in the per-direction arrays of the generator, in the `left, up, right, down` order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Towards negative x
    XBackward = 0,
    /// Towards positive y
    YForward = 1,
    /// Towards positive x
    XForward = 2,
    /// Towards negative y
    YBackward = 3,
}

impl Direction {
    /// Returns the opposite [`Direction`]
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::XBackward => Direction::XForward,
            Direction::YForward => Direction::YBackward,
            Direction::XForward => Direction::XBackward,
            Direction::YBackward => Direction::YForward,
        }
    }

    /// Returns the unit [`GridDelta`] of a move in this direction
    #[inline]
    pub fn delta(&self) -> &'static GridDelta {
        &CARTESIAN_2D_DELTAS[*self as usize]
    }
}

/// Number of directions in a 2d cartesian grid
pub const DIRECTIONS_COUNT: usize = 4;

/// All the directions of a 2d cartesian grid, ordered by their index
pub const CARTESIAN_2D_DIRECTIONS: &'static [Direction] = &[
    Direction::XBackward,
    Direction::YForward,
    Direction::XForward,
    Direction::YBackward,
];

/// A displacement on the grid
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GridDelta {
    pub(crate) dx: i32,
    pub(crate) dy: i32,
}

impl GridDelta {
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn dx(&self) -> i32 {
        self.dx
    }

    pub fn dy(&self) -> i32 {
        self.dy
    }
}

pub const CARTESIAN_2D_DELTAS: &'static [GridDelta] = &[
    GridDelta {
        // XBackward
        dx: -1,
        dy: 0,
    },
    GridDelta {
        // YForward
        dx: 0,
        dy: 1,
    },
    GridDelta {
        // XForward
        dx: 1,
        dy: 0,
    },
    GridDelta {
        // YBackward
        dx: 0,
        dy: -1,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_directions_cancel_out() {
        for &dir in CARTESIAN_2D_DIRECTIONS {
            let (a, b) = (dir.delta(), dir.opposite().delta());
            assert_eq!(a.dx + b.dx, 0);
            assert_eq!(a.dy + b.dy, 0);
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn directions_are_ordered_by_index() {
        for (index, &dir) in CARTESIAN_2D_DIRECTIONS.iter().enumerate() {
            assert_eq!(dir as usize, index);
        }
        assert_eq!(CARTESIAN_2D_DIRECTIONS.len(), DIRECTIONS_COUNT);
    }
}
