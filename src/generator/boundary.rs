use crate::grid::{direction::Direction, GridDefinition, GridPosition, NodeIndex};

/// Decides which nodes of the output can be observed and how neighbours are reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Non-periodic output. A pattern placed on a node covers `pattern_size` nodes in x and y, so nodes closer than `pattern_size` to the right or top edge cannot hold a full pattern and are never observed.
    Bounded {
        /// Size of the side of a pattern
        pattern_size: usize,
    },
    /// Periodic output: neighbour coordinates wrap around the grid edges and every node is observed.
    Wrapped,
}

impl BoundaryPolicy {
    pub fn new(pattern_size: usize, periodic_output: bool) -> Self {
        match periodic_output {
            true => BoundaryPolicy::Wrapped,
            false => BoundaryPolicy::Bounded { pattern_size },
        }
    }

    /// Returns `true` if the possibly out of grid position `(x, y)` is excluded from observation and propagation
    #[inline]
    pub fn is_excluded(&self, grid: &GridDefinition, x: i64, y: i64) -> bool {
        match self {
            BoundaryPolicy::Wrapped => false,
            BoundaryPolicy::Bounded { pattern_size } => {
                let n = *pattern_size as i64;
                x < 0
                    || y < 0
                    || x + n > i64::from(grid.size_x())
                    || y + n > i64::from(grid.size_y())
            }
        }
    }

    /// Returns `true` if the node at `node_index` can be selected for observation
    #[inline]
    pub fn is_observable(&self, grid: &GridDefinition, node_index: NodeIndex) -> bool {
        let pos = grid.get_position(node_index);
        !self.is_excluded(grid, i64::from(pos.x), i64::from(pos.y))
    }

    /// Returns the index of the neighbour of `position` in `direction`, or `None` if that neighbour is excluded.
    #[inline]
    pub fn neighbour(
        &self,
        grid: &GridDefinition,
        position: &GridPosition,
        direction: Direction,
    ) -> Option<NodeIndex> {
        let (x, y) = position.get_delta_position(direction.delta());
        if self.is_excluded(grid, x, y) {
            return None;
        }
        // Wrapped outputs have a looping grid, non excluded bounded neighbours are inside the grid.
        grid.get_next_index(position, direction)
    }

    /// Returns the observable node whose pattern covers the node at `(x, y)`, and the offset of `(x, y)` inside that pattern.
    ///
    /// Observable nodes cover themselves with an offset of `(0, 0)`. Nodes of the bounded margin are covered by the last observable node of their row/column.
    pub fn covering_node(&self, grid: &GridDefinition, x: u32, y: u32) -> (NodeIndex, u32, u32) {
        match self {
            BoundaryPolicy::Wrapped => (grid.get_index(x, y), 0, 0),
            BoundaryPolicy::Bounded { pattern_size } => {
                let n = *pattern_size as u32;
                let last_x = grid.size_x().saturating_sub(n);
                let last_y = grid.size_y().saturating_sub(n);
                let (cover_x, cover_y) = (x.min(last_x), y.min(last_y));
                (grid.get_index(cover_x, cover_y), x - cover_x, y - cover_y)
            }
        }
    }
}
