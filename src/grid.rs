use std::{fmt, ops::Range};

use self::direction::{Direction, GridDelta};

/// Defines directions and deltas of the 2d cartesian grid
pub mod direction;

/// Index of a Node
pub type NodeIndex = usize;

/// Represents a position in a grid in a practical format
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridPosition {
    /// Position on the x axis
    pub x: u32,
    /// Position on the y axis
    pub y: u32,
}

impl GridPosition {
    pub fn new(x: u32, y: u32) -> GridPosition {
        Self { x, y }
    }

    /// Returns the (possibly out of grid) signed coordinates reached by applying `delta`
    #[inline]
    pub fn get_delta_position(&self, delta: &GridDelta) -> (i64, i64) {
        (
            i64::from(self.x) + i64::from(delta.dx),
            i64::from(self.y) + i64::from(delta.dy),
        )
    }
}

/// Size and looping behaviour of a 2d grid. Nodes are stored row by row: `index = x + y * size_x`.
#[derive(Clone, Debug)]
pub struct GridDefinition {
    size_x: u32,
    size_y: u32,
    looping: bool,
}

impl fmt::Display for GridDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "( size: {} {}, looping: {} )",
            self.size_x, self.size_y, self.looping
        )
    }
}

impl GridDefinition {
    /// Creates a new [`GridDefinition`]
    ///
    /// Use `looping` to specify if the coordinates should loop when reaching the end of an axis.
    pub fn new_cartesian_2d(size_x: u32, size_y: u32, looping: bool) -> GridDefinition {
        Self {
            size_x,
            size_y,
            looping,
        }
    }

    /// Returns the size of the grid in the X axis.
    pub fn size_x(&self) -> u32 {
        self.size_x
    }

    /// Returns the size of the grid in the Y axis.
    pub fn size_y(&self) -> u32 {
        self.size_y
    }

    /// Returns whether the coordinates wrap around the grid edges
    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Returns the total size of the grid
    pub fn total_size(&self) -> usize {
        self.size_x as usize * self.size_y as usize
    }

    /// Returns a [`Range`] over all node indexes in this grid
    pub fn indexes(&self) -> Range<NodeIndex> {
        0..self.total_size()
    }

    /// Returns the index from a grid position.
    ///
    /// NO CHECK is done to verify that the given position is a valid position for this grid.
    #[inline]
    pub fn get_index(&self, x: u32, y: u32) -> NodeIndex {
        x as usize + y as usize * self.size_x as usize
    }

    /// Returns the index from a grid position.
    ///
    /// NO CHECK is done to verify that the given position is a valid position for this grid.
    #[inline]
    pub fn get_index_from_pos(&self, grid_position: &GridPosition) -> NodeIndex {
        self.get_index(grid_position.x, grid_position.y)
    }

    /// Returns a [`GridPosition`] from the index of a node in this [`GridDefinition`].
    #[inline]
    pub fn get_position(&self, grid_index: NodeIndex) -> GridPosition {
        let size_x = self.size_x as usize;
        GridPosition {
            x: (grid_index % size_x) as u32,
            y: (grid_index / size_x) as u32,
        }
    }

    /// Returns whether `(x, y)` lies inside the grid
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.size_x) && y < i64::from(self.size_y)
    }

    /// Returns the next position in the grid when moving `delta` from `grid_position`, wrapping around the edges if the grid is looping.
    ///
    /// Returns `None` if the destination is not in the grid.
    pub fn get_next_pos(
        &self,
        grid_position: &GridPosition,
        delta: &GridDelta,
    ) -> Option<GridPosition> {
        let (x, y) = grid_position.get_delta_position(delta);
        match self.looping {
            true => Some(GridPosition {
                x: x.rem_euclid(i64::from(self.size_x)) as u32,
                y: y.rem_euclid(i64::from(self.size_y)) as u32,
            }),
            false => match self.contains(x, y) {
                true => Some(GridPosition {
                    x: x as u32,
                    y: y as u32,
                }),
                false => None,
            },
        }
    }

    /// Returns the index of the next position in the grid when moving 1 unit in `direction` from `grid_position`.
    ///
    /// Returns `None` if the destination is not in the grid.
    pub fn get_next_index(
        &self,
        grid_position: &GridPosition,
        direction: Direction,
    ) -> Option<NodeIndex> {
        self.get_next_pos(grid_position, direction.delta())
            .map(|next_pos| self.get_index_from_pos(&next_pos))
    }

    /// Creates a [`GridData`] with the size of the [`GridDefinition`] with each element value being a copy of the given one.
    pub fn new_grid_data<D: Clone>(&self, element: D) -> GridData<D> {
        GridData {
            grid: self.clone(),
            data: vec![element; self.total_size()],
        }
    }
}

/// Holds a [`GridDefinition`] and generic data in a linear buffer that can be accessed through the grid definition to represent the grid content.
/// ### Example
///
/// ```
/// use ghx_overlap_gen::grid::GridDefinition;
///
/// let grid = GridDefinition::new_cartesian_2d(10, 10, false);
/// let mut grid_data = grid.new_grid_data::<Option<u8>>(None);
/// grid_data.set(grid.get_index(2, 3), Some(7));
/// assert_eq!(*grid_data.get_2d(2, 3), Some(7));
/// ```
#[derive(Clone, Debug)]
pub struct GridData<D> {
    grid: GridDefinition,
    data: Vec<D>,
}

impl<D> GridData<D> {
    /// Prefer using `new_grid_data` directly on an existing grid definition to create a `GridData` with a correct data Vec.
    pub fn new(grid: GridDefinition, data: Vec<D>) -> Self {
        Self { grid, data }
    }

    /// Returns a reference to the `GridDefinition` this is based on
    pub fn grid(&self) -> &GridDefinition {
        &self.grid
    }

    /// Sets the value of the element at `index` in the grid.
    ///
    /// NO CHECK is done to verify that the given index is a valid index for this grid.
    pub fn set(&mut self, index: NodeIndex, value: D) {
        self.data[index] = value;
    }

    /// Returns a reference to the element at this index.
    ///
    /// NO CHECK is done to verify that the given index is a valid index for this grid.
    pub fn get(&self, index: NodeIndex) -> &D {
        &self.data[index]
    }

    /// Returns a reference to the element at this position.
    ///
    /// NO CHECK is done to verify that the given position is a valid position for this grid.
    pub fn get_2d(&self, x: u32, y: u32) -> &D {
        &self.data[self.grid.get_index(x, y)]
    }

    /// Returns a mutable reference to the data at this position.
    ///
    /// NO CHECK is done to verify that the given position is a valid position for this grid.
    pub fn get_2d_mut(&mut self, x: u32, y: u32) -> &mut D {
        let index = self.grid.get_index(x, y);
        &mut self.data[index]
    }

    /// Returns a reference to the undelying data buffer.
    pub fn nodes(&self) -> &Vec<D> {
        &self.data
    }
}

impl<D: Copy> GridData<D> {
    /// Resets the whole grid buffer by setting the value of each element to `value`
    pub fn reset(&mut self, value: D) {
        for d in self.data.iter_mut() {
            *d = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{direction::Direction, GridDefinition, GridPosition};

    #[test]
    fn index_and_position_are_inverse() {
        let grid = GridDefinition::new_cartesian_2d(5, 3, false);
        for index in grid.indexes() {
            let pos = grid.get_position(index);
            assert_eq!(grid.get_index_from_pos(&pos), index);
        }
        assert_eq!(grid.get_index(4, 2), 14);
    }

    #[test]
    fn next_index_stops_at_edges_when_not_looping() {
        let grid = GridDefinition::new_cartesian_2d(4, 4, false);
        let corner = GridPosition::new(0, 0);
        assert_eq!(grid.get_next_index(&corner, Direction::XBackward), None);
        assert_eq!(grid.get_next_index(&corner, Direction::YBackward), None);
        assert_eq!(grid.get_next_index(&corner, Direction::XForward), Some(1));
        assert_eq!(grid.get_next_index(&corner, Direction::YForward), Some(4));
    }

    #[test]
    fn next_index_wraps_when_looping() {
        let grid = GridDefinition::new_cartesian_2d(4, 3, true);
        let corner = GridPosition::new(0, 0);
        assert_eq!(grid.get_next_index(&corner, Direction::XBackward), Some(3));
        assert_eq!(grid.get_next_index(&corner, Direction::YBackward), Some(8));
        let far = GridPosition::new(3, 2);
        assert_eq!(grid.get_next_index(&far, Direction::XForward), Some(8));
        assert_eq!(grid.get_next_index(&far, Direction::YForward), Some(3));
    }
}
