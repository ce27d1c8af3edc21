use std::collections::HashMap;

#[cfg(feature = "debug-traces")]
use tracing::debug;

use crate::{
    generator::{
        sample::{Sample, EMPTY_SYMBOL},
        Generator,
    },
    grid::{GridData, GridDefinition, GridPosition},
    CatalogError,
};

/// Normalizes a rotation expressed in quarter turns to `0..4`
#[inline]
pub fn card(rotation: i32) -> u8 {
    rotation.rem_euclid(4) as u8
}

/// A named tile placed on a [`Training`] area
#[derive(Clone, Debug, PartialEq, Eq)]
struct TilePlacement {
    x: u32,
    y: u32,
    name: String,
    rotation: u8,
}

/// An area of `width * depth` cells on which named tiles are placed by hand, to be compiled into a [`Sample`].
///
/// ### Example
///
/// ```
/// use ghx_overlap_gen::tiles::Training;
///
/// let mut training = Training::new(2, 1);
/// training.place(0, 0, "grass", 0);
/// training.place(1, 0, "road", 1);
/// let compiled = training.compile().unwrap();
/// assert_eq!(compiled.sample().get(1, 0), 2);
/// assert_eq!(compiled.tile(2).unwrap().name, "road");
/// ```
#[derive(Clone, Debug)]
pub struct Training {
    width: u32,
    depth: u32,
    placements: Vec<TilePlacement>,
}

impl Training {
    /// Creates an empty training area
    pub fn new(width: u32, depth: u32) -> Self {
        Self {
            width,
            depth,
            placements: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Places the tile `name`, rotated by `rotation` quarter turns, at `(x, y)`.
    ///
    /// Placements outside of the area are ignored and `false` is returned. A later placement on the same cell replaces the previous one.
    pub fn place(&mut self, x: i64, y: i64, name: impl Into<String>, rotation: i32) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.depth) {
            return false;
        }
        self.placements.push(TilePlacement {
            x: x as u32,
            y: y as u32,
            name: name.into(),
            rotation: card(rotation),
        });
        true
    }

    /// Compiles the placed tiles into a [`CompiledSample`].
    ///
    /// Each distinct (name, rotation) pair gets the next symbol, in placement order, starting at `1`. Cells without a tile keep the [`EMPTY_SYMBOL`].
    pub fn compile(&self) -> Result<CompiledSample, CatalogError> {
        let mut symbols: HashMap<(&str, u8), u8> = HashMap::new();
        let mut tiles = vec![None];
        let mut data = vec![EMPTY_SYMBOL; self.width as usize * self.depth as usize];
        for placement in &self.placements {
            let key = (placement.name.as_str(), placement.rotation);
            let symbol = match symbols.get(&key) {
                Some(&symbol) => symbol,
                None => {
                    let symbol =
                        u8::try_from(tiles.len()).map_err(|_| CatalogError::TooManyTiles {
                            count: tiles.len(),
                        })?;
                    symbols.insert(key, symbol);
                    tiles.push(Some(TileEntry {
                        name: placement.name.clone(),
                        rotation: placement.rotation,
                    }));
                    symbol
                }
            };
            data[placement.x as usize + placement.y as usize * self.width as usize] = symbol;
        }

        #[cfg(feature = "debug-traces")]
        debug!(
            "Compiled training of {}x{} with {} distinct tiles",
            self.width,
            self.depth,
            tiles.len() - 1
        );

        Ok(CompiledSample {
            sample: Sample::new(self.width as usize, self.depth as usize, data)?,
            tiles,
        })
    }
}

/// A tile and its rotation, referenced by a symbol of a [`CompiledSample`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileEntry {
    /// Name of the tile
    pub name: String,
    /// Rotation in quarter turns, in `0..4`
    pub rotation: u8,
}

/// The [`Sample`] compiled from a [`Training`], with the table of the tiles behind its symbols
#[derive(Clone, Debug)]
pub struct CompiledSample {
    sample: Sample,
    /// `tiles[symbol]`, `None` for the [`EMPTY_SYMBOL`]
    tiles: Vec<Option<TileEntry>>,
}

impl CompiledSample {
    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    /// Returns the table of tiles indexed by symbol
    pub fn tiles(&self) -> &[Option<TileEntry>] {
        &self.tiles
    }

    /// Returns the tile behind `symbol`, `None` for the empty symbol and unknown symbols
    pub fn tile(&self, symbol: u8) -> Option<&TileEntry> {
        self.tiles.get(symbol as usize).and_then(Option::as_ref)
    }

    /// Returns `true` if a cell of the sample is empty. The last row and column are not checked.
    pub fn has_whitespace(&self) -> bool {
        let (width, height) = (self.sample.width(), self.sample.height());
        (0..height.saturating_sub(1))
            .any(|y| (0..width.saturating_sub(1)).any(|x| self.sample.get(x, y) == EMPTY_SYMBOL))
    }
}

/// A tile drawn on the output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileInstance {
    /// Symbol of the tile in the [`CompiledSample`]
    pub symbol: u8,
    /// Rotation of the tile, in quarter turns
    pub rotation: u8,
    /// Position of the tile in the output
    pub position: GridPosition,
}

/// Draws the cells of a [`Generator`] output as tiles, as soon as they are determined.
///
/// Meant to be used alongside incremental runs: call [`Generator::run`] with a limit then [`TileDrawer::draw`], until [`TileDrawer::undrawn`] is `false`.
pub struct TileDrawer {
    rendering: GridData<Option<TileInstance>>,
    undrawn: bool,
}

impl TileDrawer {
    /// Creates a drawer for an output of `grid` size
    pub fn new(grid: &GridDefinition) -> Self {
        Self {
            rendering: grid.new_grid_data(None),
            undrawn: true,
        }
    }

    /// Returns the tiles drawn so far
    pub fn rendering(&self) -> &GridData<Option<TileInstance>> {
        &self.rendering
    }

    /// Returns `true` while some cells could not be drawn yet
    pub fn undrawn(&self) -> bool {
        self.undrawn
    }

    /// Removes all the drawn tiles
    pub fn clear(&mut self) {
        self.rendering.reset(None);
        self.undrawn = true;
    }

    /// Draws every cell not drawn yet whose symbol is determined by `generator`, margin of a non-periodic output included. See [`Generator::sample_covered`].
    ///
    /// Determined cells holding the empty symbol stay empty. Returns the number of newly drawn tiles.
    pub fn draw(&mut self, generator: &Generator, tiles: &CompiledSample) -> usize {
        self.undrawn = false;
        let mut drawn = 0;
        let (size_x, size_y) = (self.rendering.grid().size_x(), self.rendering.grid().size_y());
        for y in 0..size_y {
            for x in 0..size_x {
                if self.rendering.get_2d(x, y).is_some() {
                    continue;
                }
                match generator.sample_covered(x, y) {
                    Some(symbol) => {
                        if let Some(tile) = tiles.tile(symbol) {
                            *self.rendering.get_2d_mut(x, y) = Some(TileInstance {
                                symbol,
                                rotation: tile.rotation,
                                position: GridPosition::new(x, y),
                            });
                            drawn += 1;
                        }
                    }
                    None => self.undrawn = true,
                }
            }
        }
        drawn
    }
}
