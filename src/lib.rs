//! A 2d procedural generator based on the overlapping model of the Wave Function Collapse algorithm.
//!
//! Patterns are learned from a sample grid of symbols, then a [`generator::Generator`] fills an output grid so that every pattern window of the output appears in the sample.

/// Defines the [`generator::Generator`], its builder, the patterns extracted from a sample and the rules derived from them
pub mod generator;
/// Defines a [`grid::GridDefinition`] and the data types stored on it
pub mod grid;
/// Compiles placed tiles into a sample grid and draws generated symbols back into tiles
pub mod tiles;

use grid::NodeIndex;

/// Error returned by a [`generator::Generator`] when a generation fails due to a contradiction
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Failed to generate, contradiction at node with index {}", node_index)]
pub struct GeneratorError {
    /// Node index at which the contradiction occurred
    pub node_index: NodeIndex,
}

/// Errors that can occur while extracting the patterns of a sample and building a generator from them
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The sample does not contain any pattern window
    #[error("No pattern could be extracted from the sample")]
    NoPatterns,
    /// The pattern size is 0
    #[error("Invalid pattern size, it must be at least 1")]
    InvalidPatternSize,
    /// The sample buffer does not match the sample dimensions
    #[error("Sample buffer holds {actual} symbols but its dimensions require {expected}")]
    SampleSizeMismatch {
        /// `width * height` of the sample
        expected: usize,
        /// Length of the given buffer
        actual: usize,
    },
    /// The keys used to deduplicate the patterns do not fit in 64 bits
    #[error("{colors} colors with a pattern size of {pattern_size} overflow the 64 bits pattern keys")]
    PatternKeyOverflow {
        /// Number of distinct symbols in the sample, empty symbol included
        colors: usize,
        /// Size of the side of a pattern
        pattern_size: usize,
    },
    /// The output grid has no node
    #[error("Invalid output size {size_x}x{size_y}, both sizes must be at least 1")]
    InvalidOutputSize {
        /// Requested size on the x axis
        size_x: u32,
        /// Requested size on the y axis
        size_y: u32,
    },
    /// A training holds more distinct (tile, rotation) pairs than a sample symbol can index
    #[error("{count} distinct tiles exceed the 255 available sample symbols")]
    TooManyTiles {
        /// Number of distinct (tile, rotation) pairs
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use crate::generator::{builder::GeneratorBuilder, sample::Sample, RngMode};

    #[test]
    fn generate_checkerboard() {
        let sample = Sample::from_rows(&[&[0, 1], &[1, 0]]);
        let mut generator = GeneratorBuilder::new()
            .with_sample(sample)
            .with_pattern_size(2)
            .with_output_size(12, 12)
            .with_periodic_input(true)
            .with_periodic_output(true)
            .with_symmetry(8)
            .with_rng(RngMode::Seeded(1))
            .build()
            .unwrap();
        let grid_data = generator.generate_grid().unwrap();
        for y in 0..12 {
            for x in 0..12 {
                let expected = if (x + y) % 2 == 0 {
                    *grid_data.get_2d(0, 0)
                } else {
                    *grid_data.get_2d(1, 0)
                };
                assert_eq!(*grid_data.get_2d(x, y), expected);
            }
        }
        assert_ne!(grid_data.get_2d(0, 0), grid_data.get_2d(1, 0));
    }
}
