use ndarray::{Array, Ix2};

#[cfg(feature = "debug-traces")]
use tracing::trace;

use crate::grid::direction::{Direction, CARTESIAN_2D_DIRECTIONS, DIRECTIONS_COUNT};

use super::pattern::{PatternCatalog, PatternIndex};

/// Defines the rules of a generation: the patterns learned from a sample and which patterns may be adjacent to each other.
///
/// A same set of [`Rules`] can be shared by multiple generators.
#[derive(Debug)]
pub struct Rules {
    catalog: PatternCatalog,
    /// `weight * ln(weight)` for each pattern
    weight_log_weights: Vec<f64>,
    /// The vector `allowed_neighbours[pattern_index][direction]` holds all the patterns (indexes) that may be placed next to `pattern_index` in `direction`.
    ///
    /// Note: this cannot be a simple 3d array since the third dimension is different for each element.
    allowed_neighbours: Array<Vec<PatternIndex>, Ix2>,
}

impl Rules {
    /// Builds the adjacency rules of the patterns of `catalog`.
    ///
    /// Two patterns may be adjacent in a direction when they agree on every pixel of their overlap once shifted by one unit in that direction.
    pub fn new(catalog: PatternCatalog) -> Rules {
        let patterns_count = catalog.patterns_count();
        let size = catalog.pattern_size();

        let mut allowed_neighbours =
            Array::from_elem((patterns_count, DIRECTIONS_COUNT), Vec::new());
        for &direction in CARTESIAN_2D_DIRECTIONS {
            for pattern in 0..patterns_count {
                let pixels = catalog.pattern(pattern).pixels();
                for other in 0..patterns_count {
                    if agrees(pixels, catalog.pattern(other).pixels(), size, direction) {
                        allowed_neighbours[(pattern, direction as usize)].push(other);
                    }
                }
            }
        }

        let weight_log_weights = catalog
            .patterns()
            .iter()
            .map(|pattern| pattern.weight() * f64::ln(pattern.weight()))
            .collect();

        #[cfg(feature = "debug-traces")]
        trace!(
            "Successfully built rules, allowed_neighbours: {:?}",
            allowed_neighbours
        );

        Rules {
            catalog,
            weight_log_weights,
            allowed_neighbours,
        }
    }

    /// Returns the patterns that may be placed next to `pattern` in `direction`
    #[inline]
    pub fn allowed_patterns(&self, pattern: PatternIndex, direction: Direction) -> &Vec<PatternIndex> {
        &self.allowed_neighbours[(pattern, direction as usize)]
    }

    #[inline]
    pub(crate) fn weight(&self, pattern: PatternIndex) -> f64 {
        self.catalog.weight(pattern)
    }

    #[inline]
    pub(crate) fn weight_log_weight(&self, pattern: PatternIndex) -> f64 {
        self.weight_log_weights[pattern]
    }

    /// Returns the number of patterns present in the rules
    #[inline]
    pub fn patterns_count(&self) -> usize {
        self.catalog.patterns_count()
    }

    /// Returns the [`PatternCatalog`] the rules were built from
    #[inline]
    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }
}

/// Whether `second`, shifted by one unit in `direction` relative to `first`, agrees with `first` on their overlap
fn agrees(first: &[u8], second: &[u8], size: usize, direction: Direction) -> bool {
    let delta = direction.delta();
    let (dx, dy) = (delta.dx() as i64, delta.dy() as i64);
    let n = size as i64;
    let (x_min, x_max) = if dx < 0 { (0, dx + n) } else { (dx, n) };
    let (y_min, y_max) = if dy < 0 { (0, dy + n) } else { (dy, n) };
    for y in y_min..y_max {
        for x in x_min..x_max {
            if first[(x + n * y) as usize] != second[(x - dx + n * (y - dy)) as usize] {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::sample::Sample;

    fn rules_from_rows(rows: &[&[u8]], size: usize, periodic: bool, symmetry: usize) -> Rules {
        let sample = Sample::from_rows(rows);
        Rules::new(PatternCatalog::new(&sample, size, periodic, symmetry).unwrap())
    }

    #[test]
    fn horizontal_overlap() {
        // 2x2 patterns: [a b / c d]
        let left = [1, 2, 3, 4];
        let right = [2, 5, 4, 6];
        assert!(agrees(&left, &right, 2, Direction::XForward));
        assert!(!agrees(&left, &right, 2, Direction::XBackward));
        assert!(agrees(&right, &left, 2, Direction::XBackward));
    }

    #[test]
    fn vertical_overlap() {
        // y grows upwards: the top row of `bottom` is the bottom row of `top`
        let bottom = [1, 2, 3, 4];
        let top = [3, 4, 7, 8];
        assert!(agrees(&bottom, &top, 2, Direction::YForward));
        assert!(agrees(&top, &bottom, 2, Direction::YBackward));
        assert!(!agrees(&bottom, &top, 2, Direction::YBackward));
    }

    #[test]
    fn single_pixel_patterns_agree_with_everything() {
        let rules = rules_from_rows(&[&[1, 2], &[3, 4]], 1, true, 1);
        for pattern in 0..rules.patterns_count() {
            for &dir in CARTESIAN_2D_DIRECTIONS {
                assert_eq!(rules.allowed_patterns(pattern, dir).len(), 4);
            }
        }
    }

    #[test]
    fn adjacency_is_symmetric() {
        let rules = rules_from_rows(&[&[1, 1, 2, 0], &[0, 2, 2, 1], &[1, 0, 0, 2]], 2, true, 8);
        for pattern in 0..rules.patterns_count() {
            for &dir in CARTESIAN_2D_DIRECTIONS {
                for &other in rules.allowed_patterns(pattern, dir) {
                    assert!(rules.allowed_patterns(other, dir.opposite()).contains(&pattern));
                }
            }
        }
    }

    #[test]
    fn checkerboard_patterns_alternate() {
        let rules = rules_from_rows(&[&[0, 1], &[1, 0]], 2, true, 8);
        assert_eq!(rules.patterns_count(), 2);
        for pattern in 0..2 {
            for &dir in CARTESIAN_2D_DIRECTIONS {
                assert_eq!(rules.allowed_patterns(pattern, dir), &vec![1 - pattern]);
            }
        }
    }
}
