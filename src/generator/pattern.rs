use std::collections::HashMap;

#[cfg(feature = "debug-traces")]
use tracing::debug;

use crate::CatalogError;

use super::sample::Sample;

/// Index of a pattern in a [`PatternCatalog`]
pub type PatternIndex = usize;

/// Maximum number of symmetry variants of a pattern: 4 rotations and their reflections
pub const MAX_SYMMETRY: usize = 8;

/// A `N*N` window of a sample, one of the collapse units of a generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    /// Palette indexes of the pixels, row by row
    pixels: Vec<u8>,
    /// Number of occurrences of this pattern in the sample, symmetry variants included
    weight: f64,
}

impl Pattern {
    /// Palette indexes of the pixels, row by row
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// Patterns learned from a [`Sample`], deduplicated, with their weights.
///
/// ### Example
///
/// ```
/// use ghx_overlap_gen::generator::{pattern::PatternCatalog, sample::Sample};
///
/// let sample = Sample::from_rows(&[&[0, 1], &[1, 0]]);
/// let catalog = PatternCatalog::new(&sample, 2, true, 8).unwrap();
/// assert_eq!(catalog.patterns_count(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct PatternCatalog {
    pattern_size: usize,
    /// Symbols of the sample. Pattern pixels are indexes in this palette.
    palette: Vec<u8>,
    patterns: Vec<Pattern>,
}

impl PatternCatalog {
    /// Extracts all the `pattern_size * pattern_size` windows of `sample`, expanded by up to `symmetry` rotations/reflections (clamped to `1..=8`).
    ///
    /// When `periodic_input` is true, windows wrap around the sample edges.
    pub fn new(
        sample: &Sample,
        pattern_size: usize,
        periodic_input: bool,
        symmetry: usize,
    ) -> Result<Self, CatalogError> {
        if pattern_size == 0 {
            return Err(CatalogError::InvalidPatternSize);
        }
        let symmetry = symmetry.clamp(1, MAX_SYMMETRY);
        let palette = sample.palette();
        let colors = palette.len();
        let pixels_count = pattern_size * pattern_size;
        // Pattern keys are integers written in base `colors`, with `pixels_count` digits.
        let key_overflow = CatalogError::PatternKeyOverflow {
            colors,
            pattern_size,
        };
        let exponent = u32::try_from(pixels_count).map_err(|_| key_overflow.clone())?;
        (colors as u64)
            .checked_pow(exponent)
            .ok_or(key_overflow)?;

        let mut color_indexes = [0u8; 256];
        for (index, &symbol) in palette.iter().enumerate() {
            color_indexes[symbol as usize] = index as u8;
        }

        let (origins_x, origins_y) = match periodic_input {
            true => (sample.width(), sample.height()),
            false => (
                (sample.width() + 1).saturating_sub(pattern_size),
                (sample.height() + 1).saturating_sub(pattern_size),
            ),
        };
        if sample.width() == 0 || sample.height() == 0 {
            return Err(CatalogError::NoPatterns);
        }

        // Insertion-ordered deduplication: `weights[ordering[key]]` is the count of pattern `key`
        let mut ordering: HashMap<u64, usize> = HashMap::new();
        let mut keys = Vec::new();
        let mut weights: Vec<u32> = Vec::new();
        for y in 0..origins_y {
            for x in 0..origins_x {
                let window = build_pattern(pattern_size, |dx, dy| {
                    color_indexes[sample.get_wrapped(x + dx, y + dy) as usize]
                });
                for variant in symmetry_variants(window, pattern_size)
                    .iter()
                    .take(symmetry)
                {
                    let key = pattern_key(variant, colors as u64);
                    match ordering.get(&key) {
                        Some(&index) => weights[index] += 1,
                        None => {
                            ordering.insert(key, keys.len());
                            keys.push(key);
                            weights.push(1);
                        }
                    }
                }
            }
        }

        if keys.is_empty() {
            return Err(CatalogError::NoPatterns);
        }

        let patterns: Vec<Pattern> = keys
            .iter()
            .zip(weights)
            .map(|(&key, weight)| Pattern {
                pixels: pattern_from_key(key, colors as u64, pixels_count),
                weight: f64::from(weight),
            })
            .collect();

        #[cfg(feature = "debug-traces")]
        debug!(
            "Extracted {} patterns of size {} from a {}x{} sample with {} colors",
            patterns.len(),
            pattern_size,
            sample.width(),
            sample.height(),
            colors
        );

        Ok(Self {
            pattern_size,
            palette,
            patterns,
        })
    }

    /// Size `N` of the side of the patterns
    #[inline]
    pub fn pattern_size(&self) -> usize {
        self.pattern_size
    }

    /// Number `T` of distinct patterns
    #[inline]
    pub fn patterns_count(&self) -> usize {
        self.patterns.len()
    }

    /// Distinct symbols of the sample, in order of first appearance
    pub fn palette(&self) -> &[u8] {
        &self.palette
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    #[inline]
    pub fn pattern(&self, index: PatternIndex) -> &Pattern {
        &self.patterns[index]
    }

    #[inline]
    pub fn weight(&self, index: PatternIndex) -> f64 {
        self.patterns[index].weight
    }

    /// Returns the sample symbol of the pixel `(x, y)` of pattern `index`
    #[inline]
    pub fn symbol(&self, index: PatternIndex, x: usize, y: usize) -> u8 {
        self.palette[self.patterns[index].pixels[x + y * self.pattern_size] as usize]
    }
}

fn build_pattern<F: Fn(usize, usize) -> u8>(size: usize, f: F) -> Vec<u8> {
    let mut result = vec![0; size * size];
    for y in 0..size {
        for x in 0..size {
            result[x + y * size] = f(x, y);
        }
    }
    result
}

/// Quarter turn
pub(crate) fn rotate(pattern: &[u8], size: usize) -> Vec<u8> {
    build_pattern(size, |x, y| pattern[size - 1 - y + x * size])
}

/// Mirror along the vertical axis
pub(crate) fn reflect(pattern: &[u8], size: usize) -> Vec<u8> {
    build_pattern(size, |x, y| pattern[size - 1 - x + y * size])
}

/// The 8 variants of `pattern` in a fixed order: each rotation followed by its reflection.
fn symmetry_variants(pattern: Vec<u8>, size: usize) -> [Vec<u8>; MAX_SYMMETRY] {
    let reflected = reflect(&pattern, size);
    let rot_90 = rotate(&pattern, size);
    let rot_90_reflected = reflect(&rot_90, size);
    let rot_180 = rotate(&rot_90, size);
    let rot_180_reflected = reflect(&rot_180, size);
    let rot_270 = rotate(&rot_180, size);
    let rot_270_reflected = reflect(&rot_270, size);
    [
        pattern,
        reflected,
        rot_90,
        rot_90_reflected,
        rot_180,
        rot_180_reflected,
        rot_270,
        rot_270_reflected,
    ]
}

/// Encodes the palette indexes of a pattern as a base `colors` integer, first pixel being the most significant digit.
///
/// The caller guarantees that `colors ^ pattern.len()` fits in a `u64`.
pub(crate) fn pattern_key(pattern: &[u8], colors: u64) -> u64 {
    pattern
        .iter()
        .fold(0, |key, &digit| key * colors + u64::from(digit))
}

pub(crate) fn pattern_from_key(key: u64, colors: u64, pixels_count: usize) -> Vec<u8> {
    let mut residue = key;
    let mut pixels = vec![0; pixels_count];
    for pixel in pixels.iter_mut().rev() {
        *pixel = (residue % colors) as u8;
        residue /= colors;
    }
    pixels
}
