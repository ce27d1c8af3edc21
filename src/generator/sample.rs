use crate::CatalogError;

/// Symbol value reserved for empty cells of a sample
pub const EMPTY_SYMBOL: u8 = 0;

/// A 2d grid of symbols used as the input of the pattern extraction.
///
/// Symbols are stored row by row: `data[x + y * width]`. The symbol [`EMPTY_SYMBOL`] stands for "no value".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Sample {
    /// Creates a new sample from a row-major buffer of symbols.
    ///
    /// Returns [`CatalogError::SampleSizeMismatch`] if `data` does not hold exactly `width * height` symbols.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, CatalogError> {
        if data.len() != width * height {
            return Err(CatalogError::SampleSizeMismatch {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a sample from rows of symbols, `rows[y][x]`. Rows shorter than the first one are padded with [`EMPTY_SYMBOL`].
    ///
    /// ### Example
    ///
    /// ```
    /// use ghx_overlap_gen::generator::sample::Sample;
    ///
    /// let sample = Sample::from_rows(&[&[0, 1], &[1, 0]]);
    /// assert_eq!(sample.get(1, 0), 1);
    /// ```
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        let height = rows.len();
        let mut data = vec![EMPTY_SYMBOL; width * height];
        for (y, row) in rows.iter().enumerate() {
            for (x, &symbol) in row.as_ref().iter().take(width).enumerate() {
                data[x + y * width] = symbol;
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the symbol at `(x, y)`. Panics if the position is outside of the sample.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[x + y * self.width]
    }

    /// Returns the symbol at `(x, y)`, wrapping the coordinates around the sample edges
    #[inline]
    pub fn get_wrapped(&self, x: usize, y: usize) -> u8 {
        self.get(x % self.width, y % self.height)
    }

    /// Returns the distinct symbols of the sample in order of first appearance, [`EMPTY_SYMBOL`] always being the first one.
    pub fn palette(&self) -> Vec<u8> {
        let mut colors = vec![EMPTY_SYMBOL];
        for &symbol in &self.data {
            if !colors.contains(&symbol) {
                colors.push(symbol);
            }
        }
        colors
    }
}

#[cfg(test)]
mod tests {
    use super::Sample;
    use crate::CatalogError;

    #[test]
    fn palette_keeps_first_appearance_order() {
        let sample = Sample::from_rows(&[&[7, 3, 7], &[0, 9, 3]]);
        assert_eq!(sample.palette(), vec![0, 7, 3, 9]);
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        assert_eq!(
            Sample::new(3, 2, vec![1; 5]),
            Err(CatalogError::SampleSizeMismatch {
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn wrapped_access() {
        let sample = Sample::from_rows(&[&[1, 2], &[3, 4]]);
        assert_eq!(sample.get_wrapped(2, 3), 3);
    }
}
