// grid.rs — Row-major width × height matrix of `Value`s.
//
// The same type carries the parsed input and every engine's output. Unlike an
// image with alignment padding, a Grid is always tightly packed: element
// (x, y) lives at `y * width + x` and `data.len() == width * height`. Any
// device-side row padding is a transfer concern handled in gpu/surface.rs.
//
// Memory layout (width = 4, height = 3):
//
//   data index:  0  1  2  3   4  5  6  7   8  9 10 11
//   cell:        ■  ■  ■  ■   ■  ■  ■  ■   ■  ■  ■  ■
//   row:         |-- row 0 -| |-- row 1 -| |-- row 2 -|
//
// A Grid is either fully populated or empty (0 × 0). Constructors panic on a
// length mismatch: that is a programming error, not a runtime condition.

use std::fmt;

use crate::value::Value;

/// A fully populated 2D grid of values, stored row-major without padding.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Grid {
    data: Vec<Value>,
    width: usize,
    height: usize,
}

impl Grid {
    // --- Constructors ---

    /// Create a zero-filled grid.
    ///
    /// A zero width or height yields the empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        if width == 0 || height == 0 {
            return Self::empty();
        }
        Grid {
            data: vec![0; width * height],
            width,
            height,
        }
    }

    /// The empty grid (0 × 0, no data).
    pub fn empty() -> Self {
        Grid::default()
    }

    /// Create a grid filled with a single value.
    pub fn filled(width: usize, height: usize, value: Value) -> Self {
        let mut grid = Self::new(width, height);
        grid.data.fill(value);
        grid
    }

    /// Create a grid from row-major data.
    ///
    /// # Panics
    /// Panics if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<Value>) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "data length ({}) must equal width * height ({})",
            data.len(),
            width * height,
        );
        if data.is_empty() {
            return Self::empty();
        }
        Grid { data, width, height }
    }

    /// Create a grid from a slice of equally long rows.
    ///
    /// # Panics
    /// Panics if the rows differ in length.
    pub fn from_rows<R: AsRef<[Value]>>(rows: &[R]) -> Self {
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            assert_eq!(row.len(), width, "row {y} has {} values, expected {width}", row.len());
            data.extend_from_slice(row);
        }
        Self::from_vec(width, rows.len(), data)
    }

    // --- Accessors ---

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells (`width * height`).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `other` has the same width and height.
    #[inline]
    pub fn same_shape(&self, other: &Grid) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Get the value at (x, y). x is column, y is row.
    ///
    /// # Panics
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Value {
        self.bounds_check(x, y);
        self.data[y * self.width + x]
    }

    /// Set the value at (x, y).
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: Value) {
        self.bounds_check(x, y);
        self.data[y * self.width + x] = value;
    }

    /// Borrow a single row as a slice.
    #[inline]
    pub fn row(&self, y: usize) -> &[Value] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Mutable borrow of a single row.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [Value] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> + '_ {
        // chunks_exact(0) panics, and an empty grid has no rows anyway.
        self.data.chunks_exact(self.width.max(1))
    }

    /// Flat row-major view of the data.
    pub fn as_slice(&self) -> &[Value] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [Value] {
        &mut self.data
    }

    /// Consume the grid and return its row-major data.
    pub fn into_vec(self) -> Vec<Value> {
        self.data
    }

    // --- Internal helpers ---

    #[inline]
    fn bounds_check(&self, x: usize, y: usize) {
        assert!(
            x < self.width && y < self.height,
            "cell ({x},{y}) out of bounds for grid {}×{}",
            self.width,
            self.height,
        );
    }
}

// Debug formatting — prints the first rows, handy in assertion failures.
impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {{ {}×{} }}", self.width, self.height)?;
        for (y, row) in self.rows().take(8).enumerate() {
            write!(f, "  row {y}: [")?;
            for (x, v) in row.iter().take(16).enumerate() {
                if x > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{v}")?;
            }
            if self.width > 16 {
                write!(f, ", ...")?;
            }
            writeln!(f, "]")?;
        }
        if self.height > 8 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_row_major_layout() {
        // [10, 20, 30]
        // [40, 50, 60]
        let g = Grid::from_vec(3, 2, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(g.get(0, 0), 10);
        assert_eq!(g.get(2, 0), 30);
        assert_eq!(g.get(0, 1), 40);
        assert_eq!(g.get(2, 1), 60);
        assert_eq!(g.row(1), &[40, 50, 60]);
    }

    #[test]
    #[should_panic(expected = "must equal width * height")]
    fn test_from_vec_rejects_bad_length() {
        let _ = Grid::from_vec(3, 2, vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_dimension_is_empty() {
        assert!(Grid::new(0, 5).is_empty());
        assert!(Grid::new(5, 0).is_empty());
        let g = Grid::from_vec(0, 7, vec![]);
        assert_eq!((g.width(), g.height()), (0, 0));
        assert_eq!(g, Grid::empty());
        assert_eq!(g.rows().count(), 0);
    }

    #[test]
    fn test_from_rows_matches_from_vec() {
        let a = Grid::from_rows(&[[1u8, 2], [3, 4], [5, 6]]);
        let b = Grid::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "row 1 has 1 values")]
    fn test_from_rows_rejects_ragged() {
        let rows: Vec<Vec<u8>> = vec![vec![1, 2], vec![3]];
        let _ = Grid::from_rows(&rows[..]);
    }

    #[test]
    fn test_set_get_and_rows() {
        let mut g = Grid::new(4, 2);
        g.set(3, 1, 9);
        g.row_mut(0)[1] = 7;
        let rows: Vec<&[u8]> = g.rows().collect();
        assert_eq!(rows, vec![&[0u8, 7, 0, 0][..], &[0u8, 0, 0, 9][..]]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds() {
        let g = Grid::filled(2, 2, 1);
        let _ = g.get(2, 0);
    }
}
