/* ************************************************************************ **
** This file is part of rsp2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of rsp2 is provided under this permissive license, **
** and that the project as a whole is licensed under the GPL 3.0.           **
** ************************************************************************ */

use std::fmt;

/// A `(row, col)` position.
///
/// When used as the bounds of a range, `start` is inclusive and `end` is exclusive.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

/// The logical shape of a matrix, as seen by callers.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dims {
    pub rows: usize,
    pub cols: usize,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { row: 0, col: 0 };

    #[inline(always)]
    pub fn new(row: usize, col: usize) -> Self
    { Coord { row, col } }

    /// Swap the row and column.
    #[inline(always)]
    pub fn transposed(self) -> Self
    { Coord { row: self.col, col: self.row } }
}

impl Dims {
    #[inline(always)]
    pub fn new(rows: usize, cols: usize) -> Self
    { Dims { rows, cols } }

    /// `rows * cols`.  Note that some layouts store fewer elements than this.
    #[inline(always)]
    pub fn count(self) -> usize
    { self.rows * self.cols }

    #[inline(always)]
    pub fn is_square(self) -> bool
    { self.rows == self.cols }

    #[inline(always)]
    pub fn transposed(self) -> Self
    { Dims { rows: self.cols, cols: self.rows } }

    /// Whether `coord` lies inside the matrix.
    #[inline(always)]
    pub fn contains(self, coord: Coord) -> bool
    { coord.row < self.rows && coord.col < self.cols }

    /// The exclusive upper corner, for building a range over the whole matrix.
    #[inline(always)]
    pub fn end(self) -> Coord
    { Coord { row: self.rows, col: self.cols } }
}

impl From<(usize, usize)> for Coord {
    #[inline(always)]
    fn from((row, col): (usize, usize)) -> Self
    { Coord { row, col } }
}

impl From<(usize, usize)> for Dims {
    #[inline(always)]
    fn from((rows, cols): (usize, usize)) -> Self
    { Dims { rows, cols } }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    { write!(f, "Coord({}, {})", self.row, self.col) }
}

impl fmt::Debug for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    { write!(f, "{}x{}", self.rows, self.cols) }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    { fmt::Debug::fmt(self, f) }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(Coord::from((2, 5)), Coord::new(2, 5));
        assert_eq!(Dims::from((3, 4)), Dims::new(3, 4));
        assert_eq!(Coord::new(2, 5).transposed(), Coord::new(5, 2));
        assert_eq!(Dims::new(3, 4).transposed(), Dims::new(4, 3));
    }

    #[test]
    fn containment() {
        let dims = Dims::new(2, 3);
        assert!(dims.contains(Coord::new(1, 2)));
        assert!(!dims.contains(Coord::new(2, 0)));
        assert!(!dims.contains(Coord::new(0, 3)));
        assert!(!Dims::new(0, 0).contains(Coord::ORIGIN));
        assert_eq!(dims.count(), 6);
        assert_eq!(dims.end(), Coord::new(2, 3));
    }

    #[test]
    fn formatting() {
        assert_eq!(format!("{}", Dims::new(3, 4)), "3x4");
        assert_eq!(format!("{:?}", Coord::new(1, 2)), "Coord(1, 2)");
    }
}
