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

//! Storage layouts.
//!
//! A layout decides where the element at `(row, col)` lives inside a flat buffer,
//! and how many elements that buffer must hold.  The interface presented by
//! [`Matrix`] is the same for all of them.
//!
//! [`Matrix`]: ../struct.Matrix.html

use std::fmt;
use std::str::FromStr;

use crate::coord::{Coord, Dims};
use crate::errors::{NonSquareError, ParseLayoutError};
use crate::iter::{RangeIter, RowMajorIter, ColMajorIter, TriangularIter};

/// A mapping from 2D coordinates to offsets in a flat buffer.
///
/// For fixed dimensions, `offset` must map every valid coordinate into
/// `0..required_len()`.  It is injective for the dense layouts; `Triangular`
/// deliberately maps `(y, x)` and `(x, y)` to the same cell.
///
/// None of these methods check that the coordinate is in bounds;
/// that is the job of the matrix.
pub trait Layout: Copy + fmt::Debug {
    const KIND: LayoutKind;

    type Iter: RangeIter + Iterator<Item = usize>;

    /// Construct the layout, validating the dimensions.
    fn try_new(dims: Dims) -> Result<Self, NonSquareError>;

    /// Construct the layout.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions are not valid for this layout.
    fn new(dims: Dims) -> Self
    {
        match Self::try_new(dims) {
            Ok(layout) => layout,
            Err(e) => panic!("{}", e),
        }
    }

    fn dims(&self) -> Dims;

    /// Change the dimensions, re-deriving `required_len`.
    ///
    /// This knows nothing about storage.  Whoever owns the buffer is responsible
    /// for making sure it is large enough for the new size.
    fn try_set(&mut self, dims: Dims) -> Result<(), NonSquareError>
    {
        *self = Self::try_new(dims)?;
        Ok(())
    }

    /// Panicking form of `try_set`.
    fn set(&mut self, dims: Dims)
    {
        if let Err(e) = self.try_set(dims) {
            panic!("{}", e);
        }
    }

    fn offset(&self, coord: Coord) -> usize;

    /// Number of elements the backing buffer needs.
    fn required_len(&self) -> usize;

    /// Offsets covering the sub-rectangle `start..end`, in memory order.
    fn range_iter(&self, start: Coord, end: Coord) -> Self::Iter;
}

// ---------------------------------------------------------------------------

/// C order.  `offset(y, x) = y * cols + x`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RowMajor {
    dims: Dims,
}

/// Fortran order.  `offset(y, x) = x * rows + y`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ColMajor {
    dims: Dims,
}

/// Packed storage of a symmetric square matrix.
///
/// Only one triangle is stored, as consecutive rows of growing length
/// (`[(0,0)], [(1,0), (1,1)], [(2,0), (2,1), (2,2)], ...`).  Coordinates from
/// the other triangle are folded onto it, so `(y, x)` and `(x, y)` are always
/// the same cell.  An `n x n` matrix needs `n * (n + 1) / 2` elements.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Triangular {
    dims: Dims,
    len: usize,
}

impl Layout for RowMajor {
    const KIND: LayoutKind = LayoutKind::RowMajor;

    type Iter = RowMajorIter;

    fn try_new(dims: Dims) -> Result<Self, NonSquareError>
    { Ok(RowMajor { dims }) }

    fn dims(&self) -> Dims
    { self.dims }

    #[inline(always)]
    fn offset(&self, Coord { row, col }: Coord) -> usize
    { row * self.dims.cols + col }

    fn required_len(&self) -> usize
    { self.dims.count() }

    fn range_iter(&self, start: Coord, end: Coord) -> RowMajorIter
    { RowMajorIter::new(self.dims, start, end) }
}

impl Layout for ColMajor {
    const KIND: LayoutKind = LayoutKind::ColMajor;

    type Iter = ColMajorIter;

    fn try_new(dims: Dims) -> Result<Self, NonSquareError>
    { Ok(ColMajor { dims }) }

    fn dims(&self) -> Dims
    { self.dims }

    #[inline(always)]
    fn offset(&self, Coord { row, col }: Coord) -> usize
    { col * self.dims.rows + row }

    fn required_len(&self) -> usize
    { self.dims.count() }

    fn range_iter(&self, start: Coord, end: Coord) -> ColMajorIter
    { ColMajorIter::new(self.dims, start, end) }
}

impl Layout for Triangular {
    const KIND: LayoutKind = LayoutKind::Triangular;

    type Iter = TriangularIter;

    fn try_new(dims: Dims) -> Result<Self, NonSquareError>
    {
        if !dims.is_square() {
            return Err(NonSquareError::new(dims));
        }
        let len = packed_len(dims.rows);
        Ok(Triangular { dims, len })
    }

    fn dims(&self) -> Dims
    { self.dims }

    #[inline(always)]
    fn offset(&self, Coord { row, col }: Coord) -> usize
    {
        let (lo, hi) = if row < col { (row, col) } else { (col, row) };
        packed_len(hi) + lo
    }

    fn required_len(&self) -> usize
    { self.len }

    // The packed form has no sensible notion of a sub-rectangle in memory order,
    // so the requested range is ignored and every stored cell is visited once.
    fn range_iter(&self, _start: Coord, _end: Coord) -> TriangularIter
    { TriangularIter::new(self.len) }
}

// number of cells in the first `n` rows of a lower triangle
#[inline(always)]
fn packed_len(n: usize) -> usize
{ n * (n + 1) / 2 }

// ---------------------------------------------------------------------------

/// Runtime name for a layout.
///
/// Lets code that only knows a layout by name (e.g. from a settings file)
/// reason about it.  Parses from `row-major`, `col-major` (or `column-major`)
/// and `triangular` (or `packed`), ignoring case.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LayoutKind {
    RowMajor,
    ColMajor,
    Triangular,
}

impl LayoutKind {
    /// The buffer length required by this layout for the given dimensions.
    pub fn required_len(self, dims: Dims) -> Result<usize, NonSquareError>
    {
        Ok(match self {
            LayoutKind::RowMajor => RowMajor::try_new(dims)?.required_len(),
            LayoutKind::ColMajor => ColMajor::try_new(dims)?.required_len(),
            LayoutKind::Triangular => Triangular::try_new(dims)?.required_len(),
        })
    }

    /// Whether the layout stores each of the `rows * cols` elements separately.
    pub fn is_dense(self) -> bool
    { self != LayoutKind::Triangular }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(match *self {
            LayoutKind::RowMajor => "row-major",
            LayoutKind::ColMajor => "col-major",
            LayoutKind::Triangular => "triangular",
        })
    }
}

impl FromStr for LayoutKind {
    type Err = ParseLayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match &s.trim().to_ascii_lowercase().replace('_', "-")[..] {
            "row-major" => Ok(LayoutKind::RowMajor),
            "col-major" | "column-major" => Ok(LayoutKind::ColMajor),
            "triangular" | "packed" => Ok(LayoutKind::Triangular),
            _ => Err(ParseLayoutError::new(s)),
        }
    }
}
