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

//! Layout-aware traversal of buffer offsets.
//!
//! Each iterator is one-shot.  `advance` hands out offsets until the range is
//! exhausted, then returns [`END`] forever after.  The same sequence is also
//! available through `Iterator`, which ends with `None` instead.
//!
//! The dense iterators walk the requested rectangle along its inner axis,
//! wrapping back to the start column (or row) each time the inner axis reaches
//! `end`.  The outer axis is **not** bounded by `end`; it keeps going until it
//! reaches the full dimension of the matrix.  A range starting at row `k`
//! therefore covers everything from row `k` to the bottom of the matrix,
//! restricted to the requested columns.
//!
//! [`END`]: constant.END.html

use std::iter::FusedIterator;

use crate::coord::{Coord, Dims};

/// Returned by `advance` once a range is exhausted.
pub const END: isize = -1;

pub trait RangeIter {
    /// Produce the next offset, or [`END`].
    ///
    /// [`END`]: constant.END.html
    fn advance(&mut self) -> isize;
}

/// Walks rows, then down the matrix.
#[derive(Debug, Clone)]
pub struct RowMajorIter {
    dims: Dims,
    start: Coord,
    end: Coord,
    curr: Coord,
    done: bool,
}

/// Walks columns, then across the matrix.
#[derive(Debug, Clone)]
pub struct ColMajorIter {
    dims: Dims,
    start: Coord,
    end: Coord,
    curr: Coord,
    done: bool,
}

/// Visits every cell of a packed triangle in storage order.
#[derive(Debug, Clone)]
pub struct TriangularIter {
    len: usize,
    next: usize,
}

fn check_range(dims: Dims, start: Coord, end: Coord)
{
    assert!(
        end.row <= dims.rows && end.col <= dims.cols,
        "range end {:?} lies outside a {} matrix", end, dims,
    );
}

// an empty rectangle visits nothing, regardless of how far the outer axis could go
fn is_empty_range(start: Coord, end: Coord) -> bool
{ start.row >= end.row || start.col >= end.col }

impl RowMajorIter {
    pub(crate) fn new(dims: Dims, start: Coord, end: Coord) -> Self
    {
        check_range(dims, start, end);
        let done = is_empty_range(start, end);
        RowMajorIter { dims, start, end, curr: start, done }
    }
}

impl ColMajorIter {
    pub(crate) fn new(dims: Dims, start: Coord, end: Coord) -> Self
    {
        check_range(dims, start, end);
        let done = is_empty_range(start, end);
        ColMajorIter { dims, start, end, curr: start, done }
    }
}

impl TriangularIter {
    pub(crate) fn new(len: usize) -> Self
    { TriangularIter { len, next: 0 } }
}

impl RangeIter for RowMajorIter {
    fn advance(&mut self) -> isize
    {
        if self.done {
            return END;
        }

        let i = self.curr.row * self.dims.cols + self.curr.col;

        self.curr.col += 1;
        if self.curr.col >= self.end.col {
            self.curr.col = self.start.col;
            self.curr.row += 1;
            if self.curr.row >= self.dims.rows {
                self.done = true;
            }
        }
        i as isize
    }
}

impl RangeIter for ColMajorIter {
    fn advance(&mut self) -> isize
    {
        if self.done {
            return END;
        }

        let i = self.curr.col * self.dims.rows + self.curr.row;

        self.curr.row += 1;
        if self.curr.row >= self.end.row {
            self.curr.row = self.start.row;
            self.curr.col += 1;
            if self.curr.col >= self.dims.cols {
                self.done = true;
            }
        }
        i as isize
    }
}

impl RangeIter for TriangularIter {
    fn advance(&mut self) -> isize
    {
        if self.next >= self.len {
            return END;
        }
        self.next += 1;
        (self.next - 1) as isize
    }
}

macro_rules! impl_iterator_via_advance {
    ($($Iter:ident),* $(,)*) => {$(
        impl Iterator for $Iter {
            type Item = usize;

            #[inline]
            fn next(&mut self) -> Option<usize>
            {
                match self.advance() {
                    END => None,
                    i => Some(i as usize),
                }
            }
        }

        impl FusedIterator for $Iter {}
    )*};
}

impl_iterator_via_advance!{ RowMajorIter, ColMajorIter, TriangularIter }

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    fn drain<I: RangeIter>(mut iter: I) -> Vec<isize>
    {
        let mut out = vec![];
        loop {
            let i = iter.advance();
            out.push(i);
            if i == END {
                return out;
            }
        }
    }

    #[test]
    fn row_major_full() {
        let dims = Dims::new(2, 3);
        let iter = RowMajorIter::new(dims, Coord::ORIGIN, dims.end());
        assert_eq!(drain(iter), vec![0, 1, 2, 3, 4, 5, END]);
    }

    #[test]
    fn col_major_full() {
        let dims = Dims::new(2, 3);
        let iter = ColMajorIter::new(dims, Coord::ORIGIN, dims.end());
        assert_eq!(drain(iter), vec![0, 1, 2, 3, 4, 5, END]);
    }

    #[test]
    fn sentinel_is_sticky() {
        let dims = Dims::new(1, 2);
        let mut iter = RowMajorIter::new(dims, Coord::ORIGIN, dims.end());
        assert_eq!(iter.advance(), 0);
        assert_eq!(iter.advance(), 1);
        assert_eq!(iter.advance(), END);
        assert_eq!(iter.advance(), END);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn row_major_sub_range() {
        // 4x4, columns 1..3 from row 2 to the bottom
        let dims = Dims::new(4, 4);
        let iter = RowMajorIter::new(dims, Coord::new(2, 1), Coord::new(3, 3));
        assert_eq!(iter.collect::<Vec<_>>(), vec![9, 10, 13, 14]);
    }

    #[test]
    fn col_major_sub_range() {
        // 4x4, rows 0..2 from column 1 to the right edge
        let dims = Dims::new(4, 4);
        let iter = ColMajorIter::new(dims, Coord::new(0, 1), Coord::new(2, 2));
        assert_eq!(iter.collect::<Vec<_>>(), vec![4, 5, 8, 9, 12, 13]);
    }

    #[test]
    fn ascending_order() {
        let dims = Dims::new(3, 5);
        let offsets: Vec<_> = ColMajorIter::new(dims, Coord::new(1, 2), Coord::new(3, 4)).collect();
        let mut sorted = offsets.clone();
        sorted.sort();
        assert_eq!(offsets, sorted);
        assert!(!offsets.is_empty());
    }

    #[test]
    fn empty_ranges() {
        let dims = Dims::new(3, 3);
        assert_eq!(drain(RowMajorIter::new(dims, Coord::new(0, 2), Coord::new(3, 2))), vec![END]);
        assert_eq!(drain(ColMajorIter::new(dims, Coord::new(3, 0), Coord::new(3, 3))), vec![END]);

        let dims = Dims::new(0, 0);
        assert_eq!(drain(RowMajorIter::new(dims, Coord::ORIGIN, dims.end())), vec![END]);
        assert_eq!(drain(TriangularIter::new(0)), vec![END]);
    }

    #[test]
    fn triangular_covers_packed_range() {
        assert_eq!(drain(TriangularIter::new(6)), vec![0, 1, 2, 3, 4, 5, END]);
        assert_eq!(TriangularIter::new(10).count(), 10);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn range_past_the_edge() {
        let _ = RowMajorIter::new(Dims::new(2, 2), Coord::ORIGIN, Coord::new(2, 3));
    }
}
