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

use std::cell::{Ref, RefMut};
use std::fmt;

use num_traits::Zero;

use crate::buffer::SharedBuffer;
use crate::coord::{Coord, Dims};
use crate::errors::{BufferTooSmallError, FailResult, NonSquareError};
use crate::layout::{Layout, LayoutKind, RowMajor, ColMajor};

/// A 2D view of a shared buffer, with storage order chosen by `P`.
///
/// This is not a linear algebra type; there is no arithmetic.  It exists so that
/// data can be filled in and read out by `(row, col)` without caring how it is
/// laid out, while still being handed in bulk to routines that do care.
///
/// # Sharing
///
/// `Clone` does **not** copy the elements.  The clone is another view of the same
/// buffer, and writes through either are visible through both.  Use [`copy`] for
/// an independent duplicate.
///
/// # Bounds
///
/// Every access is checked, and a bad index panics.  2D indices must lie within
/// `rows() x cols()`.  Linear indices must be less than [`size`], which for the
/// packed `Triangular` layout is smaller than `rows() * cols()`.
///
/// [`copy`]: #method.copy
/// [`size`]: #method.size
pub struct Matrix<T, P: Layout = ColMajor> {
    layout: P,
    buffer: SharedBuffer<T>,
}

/// Types that can address an element of a `Matrix`.
///
/// A bare `usize` is a linear offset into storage.  A `(row, col)` pair or a
/// `Coord` is resolved through the layout.
pub trait MatrixIndex: Copy + fmt::Debug {
    /// Produce the buffer offset, panicking if out of bounds.
    fn checked_offset<P: Layout>(self, layout: &P) -> usize;
}

impl MatrixIndex for usize {
    #[inline]
    fn checked_offset<P: Layout>(self, layout: &P) -> usize
    {
        assert!(
            self < layout.required_len(),
            "Index out of range in linear matrix access: {} (size {})",
            self, layout.required_len(),
        );
        self
    }
}

impl MatrixIndex for Coord {
    #[inline]
    fn checked_offset<P: Layout>(self, layout: &P) -> usize
    {
        assert!(
            layout.dims().contains(self),
            "Index out of range in 2D matrix access: {:?} (dims {})",
            self, layout.dims(),
        );
        let i = layout.offset(self);
        debug_assert!(i < layout.required_len());
        i
    }
}

impl MatrixIndex for (usize, usize) {
    #[inline]
    fn checked_offset<P: Layout>(self, layout: &P) -> usize
    { Coord::from(self).checked_offset(layout) }
}

/// # Construction
impl<T, P: Layout> Matrix<T, P> {
    /// Allocate a zero-filled matrix.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions are invalid for the layout.
    pub fn new(rows: usize, cols: usize) -> Self
    where T: Zero + Clone,
    {
        match Self::try_new(rows, cols) {
            Ok(m) => m,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(rows: usize, cols: usize) -> Result<Self, NonSquareError>
    where T: Zero + Clone,
    {
        let layout = P::try_new(Dims::new(rows, cols))?;
        let len = layout.required_len();
        trace!("allocating {} {}x{} matrix ({} elements)", P::KIND, rows, cols, len);
        Ok(Matrix { layout, buffer: SharedBuffer::zeroed(len) })
    }

    /// Take ownership of existing data.
    ///
    /// The data is interpreted according to `P`, and must contain at least
    /// `required_len` elements for that layout.  Any extra elements are kept but
    /// unreachable through `(row, col)` access.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions are invalid or the data is too short.
    pub fn wrap(data: Vec<T>, rows: usize, cols: usize) -> Self
    {
        match Self::try_wrap(data, rows, cols) {
            Ok(m) => m,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_wrap(data: Vec<T>, rows: usize, cols: usize) -> FailResult<Self>
    {
        trace!("wrapping {} elements as a {} {}x{} matrix", data.len(), P::KIND, rows, cols);
        Self::try_share(SharedBuffer::from_vec(data), rows, cols)
    }

    /// View a buffer that may already be shared with other matrices.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions are invalid or the buffer is too short.
    pub fn share(buffer: SharedBuffer<T>, rows: usize, cols: usize) -> Self
    {
        match Self::try_share(buffer, rows, cols) {
            Ok(m) => m,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_share(buffer: SharedBuffer<T>, rows: usize, cols: usize) -> FailResult<Self>
    {
        let layout = P::try_new(Dims::new(rows, cols))?;
        check_buffer_len(&layout, &buffer)?;
        Ok(Matrix { layout, buffer })
    }

    /// Allocate a matrix and fill it by calling `f` on every `(row, col)`.
    ///
    /// Cells are visited in row-major order.  For `Triangular`, each cell is
    /// written twice (once from each triangle) and the later write wins, so `f`
    /// should be symmetric.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        T: Zero + Clone,
        F: FnMut(Coord) -> T,
    {
        let mut out = Self::new(rows, cols);
        {
            let layout = out.layout;
            let mut data = out.data_mut();
            for row in 0..rows {
                for col in 0..cols {
                    let coord = Coord { row, col };
                    data[layout.offset(coord)] = f(coord);
                }
            }
        }
        out
    }
}

fn check_buffer_len<T, P: Layout>(layout: &P, buffer: &SharedBuffer<T>) -> Result<(), BufferTooSmallError>
{
    let (have, need) = (buffer.len(), layout.required_len());
    if have < need {
        return Err(BufferTooSmallError::new(have, need));
    }
    Ok(())
}

/// # Shape
impl<T, P: Layout> Matrix<T, P> {
    pub fn rows(&self) -> usize { self.layout.dims().rows }
    pub fn cols(&self) -> usize { self.layout.dims().cols }
    pub fn dims(&self) -> Dims { self.layout.dims() }
    pub fn layout(&self) -> &P { &self.layout }
    pub fn layout_kind(&self) -> LayoutKind { P::KIND }

    /// Number of elements the layout actually stores.  This is also the bound
    /// on linear indices.
    pub fn size(&self) -> usize { self.layout.required_len() }

    /// `rows() * cols()`, regardless of layout.
    pub fn logical_len(&self) -> usize { self.layout.dims().count() }

    pub fn is_empty(&self) -> bool { self.size() == 0 }

    /// Change the dimensions without touching the data.
    ///
    /// The existing elements are simply read back under the new shape.
    ///
    /// # Panics
    ///
    /// Panics if the new dimensions are invalid for the layout, or need more
    /// elements than the buffer has.
    pub fn reshape(&mut self, rows: usize, cols: usize)
    {
        let mut layout = self.layout;
        layout.set(Dims::new(rows, cols));
        if let Err(e) = check_buffer_len(&layout, &self.buffer) {
            panic!("cannot reshape {} matrix to {}x{}: {}", self.dims(), rows, cols, e);
        }
        self.layout = layout;
    }
}

/// # Element access
impl<T, P: Layout> Matrix<T, P> {
    /// Borrow an element by linear offset or by `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds, or if the buffer is currently
    /// borrowed mutably (possibly through another matrix sharing it).
    pub fn at<I: MatrixIndex>(&self, index: I) -> Ref<'_, T>
    {
        let i = index.checked_offset(&self.layout);
        Ref::map(self.buffer.borrow(), |data| &data[i])
    }

    /// Mutably borrow an element by linear offset or by `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds, or if the buffer is currently
    /// borrowed (possibly through another matrix sharing it).
    pub fn at_mut<I: MatrixIndex>(&mut self, index: I) -> RefMut<'_, T>
    {
        let i = index.checked_offset(&self.layout);
        RefMut::map(self.buffer.borrow_mut(), |data| &mut data[i])
    }

    pub fn read<I: MatrixIndex>(&self, index: I) -> T
    where T: Clone,
    { self.at(index).clone() }

    pub fn write<I: MatrixIndex>(&mut self, index: I, value: T)
    { *self.at_mut(index) = value; }

    /// Borrow the stored elements, in storage order, for bulk operations.
    ///
    /// The slice is exactly `size()` long.
    pub fn data(&self) -> Ref<'_, [T]>
    {
        let len = self.size();
        Ref::map(self.buffer.borrow(), |data| &data[..len])
    }

    pub fn data_mut(&mut self) -> RefMut<'_, [T]>
    {
        let len = self.size();
        RefMut::map(self.buffer.borrow_mut(), |data| &mut data[..len])
    }

    /// Pointer to the first stored element.
    ///
    /// The pointer is only valid for as long as the buffer is alive and no
    /// matrix sharing it is resized or freed.
    pub fn as_ptr(&self) -> *const T
    { self.buffer.borrow().as_ptr() }

    /// The shared handle to the backing storage.
    pub fn buffer(&self) -> &SharedBuffer<T>
    { &self.buffer }

    pub fn shares_buffer_with<Q: Layout>(&self, other: &Matrix<T, Q>) -> bool
    { SharedBuffer::ptr_eq(&self.buffer, &other.buffer) }

    /// Offsets of the whole matrix, in memory order.
    pub fn offsets(&self) -> P::Iter
    { self.layout.range_iter(Coord::ORIGIN, self.dims().end()) }

    /// Offsets of a sub-range, in memory order.
    ///
    /// See the [`iter`] module for exactly which cells are covered.
    ///
    /// [`iter`]: iter/index.html
    pub fn offsets_in(&self, start: Coord, end: Coord) -> P::Iter
    { self.layout.range_iter(start, end) }
}

/// # Lifecycle
impl<T, P: Layout> Matrix<T, P> {
    /// An independent duplicate with the same layout and dimensions.
    ///
    /// The stored elements are copied in storage order into a fresh buffer.
    pub fn copy(&self) -> Self
    where T: Clone,
    {
        debug!("deep copy of {} {} matrix", P::KIND, self.dims());
        let data = self.data().to_vec();
        Matrix { layout: self.layout, buffer: SharedBuffer::from_vec(data) }
    }

    /// Drop this matrix's hold on its buffer and reset it to `0x0`.
    ///
    /// The storage itself is freed only once no other matrix shares it.
    pub fn free(&mut self)
    {
        debug!(
            "releasing {} {} matrix ({} handles to buffer)",
            P::KIND, self.dims(), self.buffer.handle_count(),
        );
        self.layout = P::new(Dims::default());
        self.buffer = SharedBuffer::empty();
    }

    /// Alias of `free`.
    pub fn release(&mut self)
    { self.free() }

    fn reinterpreted<Q: Layout>(&self, dims: Dims) -> Matrix<T, Q>
    {
        let layout = Q::new(dims);
        assert_eq!(
            layout.required_len(), self.size(),
            "reinterpretation must preserve the number of elements",
        );
        debug!("reinterpreting {} {} matrix as {} {}", P::KIND, self.dims(), Q::KIND, dims);
        Matrix { layout, buffer: self.buffer.clone() }
    }
}

// NOTE: `reinterpret_order` keeps the dimensions and swaps the storage order,
//       so the *same offset* is read back from a transposed coordinate.  For a
//       square matrix the result is the transpose, sharing storage.  Code that
//       feeds column-major results into row-major consumers relies on this;
//       don't "fix" it into something that preserves `(row, col)` identity.

impl<T> Matrix<T, RowMajor> {
    /// View the same storage in column-major order, keeping the dimensions.
    ///
    /// No data is moved.  The element previously at `(i, j)` is found at
    /// `(j, i)` of the result (for square matrices; in general, whatever
    /// coordinate maps to the same offset).
    pub fn reinterpret_order(&self) -> Matrix<T, ColMajor>
    { self.reinterpreted(self.dims()) }

    /// The transpose, sharing storage.  Unlike `reinterpret_order`, the
    /// dimensions are swapped, so this is a true transpose for any shape.
    pub fn transpose_view(&self) -> Matrix<T, ColMajor>
    { self.reinterpreted(self.dims().transposed()) }
}

impl<T> Matrix<T, ColMajor> {
    /// View the same storage in row-major order, keeping the dimensions.
    ///
    /// No data is moved.  The element previously at `(i, j)` is found at
    /// `(j, i)` of the result (for square matrices; in general, whatever
    /// coordinate maps to the same offset).
    pub fn reinterpret_order(&self) -> Matrix<T, RowMajor>
    { self.reinterpreted(self.dims()) }

    /// The transpose, sharing storage.  Unlike `reinterpret_order`, the
    /// dimensions are swapped, so this is a true transpose for any shape.
    pub fn transpose_view(&self) -> Matrix<T, RowMajor>
    { self.reinterpreted(self.dims().transposed()) }
}

impl<T, P: Layout> Clone for Matrix<T, P> {
    /// Another view of the same buffer.  See [`copy`] for a deep copy.
    ///
    /// [`copy`]: #method.copy
    fn clone(&self) -> Self
    { Matrix { layout: self.layout, buffer: self.buffer.clone() } }
}

impl<T: fmt::Debug, P: Layout> fmt::Debug for Matrix<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Matrix")
            .field("layout", &P::KIND)
            .field("dims", &self.dims())
            .field("buffer", &self.buffer)
            .finish()
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::layout::Triangular;
    use itertools::iproduct;

    type RowMat = Matrix<i32, RowMajor>;
    type ColMat = Matrix<i32, ColMajor>;
    type TriMat = Matrix<i32, Triangular>;

    #[test]
    fn allocation_is_zeroed() {
        let m = Matrix::<f64, RowMajor>::new(3, 4);
        for (i, j) in iproduct!(0..3, 0..4) {
            assert_eq!(*m.at((i, j)), 0.0);
        }
        assert_eq!(m.size(), 12);
        assert_eq!(m.data().len(), 12);
    }

    #[test]
    fn default_layout_is_col_major() {
        let m: Matrix<f64> = Matrix::new(2, 2);
        assert_eq!(m.layout_kind(), LayoutKind::ColMajor);
    }

    #[test]
    fn linear_and_2d_agree() {
        let mut m = RowMat::new(2, 3);
        m.write((1, 2), 7);
        assert_eq!(m.read(5), 7);

        let mut m = ColMat::new(2, 3);
        m.write((1, 2), 7);
        assert_eq!(m.read(5), 7);
        m.write((1, 0), 3);
        assert_eq!(m.read(1), 3);
    }

    #[test]
    fn triangular_aliasing() {
        let mut m = TriMat::new(3, 3);
        m.write((0, 2), 5);
        assert_eq!(*m.at((2, 0)), 5);
        assert_eq!(m.size(), 6);
        assert_eq!(m.logical_len(), 9);

        // literally the same cell
        assert!(std::ptr::eq(&*m.at((1, 2)), &*m.at((2, 1))));
    }

    #[test]
    fn triangular_non_square() {
        assert!(TriMat::try_new(3, 4).is_err());
    }

    #[test]
    #[should_panic(expected = "non-square triangular")]
    fn triangular_non_square_panics() {
        let _ = TriMat::new(3, 4);
    }

    #[test]
    #[should_panic(expected = "Index out of range")]
    fn triangular_linear_bound_is_storage_size() {
        let m = TriMat::new(3, 3);
        let _ = m.at(6);
    }

    #[test]
    #[should_panic(expected = "Index out of range")]
    fn coordinate_past_the_edge() {
        // (0, 3) would map to offset 3, which is still in storage
        let m = RowMat::new(2, 3);
        let _ = m.at((0, 3));
    }

    #[test]
    #[should_panic(expected = "Index out of range")]
    fn linear_past_the_end() {
        let m = ColMat::new(2, 3);
        let _ = m.at(6);
    }

    #[test]
    fn wrap_takes_data_as_is() {
        let m = RowMat::wrap(vec![0, 1, 2, 3, 4, 5], 2, 3);
        assert_eq!(m.read((1, 0)), 3);
        let m = ColMat::wrap(vec![0, 1, 2, 3, 4, 5], 2, 3);
        assert_eq!(m.read((1, 0)), 1);
        let m = TriMat::wrap(vec![0, 1, 2, 3, 4, 5], 3, 3);
        assert_eq!(m.read((1, 2)), 4);
    }

    #[test]
    fn wrap_checks_length() {
        assert!(RowMat::try_wrap(vec![1, 2, 3], 2, 2).is_err());
        assert!(TriMat::try_wrap(vec![1, 2, 3], 2, 2).is_ok());
        assert!(TriMat::try_wrap(vec![1, 2, 3, 4], 2, 3).is_err());

        let err = RowMat::try_wrap(vec![1, 2, 3], 2, 2).err().unwrap();
        let err = err.downcast::<BufferTooSmallError>().unwrap();
        assert_eq!((err.have, err.need), (3, 4));
    }

    #[test]
    fn clone_shares() {
        let a = RowMat::new(2, 2);
        let mut b = a.clone();
        b.write((0, 1), 9);
        assert_eq!(a.read((0, 1)), 9);
        assert!(a.shares_buffer_with(&b));
        assert_eq!(a.buffer().handle_count(), 2);
    }

    #[test]
    fn share_existing_buffer() {
        let buffer = SharedBuffer::from_vec(vec![1, 2, 3, 4]);
        let mut rows = RowMat::share(buffer.clone(), 2, 2);
        let cols = ColMat::share(buffer.clone(), 2, 2);
        rows.write((0, 1), 20);
        assert_eq!(cols.read((1, 0)), 20);
        assert_eq!(buffer.handle_count(), 3);
        assert!(RowMat::try_share(buffer, 3, 3).is_err());
    }

    #[test]
    fn copy_is_independent() {
        let mut a = TriMat::new(3, 3);
        a.write((2, 1), 4);
        let mut b = a.copy();
        assert!(!a.shares_buffer_with(&b));
        assert_eq!(b.dims(), a.dims());
        assert_eq!(b.read((1, 2)), 4);

        b.write((2, 1), 8);
        assert_eq!(a.read((2, 1)), 4);
    }

    #[test]
    fn copy_ignores_excess_storage() {
        let a = RowMat::wrap(vec![1, 2, 3, 4, 5], 2, 2);
        let b = a.copy();
        assert_eq!(b.buffer().len(), 4);
        assert_eq!(&b.data()[..], &[1, 2, 3, 4]);
    }

    #[test]
    fn free_keeps_other_views_alive() {
        let mut a = RowMat::wrap(vec![1, 2, 3, 4], 2, 2);
        let b = a.reinterpret_order();
        a.free();
        assert_eq!(a.dims(), Dims::new(0, 0));
        assert!(a.is_empty());
        assert_eq!(b.buffer().handle_count(), 1);
        assert_eq!(b.read((1, 0)), 2);

        let mut t = TriMat::new(2, 2);
        t.release();
        assert_eq!(t.size(), 0);
    }

    #[test]
    fn reinterpret_is_a_transposed_view() {
        let rows = RowMat::from_fn(3, 3, |Coord { row, col }| (10 * row + col) as i32);
        let mut cols = rows.reinterpret_order();
        assert!(cols.shares_buffer_with(&rows));
        assert_eq!(cols.dims(), rows.dims());
        for (i, j) in iproduct!(0..3, 0..3) {
            assert_eq!(cols.read((j, i)), rows.read((i, j)));
        }

        cols.write((0, 2), -1);
        assert_eq!(rows.read((2, 0)), -1);
    }

    #[test]
    fn reinterpret_round_trip() {
        let cols = ColMat::from_fn(2, 3, |Coord { row, col }| (10 * row + col) as i32);
        let back = cols.reinterpret_order().reinterpret_order();
        for (i, j) in iproduct!(0..2, 0..3) {
            assert_eq!(back.read((i, j)), cols.read((i, j)));
        }
    }

    #[test]
    fn transpose_view_non_square() {
        let rows = RowMat::from_fn(2, 3, |Coord { row, col }| (10 * row + col) as i32);
        let t = rows.transpose_view();
        assert_eq!(t.dims(), Dims::new(3, 2));
        for (i, j) in iproduct!(0..2, 0..3) {
            assert_eq!(t.read((j, i)), rows.read((i, j)));
        }
        let back = t.transpose_view();
        assert_eq!(back.dims(), Dims::new(2, 3));
        assert_eq!(back.read((1, 2)), 12);
    }

    #[test]
    fn reshape_reads_same_data() {
        let mut m = RowMat::wrap((0..6).collect(), 2, 3);
        m.reshape(3, 2);
        assert_eq!(m.read((2, 1)), 5);
        assert_eq!(m.read((1, 0)), 2);
        m.reshape(1, 4);
        assert_eq!(m.size(), 4);
    }

    #[test]
    #[should_panic(expected = "cannot reshape")]
    fn reshape_needs_storage() {
        let mut m = RowMat::new(2, 3);
        m.reshape(3, 3);
    }

    #[test]
    fn offsets_match_storage() {
        let m = RowMat::wrap((0..6).collect(), 2, 3);
        let data = m.data();
        let values: Vec<_> = m.offsets().map(|i| data[i]).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4, 5]);

        let m = TriMat::new(4, 4);
        assert_eq!(m.offsets().count(), 10);
        assert_eq!(m.offsets_in(Coord::new(1, 1), Coord::new(2, 2)).count(), 10);
    }

    #[test]
    fn from_fn_triangular() {
        let m = TriMat::from_fn(3, 3, |Coord { row, col }| (row + col) as i32);
        assert_eq!(&m.data()[..], &[0, 1, 2, 2, 3, 4]);
    }

    #[test]
    fn debug_output() {
        let m = RowMat::new(1, 2);
        let s = format!("{:?}", m);
        assert!(s.contains("RowMajor"));
        assert!(s.contains("1x2"));
    }
}
