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

//! Matrix storage with a pluggable memory layout.
//!
//! A [`Matrix`] presents the same `(row, col)` interface whether its data is
//! stored row-major, column-major, or as the packed lower triangle of a symmetric
//! matrix.  The data lives in a reference-counted [`SharedBuffer`], so several
//! matrices can view (and mutate) the same memory; this is how row-major and
//! column-major views are swapped without copying.
//!
//! [`Matrix`]: struct.Matrix.html
//! [`SharedBuffer`]: struct.SharedBuffer.html

#[macro_use] extern crate failure;
#[macro_use] extern crate log;
#[cfg(feature = "serde")]
#[macro_use] extern crate serde;

pub use crate::coord::{Coord, Dims};
pub use crate::layout::{Layout, LayoutKind, RowMajor, ColMajor, Triangular};
pub use crate::buffer::SharedBuffer;
pub use crate::matrix::{Matrix, MatrixIndex};
pub use crate::errors::{FailResult, NonSquareError, BufferTooSmallError, ParseLayoutError};

pub mod iter;

mod coord;
mod layout;
mod buffer;
mod matrix;
mod errors;
