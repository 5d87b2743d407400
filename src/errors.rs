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

use crate::coord::Dims;

pub type FailResult<T> = Result<T, ::failure::Error>;

/// Packed symmetric storage was requested for a matrix that isn't square.
#[derive(Debug, Fail)]
#[fail(display = "Cannot have a non-square triangular matrix (got {} rows, {} cols)", _0, _1)]
pub struct NonSquareError(pub usize, pub usize, ::failure::Backtrace);

impl NonSquareError {
    pub(crate) fn new(dims: Dims) -> Self
    { NonSquareError(dims.rows, dims.cols, ::failure::Backtrace::new()) }
}

/// A buffer handed to a matrix can't hold every element of its layout.
#[derive(Debug, Fail)]
#[fail(display = "buffer of length {} is too small for a layout needing {} elements", have, need)]
pub struct BufferTooSmallError {
    pub have: usize,
    pub need: usize,
    backtrace: ::failure::Backtrace,
}

impl BufferTooSmallError {
    pub(crate) fn new(have: usize, need: usize) -> Self
    { BufferTooSmallError { have, need, backtrace: ::failure::Backtrace::new() } }
}

#[derive(Debug, Fail)]
#[fail(display = "unknown matrix layout: {:?}", text)]
pub struct ParseLayoutError {
    pub text: String,
    backtrace: ::failure::Backtrace,
}

impl ParseLayoutError {
    pub(crate) fn new(text: &str) -> Self
    { ParseLayoutError { text: text.to_string(), backtrace: ::failure::Backtrace::new() } }
}
