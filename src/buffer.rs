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

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use num_traits::Zero;

/// A reference-counted element array, shared by every matrix that views it.
///
/// `Clone` produces another handle to the **same** storage.  Writes through any
/// handle are visible through all of them; nothing is ever copied on write.
/// The storage is dropped along with the last handle.
///
/// This is deliberately single-threaded.  `RefCell` enforces at runtime that
/// there is never a writer alongside any other borrow; a conflicting borrow panics.
pub struct SharedBuffer<T> {
    data: Rc<RefCell<Vec<T>>>,
}

impl<T> SharedBuffer<T> {
    /// Take ownership of existing data.
    pub fn from_vec(vec: Vec<T>) -> Self
    { SharedBuffer { data: Rc::new(RefCell::new(vec)) } }

    /// A buffer of `len` zeros.
    pub fn zeroed(len: usize) -> Self
    where T: Zero + Clone,
    { SharedBuffer::from_vec(vec![T::zero(); len]) }

    pub(crate) fn empty() -> Self
    { SharedBuffer::from_vec(vec![]) }

    pub fn len(&self) -> usize
    { self.data.borrow().len() }

    pub fn is_empty(&self) -> bool
    { self.len() == 0 }

    /// How many handles (including this one) currently share the storage.
    pub fn handle_count(&self) -> usize
    { Rc::strong_count(&self.data) }

    /// Whether two handles refer to the same storage.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool
    { Rc::ptr_eq(&a.data, &b.data) }

    /// # Panics
    ///
    /// Panics if the buffer is currently borrowed mutably.
    pub fn borrow(&self) -> Ref<'_, [T]>
    { Ref::map(self.data.borrow(), |v| &v[..]) }

    /// # Panics
    ///
    /// Panics if the buffer is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, [T]>
    { RefMut::map(self.data.borrow_mut(), |v| &mut v[..]) }

    /// Recover the data if this is the only handle.
    pub fn try_unwrap(self) -> Result<Vec<T>, Self>
    {
        match Rc::try_unwrap(self.data) {
            Ok(cell) => Ok(cell.into_inner()),
            Err(data) => Err(SharedBuffer { data }),
        }
    }
}

impl<T> Clone for SharedBuffer<T> {
    fn clone(&self) -> Self
    { SharedBuffer { data: Rc::clone(&self.data) } }
}

impl<T: fmt::Debug> fmt::Debug for SharedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.data.try_borrow() {
            Ok(data) => f.debug_struct("SharedBuffer")
                .field("handles", &self.handle_count())
                .field("data", &&data[..])
                .finish(),
            Err(_) => f.write_str("SharedBuffer { <mutably borrowed> }"),
        }
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn zero_filled() {
        let buf = SharedBuffer::<f64>::zeroed(5);
        assert_eq!(buf.len(), 5);
        assert!(buf.borrow().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn clones_alias() {
        let a = SharedBuffer::from_vec(vec![1, 2, 3]);
        let b = a.clone();
        assert_eq!(a.handle_count(), 2);
        assert!(SharedBuffer::ptr_eq(&a, &b));

        b.borrow_mut()[1] = 20;
        assert_eq!(&a.borrow()[..], &[1, 20, 3]);

        drop(b);
        assert_eq!(a.handle_count(), 1);
        assert_eq!(a.try_unwrap().unwrap(), vec![1, 20, 3]);
    }

    #[test]
    fn unwrap_shared() {
        let a = SharedBuffer::from_vec(vec![1]);
        let b = a.clone();
        let a = a.try_unwrap().unwrap_err();
        assert!(SharedBuffer::ptr_eq(&a, &b));
    }

    #[test]
    fn distinct_buffers() {
        let a = SharedBuffer::from_vec(vec![1]);
        let b = SharedBuffer::from_vec(vec![1]);
        assert!(!SharedBuffer::ptr_eq(&a, &b));
    }

    #[test]
    #[should_panic(expected = "borrowed")]
    fn writer_excludes_readers() {
        let a = SharedBuffer::from_vec(vec![1, 2]);
        let b = a.clone();
        let _guard = a.borrow_mut();
        let _ = b.borrow();
    }
}
