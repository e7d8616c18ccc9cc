/// Keys stored in a `SkipListMap`.
///
/// Keys must be totally ordered. A key type may also have a null-equivalent
/// value (for example `None` for `Option<T>`); such keys are rejected with
/// `Error::InvalidKey` before the map is traversed or modified.
pub trait Key: Ord {
    /// Returns `true` if this value is the null-equivalent of its type.
    #[inline(always)]
    fn is_null(&self) -> bool {
        false
    }
}

non_null_key!(
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    bool, char, (), String, str,
);

impl<T: Ord> Key for Option<T> {
    #[inline(always)]
    fn is_null(&self) -> bool {
        self.is_none()
    }
}

impl<T: Key + ?Sized> Key for Box<T> {
    #[inline(always)]
    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}

impl<'a, T: Key + ?Sized> Key for &'a T {
    #[inline(always)]
    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}

impl<T: Ord> Key for Vec<T> {}

impl<T: Ord> Key for [T] {}

impl<A: Ord, B: Ord> Key for (A, B) {}

impl<A: Ord, B: Ord, C: Ord> Key for (A, B, C) {}

impl<T: Key + ?Sized> Key for std::rc::Rc<T> {
    #[inline(always)]
    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}
