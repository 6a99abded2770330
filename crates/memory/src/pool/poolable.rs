//! Trait for objects that can be pooled

/// Trait for objects that can be pooled
///
/// # Example
/// ```
/// use nebula_memory::pool::Poolable;
///
/// struct Scratch {
///     buffer: Vec<u8>,
/// }
///
/// impl Poolable for Scratch {
///     fn reset(&mut self) {
///         self.buffer.clear();
///     }
///
///     fn is_reusable(&self) -> bool {
///         self.buffer.capacity() < 1_000_000 // Don't reuse huge buffers
///     }
/// }
/// ```
pub trait Poolable: Send + 'static {
    /// Reset object to initial state
    ///
    /// Called when an object is handed back to a pool. It should clear any
    /// state that must not leak into the next renter.
    fn reset(&mut self);

    /// Check if object is reusable
    ///
    /// Return false if the object should be discarded instead of pooled.
    fn is_reusable(&self) -> bool {
        true
    }

    /// Get approximate memory usage in bytes
    fn memory_usage(&self) -> usize {
        core::mem::size_of_val(self)
    }
}

impl Poolable for String {
    fn reset(&mut self) {
        self.clear();
    }

    fn is_reusable(&self) -> bool {
        // Don't pool strings with huge capacity
        self.capacity() < 1_000_000
    }

    fn memory_usage(&self) -> usize {
        core::mem::size_of::<String>() + self.capacity()
    }
}

impl<T: Send + 'static> Poolable for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }

    fn is_reusable(&self) -> bool {
        self.capacity() < 100_000
    }

    fn memory_usage(&self) -> usize {
        core::mem::size_of::<Vec<T>>() + (self.capacity() * core::mem::size_of::<T>())
    }
}

impl<T: Poolable> Poolable for Box<T> {
    fn reset(&mut self) {
        (**self).reset();
    }

    fn is_reusable(&self) -> bool {
        (**self).is_reusable()
    }

    fn memory_usage(&self) -> usize {
        (**self).memory_usage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_reset() {
        let mut s = String::from("hello");
        s.reset();
        assert!(s.is_empty());
        assert!(s.capacity() >= 5);
    }

    #[test]
    fn test_vec_reset_keeps_capacity() {
        let mut v: Vec<u32> = Vec::with_capacity(64);
        v.extend([1, 2, 3]);
        v.reset();
        assert!(v.is_empty());
        assert!(v.capacity() >= 64);
    }

    #[test]
    fn test_huge_vec_not_reusable() {
        let v: Vec<u8> = Vec::with_capacity(200_000);
        assert!(!v.is_reusable());
    }

    #[test]
    fn test_boxed_delegates() {
        let mut b = Box::new(String::from("x"));
        b.reset();
        assert!(b.is_empty());
        assert!(b.is_reusable());
    }
}
