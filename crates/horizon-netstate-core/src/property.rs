//! Change-tracked values.
//!
//! A [`Property<T>`] is the single point of publication for a shared value:
//! writers replace the value wholesale, readers always see either the old or
//! the new value in full. Combined with `Arc<T>` values this gives pointer
//! swap semantics: a reader clones the `Arc` under a short read lock and never
//! waits on whatever work produced the next value.
//!
//! # Example
//!
//! ```
//! use horizon_netstate_core::{Property, Signal};
//!
//! struct Counter {
//!     value: Property<i32>,
//!     value_changed: Signal<i32>,
//! }
//!
//! impl Counter {
//!     fn set_value(&self, new_value: i32) {
//!         if self.value.set(new_value) {
//!             self.value_changed.emit(new_value);
//!         }
//!     }
//! }
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A value cell that reports whether writes actually changed it.
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// whenever `T` is.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value; store `Arc<T>` for cheap clones of large values.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value unconditionally, without change detection.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    ///
    /// If the new value equals the current one the stored value is left
    /// untouched.
    pub fn set(&self, value: T) -> bool {
        self.replace(value).is_some()
    }

    /// Set the value, returning the previous value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            tracing::trace!(target: crate::logging::targets::PROPERTY, "property value replaced");
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.value.read())
            .finish()
    }
}

static_assertions::assert_impl_all!(Property<std::sync::Arc<String>>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_property_basic() {
        let prop = Property::new(42);
        assert_eq!(prop.get(), 42);

        assert!(!prop.set(42), "equal value is not a change");
        assert!(prop.set(100));
        assert_eq!(prop.get(), 100);
    }

    #[test]
    fn test_property_replace_returns_previous() {
        let prop = Property::new("none".to_string());
        assert_eq!(prop.replace("wifi".to_string()), Some("none".to_string()));
        assert_eq!(prop.replace("wifi".to_string()), None);
    }

    #[test]
    fn test_property_with() {
        let prop = Property::new(vec![1, 2, 3]);
        assert_eq!(prop.with(|v| v.len()), 3);
    }

    #[test]
    fn test_property_set_silent() {
        let prop = Property::new(1);
        prop.set_silent(1);
        prop.set_silent(2);
        assert_eq!(prop.get(), 2);
    }

    #[test]
    fn test_arc_values_compare_by_content() {
        let first = Arc::new("wifi".to_string());
        let prop = Property::new(first.clone());

        // A distinct allocation with equal content is not a change, and the
        // originally published Arc stays in place.
        assert!(!prop.set(Arc::new("wifi".to_string())));
        assert!(Arc::ptr_eq(&prop.get(), &first));
    }

    #[test]
    fn test_readers_keep_old_value() {
        let prop = Property::new(Arc::new(1));
        let held = prop.get();
        prop.set(Arc::new(2));
        assert_eq!(*held, 1);
        assert_eq!(*prop.get(), 2);
    }
}
