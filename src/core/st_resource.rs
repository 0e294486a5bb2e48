use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// A single-threaded, reference-counted resource with interior mutability.
///
/// `StResource` lets several owners on one thread read and mutate the same value.
/// The texture atlas uses it for its occupancy registry: the atlas sets bits when it
/// hands out a cell, and every [`AtlasCell`](crate::AtlasCell) handle keeps a clone so
/// that it can clear its own bit when dropped, without borrowing the atlas.
///
/// # Type Parameters
/// - `T`: The type of the contained resource
///
/// # Examples
///
/// ```
/// use voxel_mesher::core::StResource;
///
/// let counter = StResource::new(0);
/// let clone = counter.clone();
///
/// *clone.get_mut() += 1;
/// assert_eq!(*counter.get(), 1);
/// assert_eq!(counter.owners(), 2);
/// ```
///
/// # Panics
/// `get_mut` panics if a guard from `get` or `get_mut` is still alive on the same value.
/// Guards are never held across calls into other subsystems.
///
/// # Performance Considerations
/// - No atomics, no locking
/// - Not `Send`: the load phase is single-threaded and this type enforces it
pub struct StResource<T> {
    resource: Rc<RefCell<T>>,
}

impl<T> StResource<T> {
    /// Creates a new `StResource` containing the given value.
    ///
    /// # Arguments
    /// * `resource` - The value to be stored in the resource
    pub fn new(resource: T) -> Self {
        Self {
            resource: Rc::new(RefCell::new(resource)),
        }
    }

    /// Returns a guard that allows reading the contained value.
    pub fn get(&self) -> Ref<'_, T> {
        self.resource.borrow()
    }

    /// Returns a guard that allows modifying the contained value.
    pub fn get_mut(&self) -> RefMut<'_, T> {
        self.resource.borrow_mut()
    }

    /// Number of live owners of the underlying value.
    pub fn owners(&self) -> usize {
        Rc::strong_count(&self.resource)
    }

    /// Returns `true` if both resources point at the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T> Clone for StResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
