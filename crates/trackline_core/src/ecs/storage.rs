//! # Component Storage
//!
//! Pre-allocated, dense component storage with zero runtime allocations.
//!
//! The storage uses a dense array strategy:
//! - All component slots are pre-allocated at creation
//! - Access is O(1) via entity index
//! - Iteration is cache-friendly (contiguous memory)

use super::component::Component;

/// Pre-allocated storage for a single component type.
///
/// This storage guarantees:
/// - Zero allocations after initialization
/// - O(1) access by entity index
/// - Cache-friendly iteration
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Velocity> = ComponentStorage::new(128);
/// storage.set(0, Velocity { current: 4.2, target: 5.0 });
/// ```
pub struct ComponentStorage<C: Component> {
    /// The dense array of components.
    data: Box<[C]>,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates new component storage with the specified capacity.
    ///
    /// All slots are initialized to the component's default value.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        // Pre-allocate all memory upfront
        let data = vec![C::default(); capacity].into_boxed_slice();

        Self { data }
    }

    /// Returns the capacity of this storage.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Gets a component by entity index, or `None` past the capacity.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.data.get(index)
    }

    /// Gets a mutable component by entity index, or `None` past the capacity.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.data.get_mut(index)
    }

    /// Overwrites the slot at `index`.
    ///
    /// Returns `false` if the index is out of bounds.
    #[inline]
    pub fn set(&mut self, index: usize, component: C) -> bool {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = component;
            true
        } else {
            false
        }
    }

    /// Returns a slice of all components.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.data
    }

    /// Returns a mutable slice of all components.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [C] {
        &mut self.data
    }

    /// Resets a component slot to its default value.
    #[inline]
    pub fn reset(&mut self, index: usize) {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = C::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::Velocity;

    #[test]
    fn test_storage_creation() {
        let storage: ComponentStorage<Velocity> = ComponentStorage::new(128);
        assert_eq!(storage.capacity(), 128);
        assert_eq!(storage.as_slice().len(), 128);
    }

    #[test]
    fn test_storage_get_set_reset() {
        let mut storage: ComponentStorage<Velocity> = ComponentStorage::new(10);

        let vel = Velocity { current: 3.0, target: 4.0 };
        assert!(storage.set(5, vel));
        assert_eq!(*storage.get(5).unwrap(), vel);

        storage.reset(5);
        assert_eq!(*storage.get(5).unwrap(), Velocity::default());
    }

    #[test]
    fn test_storage_bounds() {
        let mut storage: ComponentStorage<Velocity> = ComponentStorage::new(10);
        assert!(storage.get(10).is_none());
        assert!(storage.get(9).is_some());
        assert!(!storage.set(10, Velocity::default()));
        assert!(storage.get_mut(10).is_none());
    }
}
