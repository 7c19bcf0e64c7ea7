//! # Slot Pool
//!
//! Fixed-capacity slab for objects that are spawned and expire every frame.

/// A fixed-capacity slab with a free list of indices.
///
/// Values live in pre-allocated slots. Freeing a value pushes its index onto
/// the free list; the next allocation pops it. Nothing is reallocated while
/// the pool is in use, so per-frame spawn/expire churn costs no heap traffic.
///
/// A pool with capacity zero is valid and always full.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Each effect owns its own pool.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: SlotPool<Spark> = SlotPool::new(500);
///
/// // Allocate - O(1), no heap allocation
/// let handle = pool.allocate(spark)?;
///
/// // Expire everything whose life ran out - O(capacity), no heap traffic
/// pool.retain_mut(|spark| spark.life > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct SlotPool<T> {
    /// The storage array.
    storage: Box<[Option<T>]>,
    /// Free list - indices of available slots.
    free_list: Vec<usize>,
    /// Number of occupied slots.
    len: usize,
}

/// Handle to an occupied slot in a [`SlotPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotHandle {
    /// Index into the pool.
    index: usize,
}

impl SlotHandle {
    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

impl<T> SlotPool<T> {
    /// Creates a new pool with the specified capacity.
    ///
    /// All memory is pre-allocated upfront.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let storage: Vec<Option<T>> = (0..capacity).map(|_| None).collect();

        // Reversed so the lowest index is handed out first
        let free_list: Vec<usize> = (0..capacity).rev().collect();

        Self {
            storage: storage.into_boxed_slice(),
            free_list,
            len: 0,
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Returns the number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if every slot is occupied.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_list.is_empty()
    }

    /// Returns the number of free slots.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Stores a value in a free slot.
    ///
    /// This is a **O(1)** operation with **zero heap allocations**.
    ///
    /// # Returns
    ///
    /// A handle to the slot, or None if the pool is full.
    pub fn allocate(&mut self, value: T) -> Option<SlotHandle> {
        let index = self.free_list.pop()?;

        self.storage[index] = Some(value);
        self.len += 1;

        Some(SlotHandle { index })
    }

    /// Frees an occupied slot.
    ///
    /// # Returns
    ///
    /// The freed value, or None if the handle was invalid or already freed.
    pub fn free(&mut self, handle: SlotHandle) -> Option<T> {
        let value = self.storage.get_mut(handle.index)?.take()?;
        self.free_list.push(handle.index);
        self.len -= 1;

        Some(value)
    }

    /// Gets a reference to an occupied slot.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: SlotHandle) -> Option<&T> {
        self.storage.get(handle.index)?.as_ref()
    }

    /// Gets a mutable reference to an occupied slot.
    #[inline]
    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut T> {
        self.storage.get_mut(handle.index)?.as_mut()
    }

    /// Frees every slot, keeping the memory.
    pub fn clear(&mut self) {
        for slot in self.storage.iter_mut() {
            *slot = None;
        }
        self.free_list.clear();
        self.free_list.extend((0..self.storage.len()).rev());
        self.len = 0;
    }

    /// Visits every occupied slot and frees those for which `keep` returns false.
    ///
    /// The closure may mutate the value before deciding. Freed indices go
    /// back on the free list in the same pass.
    ///
    /// # Returns
    ///
    /// The number of freed slots.
    pub fn retain_mut<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&mut T) -> bool,
    {
        let mut removed = 0;
        for (index, slot) in self.storage.iter_mut().enumerate() {
            let Some(value) = slot.as_mut() else {
                continue;
            };
            if !keep(value) {
                *slot = None;
                self.free_list.push(index);
                removed += 1;
            }
        }
        self.len -= removed;
        removed
    }

    /// Iterates over all occupied slots.
    pub fn iter(&self) -> impl Iterator<Item = (SlotHandle, &T)> {
        self.storage
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|v| (SlotHandle { index }, v)))
    }

    /// Iterates mutably over all occupied slots.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotHandle, &mut T)> {
        self.storage
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|v| (SlotHandle { index }, v)))
    }

    /// Iterates over occupied values only.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.storage.iter().filter_map(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_allocate_free() {
        let mut pool: SlotPool<u32> = SlotPool::new(10);

        let h1 = pool.allocate(42).unwrap();
        assert_eq!(*pool.get(h1).unwrap(), 42);
        assert_eq!(pool.len(), 1);

        let freed = pool.free(h1).unwrap();
        assert_eq!(freed, 42);
        assert!(pool.is_empty());
        assert!(pool.free(h1).is_none());
    }

    #[test]
    fn test_pool_full() {
        let mut pool: SlotPool<u8> = SlotPool::new(2);

        let _ = pool.allocate(1).unwrap();
        let _ = pool.allocate(2).unwrap();
        assert!(pool.is_full());
        assert!(pool.allocate(3).is_none());
    }

    #[test]
    fn test_zero_capacity_is_always_full() {
        let mut pool: SlotPool<u8> = SlotPool::new(0);
        assert!(pool.is_full());
        assert!(pool.allocate(1).is_none());
        assert_eq!(pool.retain_mut(|_| false), 0);
    }

    #[test]
    fn test_pool_reuse() {
        let mut pool: SlotPool<u32> = SlotPool::new(1);

        let h1 = pool.allocate(1).unwrap();
        pool.free(h1);

        let h2 = pool.allocate(2).unwrap();
        assert_eq!(h1.index(), h2.index());
        assert_eq!(*pool.get(h2).unwrap(), 2);
    }

    #[test]
    fn test_retain_mut_recycles_slots() {
        let mut pool: SlotPool<i32> = SlotPool::new(8);
        for i in 0..8 {
            pool.allocate(i);
        }

        let removed = pool.retain_mut(|v| {
            *v -= 4;
            *v >= 0
        });

        assert_eq!(removed, 4);
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.free_count(), 4);
        assert!(pool.values().all(|v| *v >= 0));

        // Freed slots are handed out again without growing the pool
        for i in 0..4 {
            assert!(pool.allocate(i).is_some());
        }
        assert!(pool.is_full());
        assert_eq!(pool.capacity(), 8);
    }

    #[test]
    fn test_clear_resets_free_list() {
        let mut pool: SlotPool<u8> = SlotPool::new(3);
        pool.allocate(1);
        pool.allocate(2);
        pool.clear();

        assert!(pool.is_empty());
        assert_eq!(pool.free_count(), 3);
        assert_eq!(pool.iter().count(), 0);
    }
}
