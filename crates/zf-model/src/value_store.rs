//! The value arena.
//!
//! Every published result of every model lives in one flat `Vec<f64>` owned by
//! the `ModelGraph`. Producers get contiguous ranges at `init_results` time;
//! ranges never move afterwards, so a `ValueRef` stays valid for the whole run.

use crate::model::ModelIndex;

/// Contiguous range of values in a [`ValueStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueRef {
    pub offset: usize,
    pub len: usize,
}

impl ValueRef {
    /// Single element `pos` of this range.
    pub fn element(self, pos: usize) -> Option<ValueRef> {
        (pos < self.len).then_some(ValueRef {
            offset: self.offset + pos,
            len: 1,
        })
    }

    pub fn contains(self, offset: usize) -> bool {
        offset >= self.offset && offset < self.offset + self.len
    }
}

/// When a slot gets its value during an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOrigin {
    /// Written from the state vector before any `update()` runs.
    StateDerived,
    /// Written by the owner's `update()`.
    Algebraic,
}

#[derive(Debug, Default)]
pub struct ValueStore {
    values: Vec<f64>,
    owners: Vec<ModelIndex>,
    origins: Vec<SlotOrigin>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocation handle for the results of `owner`.
    pub fn allocator(&mut self, owner: ModelIndex) -> ResultAllocator<'_> {
        ResultAllocator { store: self, owner }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First value of the range.
    pub fn get(&self, r: ValueRef) -> f64 {
        self.values[r.offset]
    }

    pub fn slice(&self, r: ValueRef) -> &[f64] {
        &self.values[r.offset..r.offset + r.len]
    }

    pub fn set(&mut self, r: ValueRef, value: f64) {
        self.values[r.offset] = value;
    }

    pub fn slice_mut(&mut self, r: ValueRef) -> &mut [f64] {
        &mut self.values[r.offset..r.offset + r.len]
    }

    /// Copy `src` into the range; lengths must match.
    pub fn write(&mut self, r: ValueRef, src: &[f64]) {
        self.slice_mut(r).copy_from_slice(src);
    }

    /// Sum of an optional scalar input, 0 when unresolved.
    pub fn get_or_zero(&self, r: Option<ValueRef>) -> f64 {
        r.map_or(0.0, |r| self.get(r))
    }

    pub fn owner(&self, offset: usize) -> Option<ModelIndex> {
        self.owners.get(offset).copied()
    }

    pub fn origin(&self, offset: usize) -> Option<SlotOrigin> {
        self.origins.get(offset).copied()
    }

    fn allocate(&mut self, owner: ModelIndex, len: usize, origin: SlotOrigin) -> ValueRef {
        let offset = self.values.len();
        self.values.resize(offset + len, 0.0);
        self.owners.resize(offset + len, owner);
        self.origins.resize(offset + len, origin);
        ValueRef { offset, len }
    }
}

/// Hands out result ranges owned by one model.
pub struct ResultAllocator<'a> {
    store: &'a mut ValueStore,
    owner: ModelIndex,
}

impl ResultAllocator<'_> {
    pub fn owner(&self) -> ModelIndex {
        self.owner
    }

    /// Range written in `update()`.
    pub fn algebraic(&mut self, len: usize) -> ValueRef {
        self.store.allocate(self.owner, len, SlotOrigin::Algebraic)
    }

    /// Range written from the state vector.
    pub fn state_derived(&mut self, len: usize) -> ValueRef {
        self.store.allocate(self.owner, len, SlotOrigin::StateDerived)
    }

    /// Initial content, e.g. for constant results.
    pub fn fill(&mut self, r: ValueRef, value: f64) {
        self.store.slice_mut(r).fill(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_contiguous_and_tagged() {
        let mut store = ValueStore::new();
        let a = store.allocator(0).algebraic(3);
        let b = store.allocator(1).state_derived(2);
        assert_eq!(a, ValueRef { offset: 0, len: 3 });
        assert_eq!(b, ValueRef { offset: 3, len: 2 });
        assert_eq!(store.len(), 5);
        assert_eq!(store.owner(4), Some(1));
        assert_eq!(store.origin(1), Some(SlotOrigin::Algebraic));
        assert_eq!(store.origin(3), Some(SlotOrigin::StateDerived));
        assert_eq!(store.owner(5), None);
    }

    #[test]
    fn element_refs_and_writes() {
        let mut store = ValueStore::new();
        let v = store.allocator(0).algebraic(3);
        store.write(v, &[1.0, 2.0, 3.0]);
        let second = v.element(1).unwrap();
        assert_eq!(store.get(second), 2.0);
        assert!(v.element(3).is_none());
        assert!(v.contains(2) && !v.contains(3));
        store.set(second, 5.0);
        assert_eq!(store.slice(v), &[1.0, 5.0, 3.0]);
        assert_eq!(store.get_or_zero(None), 0.0);
    }
}
