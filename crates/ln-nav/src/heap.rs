//! Indexable binary min-heap with decrease-key.
//!
//! `std::collections::BinaryHeap` cannot locate or re-key an element once it
//! has been pushed, so stale-entry skipping is the usual workaround.  The
//! pathfinder instead keeps exactly one entry per cell and re-keys it in
//! place: [`MinHeap::find`] locates an entry by the identity of its item
//! (never by cost, so equal costs cannot hide it) and [`MinHeap::update`]
//! re-sifts it.
//!
//! The backing `Vec` is kept across [`MinHeap::clear`] calls, so a heap
//! reused by many searches stops allocating once it has grown to the
//! largest frontier seen.

use std::cmp::Ordering;

use crate::{NavError, NavResult};

/// A totally ordered priority.
///
/// Floats use `total_cmp`, so a `NaN` cost sorts after every finite cost
/// instead of corrupting the heap order.
pub trait HeapCost: Copy {
    fn cost_cmp(&self, other: &Self) -> Ordering;
}

impl HeapCost for f32 {
    #[inline]
    fn cost_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl HeapCost for f64 {
    #[inline]
    fn cost_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

macro_rules! int_heap_cost {
    ($($t:ty),*) => {
        $(impl HeapCost for $t {
            #[inline]
            fn cost_cmp(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }
        })*
    };
}

int_heap_cost!(u32, u64, i32, i64, usize);

/// One heap slot: a priority and the item it belongs to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeapEntry<C, T> {
    pub cost: C,
    pub item: T,
}

/// Binary min-heap over `(cost, item)` pairs.  The root has the smallest
/// cost.
#[derive(Clone, Debug)]
pub struct MinHeap<C, T> {
    entries: Vec<HeapEntry<C, T>>,
}

impl<C, T> Default for MinHeap<C, T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<C: HeapCost, T: PartialEq> MinHeap<C, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in heap (not sorted) order.
    #[inline]
    pub fn entries(&self) -> &[HeapEntry<C, T>] {
        &self.entries
    }

    /// The minimum entry without removing it.
    pub fn peek_min(&self) -> NavResult<&HeapEntry<C, T>> {
        self.entries.first().ok_or(NavError::HeapEmpty)
    }

    /// Append and sift up.
    pub fn insert(&mut self, cost: C, item: T) {
        self.entries.push(HeapEntry { cost, item });
        let last = self.entries.len() - 1;
        self.sift_up(last);
    }

    /// Remove and return the minimum entry.
    pub fn pop_min(&mut self) -> NavResult<HeapEntry<C, T>> {
        if self.entries.is_empty() {
            return Err(NavError::HeapEmpty);
        }
        let min = self.entries.swap_remove(0);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Ok(min)
    }

    /// Index of the entry holding `item`, by linear scan.
    pub fn find(&self, item: &T) -> Option<usize> {
        self.entries.iter().position(|e| e.item == *item)
    }

    /// Replace the cost at `index` and restore heap order: a smaller cost
    /// moves towards the root, a larger one towards the leaves, an equal one
    /// stays put.
    pub fn update(&mut self, index: usize, cost: C) -> NavResult<()> {
        let len = self.entries.len();
        let entry = self.entries.get_mut(index).ok_or(NavError::HeapIndex { index, len })?;
        let previous = entry.cost;
        entry.cost = cost;
        match cost.cost_cmp(&previous) {
            Ordering::Less    => self.sift_up(index),
            Ordering::Greater => self.sift_down(index),
            Ordering::Equal   => {}
        }
        Ok(())
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.entries[i].cost.cost_cmp(&self.entries[parent].cost) != Ordering::Less {
                break;
            }
            self.entries.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut smallest = i;
            if left < len && self.entries[left].cost.cost_cmp(&self.entries[smallest].cost) == Ordering::Less {
                smallest = left;
            }
            if right < len && self.entries[right].cost.cost_cmp(&self.entries[smallest].cost) == Ordering::Less {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.entries.swap(i, smallest);
            i = smallest;
        }
    }
}
