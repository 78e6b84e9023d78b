//! A fixed set of intrusive doubly linked lists sharing one `SlotArena`.
//!
//! Every node lives in a single arena and is linked into exactly one of the
//! lists ("buckets") by `SlotId`. Because the arena is shared, a node can be
//! relocated from one bucket to the back of another by relinking only; the
//! stored value never moves and its `SlotId` stays valid.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌────────┬──────────────────────────────────────────────────────┐
//!   │ SlotId │ Node { value, bucket, prev, next }                   │
//!   ├────────┼──────────────────────────────────────────────────────┤
//!   │ id_1   │ { value: A, bucket: 0, prev: None, next: Some(id_3) }│
//!   │ id_2   │ { value: B, bucket: 2, prev: None, next: None }      │
//!   │ id_3   │ { value: C, bucket: 0, prev: Some(id_1), next: None }│
//!   └────────┴──────────────────────────────────────────────────────┘
//!
//!   bucket 0: head ─► [id_1] ◄──► [id_3] ◄── tail
//!   bucket 1: (empty)
//!   bucket 2: head ─► [id_2] ◄── tail
//! ```
//!
//! ## Operations
//! - `push_back(bucket, v)`: allocate + attach to the bucket's tail
//! - `relocate_to_back(id, bucket)`: detach + attach to another bucket's tail
//! - `pop_front(bucket)` / `remove(id)`: detach + free slot in arena
//!
//! All of the above are O(1). `debug_validate_invariants()` is available in
//! debug/test builds.

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Node<T> {
    value: T,
    bucket: usize,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Links {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

/// `N` intrusive lists over a shared arena; `N` is fixed at construction.
#[derive(Debug)]
pub struct BucketLists<T> {
    arena: SlotArena<Node<T>>,
    buckets: Box<[Links]>,
}

impl<T> BucketLists<T> {
    /// Creates `bucket_count` empty buckets.
    pub fn new(bucket_count: usize) -> Self {
        Self::with_capacity(bucket_count, 0)
    }

    /// Creates `bucket_count` empty buckets with reserved node capacity.
    pub fn with_capacity(bucket_count: usize, capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            buckets: vec![Links::default(); bucket_count].into_boxed_slice(),
        }
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of nodes across all buckets.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of nodes linked into `bucket`.
    pub fn bucket_len(&self, bucket: usize) -> usize {
        self.buckets.get(bucket).map_or(0, |links| links.len)
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.arena.contains(id)
    }

    /// Returns the bucket `id` is currently linked into.
    pub fn bucket_of(&self, id: SlotId) -> Option<usize> {
        self.arena.get(id).map(|node| node.bucket)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    /// Returns the oldest value of `bucket`.
    pub fn front(&self, bucket: usize) -> Option<&T> {
        self.front_id(bucket).and_then(|id| self.get(id))
    }

    pub fn front_id(&self, bucket: usize) -> Option<SlotId> {
        self.buckets.get(bucket).and_then(|links| links.head)
    }

    /// Returns the most recently appended value of `bucket`.
    pub fn back(&self, bucket: usize) -> Option<&T> {
        self.back_id(bucket).and_then(|id| self.get(id))
    }

    pub fn back_id(&self, bucket: usize) -> Option<SlotId> {
        self.buckets.get(bucket).and_then(|links| links.tail)
    }

    /// Iterates `bucket` from front (oldest) to back.
    pub fn iter(&self, bucket: usize) -> BucketIter<'_, T> {
        BucketIter {
            lists: self,
            current: self.front_id(bucket),
        }
    }

    /// Iterates `(SlotId, &T)` pairs of `bucket` from front to back.
    pub fn iter_entries(&self, bucket: usize) -> BucketEntryIter<'_, T> {
        BucketEntryIter {
            lists: self,
            current: self.front_id(bucket),
        }
    }

    /// Appends `value` to the back of `bucket` and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics if `bucket` is out of range.
    pub fn push_back(&mut self, bucket: usize, value: T) -> SlotId {
        assert!(
            bucket < self.buckets.len(),
            "bucket {bucket} out of range for {} buckets",
            self.buckets.len()
        );
        let id = self.arena.insert(Node {
            value,
            bucket,
            prev: None,
            next: None,
        });
        self.attach_back(bucket, id);
        id
    }

    /// Removes and returns the front value of `bucket`.
    pub fn pop_front(&mut self, bucket: usize) -> Option<T> {
        let id = self.front_id(bucket)?;
        self.remove(id)
    }

    /// Unlinks `id` from its bucket and returns its value.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.detach(id)?;
        self.arena.remove(id).map(|node| node.value)
    }

    /// Moves `id` to the back of `bucket` (which may be its current bucket).
    /// Returns `false` if `id` is not present or `bucket` is out of range.
    pub fn relocate_to_back(&mut self, id: SlotId, bucket: usize) -> bool {
        if bucket >= self.buckets.len() {
            return false;
        }
        let Some(current) = self.bucket_of(id) else {
            return false;
        };
        if current == bucket && self.buckets[bucket].tail == Some(id) {
            return true;
        }
        self.detach(id);
        self.attach_back(bucket, id);
        true
    }

    /// Drops every node; bucket count is unchanged.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.buckets.fill(Links::default());
    }

    fn detach(&mut self, id: SlotId) -> Option<()> {
        let (bucket, prev, next) = {
            let node = self.arena.get(id)?;
            (node.bucket, node.prev, node.next)
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_node) = self.arena.get_mut(prev_id) {
                    prev_node.next = next;
                }
            },
            None => self.buckets[bucket].head = next,
        }

        match next {
            Some(next_id) => {
                if let Some(next_node) = self.arena.get_mut(next_id) {
                    next_node.prev = prev;
                }
            },
            None => self.buckets[bucket].tail = prev,
        }

        self.buckets[bucket].len -= 1;
        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = None;
        }
        Some(())
    }

    fn attach_back(&mut self, bucket: usize, id: SlotId) {
        let old_tail = self.buckets[bucket].tail;
        if let Some(node) = self.arena.get_mut(id) {
            node.bucket = bucket;
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(tail_id) => {
                if let Some(tail_node) = self.arena.get_mut(tail_id) {
                    tail_node.next = Some(id);
                }
            },
            None => self.buckets[bucket].head = Some(id),
        }
        let links = &mut self.buckets[bucket];
        links.tail = Some(id);
        links.len += 1;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let mut total = 0usize;
        for (bucket, links) in self.buckets.iter().enumerate() {
            if links.head.is_none() || links.tail.is_none() {
                assert!(links.head.is_none());
                assert!(links.tail.is_none());
                assert_eq!(links.len, 0);
                continue;
            }

            let mut count = 0usize;
            let mut current = links.head;
            let mut prev = None;
            while let Some(id) = current {
                let node = self.arena.get(id).expect("node missing");
                assert_eq!(node.bucket, bucket);
                assert_eq!(node.prev, prev);
                if node.next.is_none() {
                    assert_eq!(links.tail, Some(id));
                }
                prev = Some(id);
                current = node.next;
                count += 1;
                assert!(count <= self.arena.len());
            }
            assert_eq!(count, links.len);
            total += count;
        }
        assert_eq!(total, self.arena.len());
    }
}

/// Iterator over the values of one bucket, front to back.
pub struct BucketIter<'a, T> {
    lists: &'a BucketLists<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for BucketIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.lists.arena.get(id)?;
        self.current = node.next;
        Some(&node.value)
    }
}

/// Iterator over `(SlotId, &T)` pairs of one bucket, front to back.
pub struct BucketEntryIter<'a, T> {
    lists: &'a BucketLists<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for BucketEntryIter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.lists.arena.get(id)?;
        self.current = node.next;
        Some((id, &node.value))
    }
}
