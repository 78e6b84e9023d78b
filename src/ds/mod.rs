pub mod bucket_lists;
pub mod slot_arena;

pub use bucket_lists::{BucketEntryIter, BucketIter, BucketLists};
pub use slot_arena::{SlotArena, SlotId};
