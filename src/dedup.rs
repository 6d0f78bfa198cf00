// src/dedup.rs
//! Batch-level collapse of deals sharing an identity key.

use indexmap::IndexMap;

use crate::model::{Deal, DealKey};

/// Last occurrence of a key wins; output follows first-seen key order.
pub fn dedup(deals: Vec<Deal>) -> Vec<Deal> {
    let mut by_key: IndexMap<DealKey, Deal> = IndexMap::with_capacity(deals.len());
    for d in deals {
        // `insert` on an existing key swaps the value but keeps its slot.
        by_key.insert(d.key(), d);
    }
    by_key.into_values().collect()
}
