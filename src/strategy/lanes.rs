//! Conflict-free partitioning of a transfer batch
//!
//! A lane is a set of requests whose accounts are connected: two requests
//! share a lane when they touch a common account, directly or through a
//! chain of other requests in the batch. Lanes have pairwise disjoint
//! account sets, so they can run concurrently without one lane's writes
//! ever invalidating another lane's reads.
//!
//! Within a lane, requests keep their batch order. Running a lane
//! sequentially therefore gives every request exactly the outcome it would
//! get from a fully sequential run.

use std::collections::HashMap;

use crate::types::TransferRequest;

/// Union-find over account slots
#[derive(Debug, Default)]
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn make_set(&mut self) -> usize {
        let slot = self.parent.len();
        self.parent.push(slot);
        slot
    }

    fn find(&mut self, slot: usize) -> usize {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Path compression
        let mut current = slot;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }

        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            // Lower slot wins so roots follow first appearance
            let (low, high) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            self.parent[high] = low;
        }
    }
}

/// Partition a batch into lanes of request indices
///
/// # Arguments
///
/// * `batch` - Requests in file order
///
/// # Returns
///
/// One vector of indices into `batch` per lane. Indices inside a lane are
/// ascending, and lanes are ordered by their first request.
///
/// # Guarantees
///
/// - Every index appears in exactly one lane
/// - No two lanes touch a common account id
pub fn partition_into_lanes(batch: &[TransferRequest]) -> Vec<Vec<usize>> {
    let mut sets = DisjointSets::default();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut request_slots = Vec::with_capacity(batch.len());

    for request in batch {
        let source = *slots
            .entry(request.source_account_id.as_str())
            .or_insert_with(|| sets.make_set());
        let dest = *slots
            .entry(request.dest_account_id.as_str())
            .or_insert_with(|| sets.make_set());
        sets.union(source, dest);
        request_slots.push(source);
    }

    let mut lane_of_root: HashMap<usize, usize> = HashMap::new();
    let mut lanes: Vec<Vec<usize>> = Vec::new();

    for (index, slot) in request_slots.into_iter().enumerate() {
        let root = sets.find(slot);
        let lane = *lane_of_root.entry(root).or_insert_with(|| {
            lanes.push(Vec::new());
            lanes.len() - 1
        });
        lanes[lane].push(index);
    }

    lanes
}
