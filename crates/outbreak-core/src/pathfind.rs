//! Zombie hunting: shortest path toward the nearest location holding a
//! person.
//!
//! Dijkstra over the graph's non-negative edge weights, terminating early the
//! first time the extracted minimum-distance location has at least one person
//! present. The caller only needs the first hop — zombies re-plan every tick
//! they move — so the predecessor chain is walked back to the edge leaving
//! the start.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use outbreak_events::LocationId;

use crate::graph::GraphState;

/// One planned hop toward the nearest person.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    /// The neighbor to move to this tick.
    pub next: LocationId,
    /// Weight of the edge being crossed.
    pub edge_weight: u32,
    /// The location the path ultimately leads to.
    pub target: LocationId,
}

/// First step of the shortest path from `from` to the nearest location with
/// at least one person. `None` when no person is reachable; the start itself
/// is never a target. Ties between equally near locations are broken
/// arbitrarily.
///
/// Runs entirely against an already-acquired read guard: the search only
/// reads structure and occupancy.
pub fn nearest_person_step(state: &GraphState, from: LocationId) -> Option<Hop> {
    let mut dist: HashMap<LocationId, u32> = HashMap::new();
    let mut prev: HashMap<LocationId, LocationId> = HashMap::new();
    let mut heap: BinaryHeap<Reverse<(u32, LocationId)>> = BinaryHeap::new();

    dist.insert(from, 0);
    heap.push(Reverse((0, from)));

    while let Some(Reverse((d, node))) = heap.pop() {
        if dist.get(&node).is_some_and(|&best| d > best) {
            continue; // stale heap entry
        }
        if node != from && state.node(node).has_people() {
            let mut hop = node;
            while prev[&hop] != from {
                hop = prev[&hop];
            }
            return Some(Hop {
                next: hop,
                edge_weight: state.edge_weight(from, hop),
                target: node,
            });
        }
        for neighbor in state.neighbors(node) {
            let weight = state.edge_weight(node, neighbor);
            let candidate = d.saturating_add(weight);
            if dist.get(&neighbor).is_none_or(|&best| candidate < best) {
                dist.insert(neighbor, candidate);
                prev.insert(neighbor, node);
                heap.push(Reverse((candidate, neighbor)));
            }
        }
    }
    None
}
