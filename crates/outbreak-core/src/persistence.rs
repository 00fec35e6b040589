//! Persisted world topology.
//!
//! Only the static shape of the world survives a save/reload cycle: nodes
//! with their names, positions, fortification weights and initial items, and
//! the weighted paths between them. Live occupants are a runtime concern and
//! are reconstructed (seeded) by the owning application.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use outbreak_events::{Position, WorldEvent};

use crate::config::SimConfig;
use crate::error::MapError;
use crate::graph::World;
use crate::item::Item;

/// On-disk world schema, stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapFile {
    pub nodes: Vec<MapNode>,
    pub edges: Vec<MapEdge>,
}

/// One persisted location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub id: u32,
    pub name: String,
    pub position: Position,
    pub fortification: u32,
    /// Items initially present; a minimal map may omit this.
    #[serde(default)]
    pub items: Vec<Item>,
}

/// One persisted path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapEdge {
    pub from: u32,
    pub to: u32,
    pub weight: u32,
}

impl MapFile {
    /// Read and parse a map file.
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the map as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), MapError> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

impl World {
    /// Build a world from persisted topology. Validation is all-or-nothing:
    /// a malformed map never produces a partially-loaded world.
    pub fn from_map(
        map: MapFile,
        config: SimConfig,
        log: Sender<WorldEvent>,
    ) -> Result<Arc<Self>, MapError> {
        let mut ids = HashSet::new();
        for node in &map.nodes {
            if !ids.insert(node.id) {
                return Err(MapError::DuplicateNode(node.id));
            }
        }
        let mut pairs = HashSet::new();
        for edge in &map.edges {
            if edge.from == edge.to {
                return Err(MapError::SelfEdge(edge.from));
            }
            if !ids.contains(&edge.from) || !ids.contains(&edge.to) {
                return Err(MapError::UnknownEndpoint {
                    from: edge.from,
                    to: edge.to,
                });
            }
            let pair = (edge.from.min(edge.to), edge.from.max(edge.to));
            if !pairs.insert(pair) {
                return Err(MapError::DuplicateEdge {
                    from: edge.from,
                    to: edge.to,
                });
            }
        }

        let world = World::new(config, log);
        {
            let mut state = world.write();
            for node in map.nodes {
                let id = outbreak_events::LocationId(node.id);
                let mut location =
                    crate::graph::Location::new(id, node.name, node.position, node.fortification);
                location.items = node.items;
                state.insert_node(location);
            }
            for edge in map.edges {
                state.insert_edge(
                    outbreak_events::LocationId(edge.from),
                    outbreak_events::LocationId(edge.to),
                    edge.weight,
                );
            }
        }
        Ok(world)
    }

    /// Export the current topology. Occupants are deliberately excluded.
    pub fn to_map(&self) -> MapFile {
        let state = self.read();
        let mut nodes: Vec<MapNode> = state
            .locations()
            .map(|l| MapNode {
                id: l.id.0,
                name: l.name.clone(),
                position: l.position,
                fortification: l.fortification,
                items: l.items.clone(),
            })
            .collect();
        nodes.sort_by_key(|n| n.id);
        let mut edges: Vec<MapEdge> = state
            .edges()
            .into_iter()
            .map(|(a, b, weight)| MapEdge {
                from: a.0,
                to: b.0,
                weight,
            })
            .collect();
        edges.sort_by_key(|e| (e.from, e.to));
        MapFile { nodes, edges }
    }
}
