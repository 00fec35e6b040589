//! Snapshot Types
//!
//! Read-only serializable views of the world, taken under the graph's read
//! lock. Renderers and inspectors consume these instead of reaching into
//! live simulation state.

use serde::{Deserialize, Serialize};

use crate::ids::{EntityId, LocationId, Position};

/// The whole world at one instant: every location and every path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub locations: Vec<LocationSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

impl WorldSnapshot {
    /// Total number of living people across all locations.
    pub fn person_count(&self) -> usize {
        self.locations.iter().map(|l| l.people.len()).sum()
    }

    /// Total number of zombies across all locations.
    pub fn zombie_count(&self) -> usize {
        self.locations.iter().map(|l| l.zombies.len()).sum()
    }

    /// Find a location by id.
    pub fn location(&self, id: LocationId) -> Option<&LocationSnapshot> {
        self.locations.iter().find(|l| l.id == id)
    }
}

/// One location with its occupants and loose items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub id: LocationId,
    pub name: String,
    /// Display label: name, distinct item codes, fortification weight.
    pub label: String,
    pub position: Position,
    pub fortification: u32,
    #[serde(default)]
    pub people: Vec<PersonSnapshot>,
    #[serde(default)]
    pub zombies: Vec<ZombieSnapshot>,
    #[serde(default)]
    pub items: Vec<String>,
}

/// A person's externally visible state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonSnapshot {
    pub id: EntityId,
    pub profession: String,
    pub health: i32,
    pub hunger: u32,
    pub thirst: u32,
    #[serde(default)]
    pub items: Vec<String>,
}

/// A zombie's externally visible state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZombieSnapshot {
    pub id: EntityId,
    pub health: i32,
    pub hunger: u32,
    pub holding: String,
}

/// One undirected path between two locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub from: LocationId,
    pub to: LocationId,
    pub weight: u32,
}
