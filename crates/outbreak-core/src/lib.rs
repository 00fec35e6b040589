//! Concurrent apocalypse-world simulation engine.
//!
//! A weighted undirected graph of locations, populated by human and zombie
//! agents that each run their own behavior loop on their own thread. The
//! graph is the only shared mutable state, guarded by a single
//! readers-writer lock; agents interact through bounded per-agent mailboxes
//! (damage and kill), and zombies hunt by running an early-terminating
//! Dijkstra search toward the nearest person.
//!
//! The surrounding application loads a [`persistence::MapFile`], builds a
//! [`World`], seeds a population, and calls [`World::start_agents`]. Events
//! stream out of the world's log channel as [`outbreak_events::WorldEvent`]s.

pub mod behavior;
pub mod config;
pub mod entity;
pub mod error;
pub mod eventlog;
pub mod graph;
pub mod item;
pub mod pathfind;
pub mod persistence;
pub mod seed;
mod snapshot;

pub use behavior::{PersonAgent, Tick, ZombieAgent};
pub use config::SimConfig;
pub use entity::{DamageMessage, Person, Profession, Zombie};
pub use error::{ConfigError, MapError};
pub use eventlog::EventLog;
pub use graph::{Location, World};
pub use item::Item;
pub use persistence::{MapEdge, MapFile, MapNode};
