//! World Event Types
//!
//! Everything the engine reports on its log channel. Payloads are plain
//! strings and ids so this crate stays free of simulation types; the
//! `Display` impl renders the human-readable line a log sink would print.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::EntityId;

/// A single observable occurrence in the simulated world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorldEvent {
    /// A person entered the world.
    PersonSpawned {
        id: EntityId,
        profession: String,
        location: String,
    },
    /// A zombie entered the world (editor spawn, not infection).
    ZombieSpawned { id: EntityId, location: String },
    /// An agent finished traveling along a path.
    Moved {
        id: EntityId,
        who: String,
        from: String,
        to: String,
    },
    /// An agent delivered a blow to another agent.
    Attacked {
        attacker: EntityId,
        who: String,
        target: EntityId,
        weapon: String,
        damage: u32,
    },
    /// An agent absorbed a damage message and survived.
    DamageTaken {
        id: EntityId,
        who: String,
        amount: u32,
        attacker: String,
        health_left: i32,
    },
    /// An agent's task observed its kill event and left the world.
    Died {
        id: EntityId,
        who: String,
        cause: String,
        location: String,
    },
    /// A person was converted into a zombie at its location.
    Infected { victim: EntityId, location: String },
    /// An agent moved a loose item into its hands or inventory.
    ItemPickedUp {
        id: EntityId,
        who: String,
        item: String,
        location: String,
    },
    /// An agent used up a consumable from its inventory.
    ItemConsumed {
        id: EntityId,
        who: String,
        item: String,
    },
    /// A person drank from a location's water source.
    DrankWater {
        id: EntityId,
        who: String,
        location: String,
    },
}

impl fmt::Display for WorldEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldEvent::PersonSpawned {
                id,
                profession,
                location,
            } => write!(f, "{profession} #{id} appears at {location}"),
            WorldEvent::ZombieSpawned { id, location } => {
                write!(f, "ZOMBIE #{id} rises at {location}")
            }
            WorldEvent::Moved { id, who, from, to } => {
                write!(f, "{who} #{id} moves from {from} to {to}")
            }
            WorldEvent::Attacked {
                attacker,
                who,
                target,
                weapon,
                damage,
            } => write!(
                f,
                "{who} #{attacker} attacks #{target} with {weapon} ({damage} damage)"
            ),
            WorldEvent::DamageTaken {
                id,
                who,
                amount,
                attacker,
                health_left,
            } => write!(
                f,
                "{who} #{id} takes {amount} damage from {attacker} ({health_left} health left)"
            ),
            WorldEvent::Died {
                id,
                who,
                cause,
                location,
            } => write!(f, "{who} #{id} {cause} at {location}"),
            WorldEvent::Infected { victim, location } => {
                write!(f, "#{victim} rises as a ZOMBIE at {location}")
            }
            WorldEvent::ItemPickedUp {
                id,
                who,
                item,
                location,
            } => write!(f, "{who} #{id} picks up {item} at {location}"),
            WorldEvent::ItemConsumed { id, who, item } => {
                write!(f, "{who} #{id} consumes {item}")
            }
            WorldEvent::DrankWater { id, who, location } => {
                write!(f, "{who} #{id} drinks from the water source at {location}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_death_line_names_id_cause_and_location() {
        let ev = WorldEvent::Died {
            id: EntityId(4),
            who: "POLICE OFFICER".to_string(),
            cause: "starved to death".to_string(),
            location: "General Store".to_string(),
        };
        assert_eq!(
            ev.to_string(),
            "POLICE OFFICER #4 starved to death at General Store"
        );
    }

    #[test]
    fn test_movement_line() {
        let ev = WorldEvent::Moved {
            id: EntityId(9),
            who: "ZOMBIE".to_string(),
            from: "Church".to_string(),
            to: "Gas Station".to_string(),
        };
        assert_eq!(ev.to_string(), "ZOMBIE #9 moves from Church to Gas Station");
    }

    #[test]
    fn test_event_serde_round_trip() {
        let ev = WorldEvent::Attacked {
            attacker: EntityId(1),
            who: "SOLDIER".to_string(),
            target: EntityId(2),
            weapon: "RIFLE".to_string(),
            damage: 60,
        };
        let json = serde_json::to_string(&ev).unwrap();
        let back: WorldEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }

    #[test]
    fn test_event_json_tag() {
        let ev = WorldEvent::Infected {
            victim: EntityId(3),
            location: "House 7".to_string(),
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"type\":\"infected\""));
    }
}
