//! People, zombies, and the mailboxes other agents reach them through.
//!
//! The structs here are the world-resident records: they live inside a
//! location's occupant list behind the graph lock. The behavior thread for an
//! agent holds the receiving half of its mailboxes (`AgentInbox`); everyone
//! else holds the sending half through the record's `MailboxHandles`.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use outbreak_events::{EntityId, LocationId};

use crate::config::MailboxConfig;
use crate::item::Item;

/// What a person did before the outbreak. Decides the starting loadout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    Police,
    Firefighter,
    Soldier,
    Doctor,
    Engineer,
    Priest,
    Other,
}

impl Profession {
    pub const ALL: [Profession; 7] = [
        Profession::Police,
        Profession::Firefighter,
        Profession::Soldier,
        Profession::Doctor,
        Profession::Engineer,
        Profession::Priest,
        Profession::Other,
    ];

    /// Display title, used in log lines.
    pub fn title(self) -> &'static str {
        match self {
            Profession::Police => "POLICE OFFICER",
            Profession::Firefighter => "FIREFIGHTER",
            Profession::Soldier => "SOLDIER",
            Profession::Doctor => "DOCTOR",
            Profession::Engineer => "ENGINEER",
            Profession::Priest => "PRIEST",
            Profession::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for Profession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// A damage delivery from one agent to another.
#[derive(Debug, Clone)]
pub struct DamageMessage {
    pub value: u32,
    /// Display description of the attacker, e.g. "SOLDIER #12".
    pub attacker: String,
    pub item: Item,
}

/// Sending halves of an agent's mailboxes. Cloned by anyone who wants to
/// deliver damage or a kill cause; lives in the world-resident record.
#[derive(Debug, Clone)]
pub struct MailboxHandles {
    damage: SyncSender<DamageMessage>,
    kill: SyncSender<String>,
}

impl MailboxHandles {
    /// Non-blocking delivery. A full mailbox drops the message with a warning
    /// rather than stalling the attacker.
    pub fn send_damage(&self, msg: DamageMessage) {
        match self.damage.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(msg)) => {
                warn!(attacker = %msg.attacker, "damage mailbox full, dropping message");
            }
            // Receiver gone: the agent is already tearing itself down.
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Non-blocking kill delivery. A full kill mailbox already guarantees a
    /// pending kill, so dropping is harmless.
    pub fn send_kill(&self, cause: impl Into<String>) {
        let _ = self.kill.try_send(cause.into());
    }
}

/// Receiving halves of an agent's mailboxes, claimed exactly once by the
/// agent's own behavior thread. Checks are non-blocking: a tick never waits
/// for a message that is not there.
#[derive(Debug)]
pub struct AgentInbox {
    damage: Receiver<DamageMessage>,
    kill: Receiver<String>,
    self_kill: SyncSender<String>,
}

impl AgentInbox {
    /// Pending kill cause, if any.
    pub fn try_kill(&self) -> Option<String> {
        self.kill.try_recv().ok()
    }

    /// At most one pending damage message.
    pub fn try_damage(&self) -> Option<DamageMessage> {
        self.damage.try_recv().ok()
    }

    /// Queue a kill for this agent itself, honored at its next mailbox check.
    /// Dropped silently when the mailbox is full (a kill is already pending).
    pub fn kill_self(&self, cause: impl Into<String>) {
        let _ = self.self_kill.try_send(cause.into());
    }
}

/// Create the linked mailbox pair for a new agent.
pub fn mailboxes(config: &MailboxConfig) -> (MailboxHandles, AgentInbox) {
    let (damage_tx, damage_rx) = sync_channel(config.damage_capacity);
    let (kill_tx, kill_rx) = sync_channel(config.kill_capacity);
    let handles = MailboxHandles {
        damage: damage_tx,
        kill: kill_tx.clone(),
    };
    let inbox = AgentInbox {
        damage: damage_rx,
        kill: kill_rx,
        self_kill: kill_tx,
    };
    (handles, inbox)
}

/// A living person, resident in its location's people list.
#[derive(Debug)]
pub struct Person {
    pub id: EntityId,
    pub health: i32,
    pub hunger: u32,
    pub thirst: u32,
    pub items: Vec<Item>,
    pub profession: Profession,
    pub location: LocationId,
    pub mailboxes: MailboxHandles,
}

impl Person {
    /// Build a person with a freshly drawn loadout. The inbox goes to the
    /// world's registry until the behavior thread claims it.
    pub fn new(
        id: EntityId,
        profession: Profession,
        location: LocationId,
        mailbox_config: &MailboxConfig,
        rng: &mut impl Rng,
    ) -> (Self, AgentInbox) {
        let (handles, inbox) = mailboxes(mailbox_config);
        let person = Self {
            id,
            health: 100,
            hunger: 0,
            thirst: 0,
            items: starting_loadout(profession, rng),
            profession,
            location,
            mailboxes: handles,
        };
        (person, inbox)
    }

    pub fn holding(&self, item: Item) -> bool {
        self.items.contains(&item)
    }

    /// The held item with the highest damage; first occurrence wins ties.
    /// `Nothing` when the inventory is empty.
    pub fn best_weapon(&self) -> Item {
        let mut iter = self.items.iter();
        let Some(&first) = iter.next() else {
            return Item::Nothing;
        };
        let mut best = first;
        for &item in iter {
            if item.damage() > best.damage() {
                best = item;
            }
        }
        best
    }

    /// Remove exactly one matching instance from the inventory.
    pub fn consume_item(&mut self, item: Item) -> bool {
        match self.items.iter().position(|&i| i == item) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }
}

/// A zombie, resident in its location's zombie list.
#[derive(Debug)]
pub struct Zombie {
    pub id: EntityId,
    pub health: i32,
    pub hunger: u32,
    pub holding: Item,
    pub location: LocationId,
    pub mailboxes: MailboxHandles,
}

impl Zombie {
    /// A fresh zombie, spawned empty-handed by the editor.
    pub fn new(
        id: EntityId,
        location: LocationId,
        mailbox_config: &MailboxConfig,
    ) -> (Self, AgentInbox) {
        let (handles, inbox) = mailboxes(mailbox_config);
        let zombie = Self {
            id,
            health: 100,
            hunger: 0,
            holding: Item::Nothing,
            location,
            mailboxes: handles,
        };
        (zombie, inbox)
    }

    /// A zombie converted from a person. Keeps the victim's id and carries
    /// one random item from the victim's inventory, or nothing.
    pub fn from_person(
        victim: &Person,
        mailbox_config: &MailboxConfig,
        rng: &mut impl Rng,
    ) -> (Self, AgentInbox) {
        let holding = victim.items.choose(rng).copied().unwrap_or(Item::Nothing);
        let (handles, inbox) = mailboxes(mailbox_config);
        let zombie = Self {
            id: victim.id,
            health: 100,
            hunger: 0,
            holding,
            location: victim.location,
            mailboxes: handles,
        };
        (zombie, inbox)
    }
}

/// Starting inventory for a freshly spawned person.
///
/// Profession-specific draw, then profession-independent extras.
pub fn starting_loadout(profession: Profession, rng: &mut impl Rng) -> Vec<Item> {
    let mut items = Vec::new();
    match profession {
        Profession::Police => items.push(Item::Pistol),
        Profession::Firefighter => {
            if rng.gen_ratio(1, 5) {
                items.push(Item::Chainsaw);
            } else {
                items.push(Item::Hatchet);
            }
        }
        Profession::Soldier => {
            items.push(Item::Rifle);
            if rng.gen_ratio(1, 5) {
                if rng.gen_ratio(1, 3) {
                    items.push(Item::Atgm);
                } else {
                    items.push(Item::Rpg);
                }
            }
        }
        Profession::Doctor => {
            items.extend([
                Item::Bandage,
                Item::Bandage,
                Item::Bandage,
                Item::Bandage,
                Item::Hacksaw,
            ]);
        }
        Profession::Engineer => items.extend([Item::Hatchet, Item::Wrench]),
        Profession::Priest => items.push(Item::HolyWater),
        Profession::Other => {}
    }

    if rng.gen_ratio(1, 3) {
        items.push(Item::EnergyBar);
    }
    if rng.gen_ratio(1, 2) {
        items.push(Item::WaterBottle);
    }
    if rng.gen_ratio(1, 10) {
        items.push(Item::RustyPipe);
    }
    items
}
