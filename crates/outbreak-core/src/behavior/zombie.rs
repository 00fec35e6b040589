//! A zombie's unlife: hunger, violence, and the hunt.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use outbreak_events::{EntityId, LocationId, WorldEvent};

use crate::entity::{AgentInbox, DamageMessage, MailboxHandles};
use crate::graph::World;
use crate::item::Item;
use crate::pathfind::nearest_person_step;

use super::Tick;

const TITLE: &str = "ZOMBIE";

/// Behavior task for one zombie.
pub struct ZombieAgent {
    world: Arc<World>,
    id: EntityId,
    inbox: AgentInbox,
    location: LocationId,
    rng: SmallRng,
}

impl ZombieAgent {
    /// Claim the zombie's inbox and starting state. `None` when the inbox
    /// was already claimed or the zombie no longer exists.
    pub fn claim(world: Arc<World>, id: EntityId) -> Option<Self> {
        let location = world.read().find_zombie(id)?.0;
        let inbox = world.claim_inbox(id)?;
        let rng = world.agent_rng(id);
        Some(Self {
            world,
            id,
            inbox,
            location,
            rng,
        })
    }

    /// Tick until death. One thread runs this per zombie.
    pub fn run(mut self) {
        let timing = self.world.config().timing.clone();
        let jitter = self.rng.gen_range(0..=timing.startup_jitter_ms);
        thread::sleep(Duration::from_millis(jitter));
        loop {
            thread::sleep(Duration::from_millis(timing.tick_interval_ms));
            if self.tick() == Tick::Dead {
                return;
            }
        }
    }

    /// One behavior tick. Public so tests can drive an agent by hand.
    pub fn tick(&mut self) -> Tick {
        if let Some(cause) = self.inbox.try_kill() {
            return self.die(cause);
        }

        let starvation = self.world.config().survival.zombie_starvation_threshold;
        let hunger = self.world.with_zombie_mut(self.id, |z| {
            z.hunger += 1;
            z.hunger
        });
        let Some(hunger) = hunger else {
            return match self.inbox.try_kill() {
                Some(cause) => self.die(cause),
                None => Tick::Continue,
            };
        };
        if hunger >= starvation {
            self.inbox.kill_self("starved to death");
        }
        if let Some(cause) = self.inbox.try_kill() {
            return self.die(cause);
        }

        // At most one damage message per tick.
        if let Some(msg) = self.inbox.try_damage() {
            let health = self.world.with_zombie_mut(self.id, |z| {
                z.health -= msg.value as i32;
                z.health
            });
            if let Some(health) = health {
                if health <= 0 {
                    self.inbox
                        .kill_self(format!("was killed by {} with {}", msg.attacker, msg.item));
                } else {
                    self.world.emit(WorldEvent::DamageTaken {
                        id: self.id,
                        who: TITLE.to_string(),
                        amount: msg.value,
                        attacker: msg.attacker,
                        health_left: health,
                    });
                }
            }
            if let Some(cause) = self.inbox.try_kill() {
                return self.die(cause);
            }
        }

        if self.attack_or_infect() {
            return Tick::Continue;
        }
        if self.scavenge() {
            return Tick::Continue;
        }
        self.hunt()
    }

    /// A zombie always goes for people sharing its location: a uniformly
    /// random target, converted outright when the held weapon can finish it,
    /// otherwise damaged. A successful conversion feeds the zombie, fully
    /// restoring its health and hunger.
    fn attack_or_infect(&mut self) -> bool {
        enum Plan {
            Infect(EntityId),
            Strike(EntityId, MailboxHandles, Item),
        }

        let plan = {
            let state = self.world.read();
            let node = state.node(self.location);
            node.people.choose(&mut self.rng).and_then(|target| {
                let me = node.zombies.iter().find(|z| z.id == self.id)?;
                if me.holding.damage() as i32 >= target.health {
                    Some(Plan::Infect(target.id))
                } else {
                    Some(Plan::Strike(
                        target.id,
                        target.mailboxes.clone(),
                        me.holding,
                    ))
                }
            })
        };
        match plan {
            Some(Plan::Infect(victim)) => {
                if self.world.infect_person(victim) {
                    self.world.with_zombie_mut(self.id, |z| {
                        z.health = 100;
                        z.hunger = 0;
                    });
                }
                true
            }
            Some(Plan::Strike(target, handles, weapon)) => {
                handles.send_damage(DamageMessage {
                    value: weapon.damage(),
                    attacker: format!("{} #{}", TITLE, self.id),
                    item: weapon,
                });
                self.world.emit(WorldEvent::Attacked {
                    attacker: self.id,
                    who: TITLE.to_string(),
                    target,
                    weapon: weapon.name().to_string(),
                    damage: weapon.damage(),
                });
                true
            }
            None => false,
        }
    }

    /// An empty-handed zombie grabs any non-water item lying around.
    fn scavenge(&mut self) -> bool {
        let (item, label) = {
            let mut state = self.world.write();
            let node = state.node_mut(self.location);
            let Some(idx) = node.zombies.iter().position(|z| z.id == self.id) else {
                return false;
            };
            if node.zombies[idx].holding != Item::Nothing {
                return false;
            }
            let candidates: Vec<usize> = node
                .items
                .iter()
                .enumerate()
                .filter(|(_, &item)| item != Item::Water)
                .map(|(i, _)| i)
                .collect();
            let Some(&item_idx) = candidates.choose(&mut self.rng) else {
                return false;
            };
            let item = node.items.swap_remove(item_idx);
            node.zombies[idx].holding = item;
            state.mark_dirty();
            (item, state.node(self.location).label())
        };

        self.world.emit(WorldEvent::ItemPickedUp {
            id: self.id,
            who: TITLE.to_string(),
            item: item.name().to_string(),
            location: self.world.location_name(self.location),
        });
        self.world.relabel(self.location, label);
        true
    }

    /// Move one edge along the shortest path toward the nearest person,
    /// paying the break-in penalty when the destination is defended. With no
    /// reachable person the zombie stays put.
    fn hunt(&mut self) -> Tick {
        let plan = {
            let state = self.world.read();
            if state.node(self.location).has_people() {
                // Combat already owns this tick; never walk away from prey.
                None
            } else {
                nearest_person_step(&state, self.location).map(|hop| {
                    let dest = state.node(hop.next);
                    let breakin = if dest.has_people() {
                        self.world.config().movement.breakin_factor * dest.fortification
                    } else {
                        0
                    };
                    (hop.next, hop.edge_weight + breakin)
                })
            }
        };
        let Some((dest, cost)) = plan else {
            return Tick::Continue;
        };

        let travel_unit = self.world.config().timing.travel_unit_ms;
        thread::sleep(Duration::from_millis(u64::from(cost) * travel_unit));

        if let Some(cause) = self.inbox.try_kill() {
            return self.die(cause);
        }
        if let Some((from, to)) = self.world.move_zombie(self.id, self.location, dest) {
            self.location = dest;
            self.world.emit(WorldEvent::Moved {
                id: self.id,
                who: TITLE.to_string(),
                from,
                to,
            });
        }
        Tick::Continue
    }

    fn die(&mut self, cause: String) -> Tick {
        let location = self
            .world
            .remove_zombie(self.id)
            .unwrap_or_else(|| self.world.location_name(self.location));
        self.world.emit(WorldEvent::Died {
            id: self.id,
            who: TITLE.to_string(),
            cause,
            location,
        });
        Tick::Dead
    }
}
