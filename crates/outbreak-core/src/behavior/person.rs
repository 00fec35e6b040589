//! A person's life: survive, fight, forage, wander.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use outbreak_events::{EntityId, LocationId, WorldEvent};

use crate::config::SurvivalConfig;
use crate::entity::{AgentInbox, DamageMessage, Profession, Zombie};
use crate::graph::World;
use crate::item::Item;

use super::Tick;

/// Behavior task for one person. Owns the receiving halves of the mailboxes;
/// everything other agents can touch lives in the world-resident record.
pub struct PersonAgent {
    world: Arc<World>,
    id: EntityId,
    inbox: AgentInbox,
    profession: Profession,
    /// Mirror of the record's location field, so the death log can name a
    /// place even after the record is gone.
    location: LocationId,
    rng: SmallRng,
}

impl PersonAgent {
    /// Claim the person's inbox and starting state. `None` when the inbox
    /// was already claimed or the person no longer exists.
    pub fn claim(world: Arc<World>, id: EntityId) -> Option<Self> {
        let (profession, location) = {
            let state = world.read();
            let (location, idx) = state.find_person(id)?;
            (state.node(location).people[idx].profession, location)
        };
        let inbox = world.claim_inbox(id)?;
        let rng = world.agent_rng(id);
        Some(Self {
            world,
            id,
            inbox,
            profession,
            location,
            rng,
        })
    }

    /// Tick until death. One thread runs this per living person.
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

        let survival = self.world.config().survival.clone();

        // Survival counters. A lethal crossing queues a kill on the agent's
        // own mailbox; the checks below honor it within this same tick.
        let vitals = self.world.with_person_mut(self.id, |p| {
            p.hunger += 1;
            p.thirst += 1;
            (p.hunger, p.thirst)
        });
        let Some((hunger, thirst)) = vitals else {
            // Record gone: an infection raced this tick. The kill event is
            // already in the mailbox.
            return match self.inbox.try_kill() {
                Some(cause) => self.die(cause),
                None => Tick::Continue,
            };
        };
        if hunger >= survival.starvation_threshold {
            self.inbox.kill_self("starved to death");
        } else if thirst >= survival.dehydration_threshold {
            self.inbox.kill_self("died of dehydration");
        }
        if let Some(cause) = self.inbox.try_kill() {
            return self.die(cause);
        }

        // At most one damage message per tick.
        if let Some(msg) = self.inbox.try_damage() {
            let health = self.world.with_person_mut(self.id, |p| {
                p.health -= msg.value as i32;
                p.health
            });
            if let Some(health) = health {
                if health <= 0 {
                    self.inbox
                        .kill_self(format!("was killed by {} with {}", msg.attacker, msg.item));
                } else {
                    self.world.emit(WorldEvent::DamageTaken {
                        id: self.id,
                        who: self.profession.title().to_string(),
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

        if self.attack_weakest_zombie() {
            return Tick::Continue;
        }
        if self.seek_resources(hunger, thirst, &survival) {
            return Tick::Continue;
        }

        let move_chance = self.world.config().movement.move_chance;
        if self.rng.gen_bool(move_chance) {
            return self.wander();
        }
        Tick::Continue
    }

    /// Attack the weakest zombie sharing this location, if any. Combat
    /// consumes the tick.
    fn attack_weakest_zombie(&mut self) -> bool {
        let plan = {
            let state = self.world.read();
            let node = state.node(self.location);
            let mut weakest: Option<&Zombie> = None;
            for zombie in &node.zombies {
                if weakest.map_or(true, |w| zombie.health < w.health) {
                    weakest = Some(zombie);
                }
            }
            weakest.and_then(|zombie| {
                let me = node.people.iter().find(|p| p.id == self.id)?;
                Some((zombie.id, zombie.mailboxes.clone(), me.best_weapon()))
            })
        };
        let Some((target, handles, weapon)) = plan else {
            return false;
        };

        handles.send_damage(DamageMessage {
            value: weapon.damage(),
            attacker: format!("{} #{}", self.profession, self.id),
            item: weapon,
        });
        if weapon.consumable() {
            self.world.with_person_mut(self.id, |p| p.consume_item(weapon));
        }
        self.world.emit(WorldEvent::Attacked {
            attacker: self.id,
            who: self.profession.title().to_string(),
            target,
            weapon: weapon.name().to_string(),
            damage: weapon.damage(),
        });
        true
    }

    /// Eat, drink, or scavenge. Returns true when a branch ran (and consumed
    /// the tick).
    fn seek_resources(&mut self, hunger: u32, thirst: u32, survival: &SurvivalConfig) -> bool {
        enum Did {
            AteBar,
            DrankSource,
            DrankBottle,
            PickedUp(Item),
        }

        let hungry = hunger >= survival.hungry_at;
        let thirsty = thirst >= survival.thirsty_at;

        let (did, label) = {
            let mut state = self.world.write();
            let node = state.node_mut(self.location);
            let Some(idx) = node.people.iter().position(|p| p.id == self.id) else {
                return false;
            };
            let did = if hungry && node.people[idx].holding(Item::EnergyBar) {
                node.people[idx].consume_item(Item::EnergyBar);
                node.people[idx].hunger =
                    node.people[idx].hunger.saturating_sub(survival.energy_bar_restore);
                Some(Did::AteBar)
            } else if thirsty && node.items.contains(&Item::Water) {
                // Water sources are fixtures: drinking costs nothing and
                // leaves the source in place.
                node.people[idx].thirst =
                    node.people[idx].thirst.saturating_sub(survival.water_restore);
                Some(Did::DrankSource)
            } else if thirsty && node.people[idx].holding(Item::WaterBottle) {
                node.people[idx].consume_item(Item::WaterBottle);
                node.people[idx].thirst =
                    node.people[idx].thirst.saturating_sub(survival.water_restore);
                Some(Did::DrankBottle)
            } else if node.people[idx].items.len() < survival.inventory_capacity {
                let candidates: Vec<usize> = node
                    .items
                    .iter()
                    .enumerate()
                    .filter(|(_, &item)| item != Item::Water)
                    .map(|(i, _)| i)
                    .collect();
                match candidates.choose(&mut self.rng) {
                    Some(&item_idx) => {
                        let item = node.items.swap_remove(item_idx);
                        node.people[idx].items.push(item);
                        Some(Did::PickedUp(item))
                    }
                    None => None,
                }
            } else {
                None
            };
            let Some(did) = did else {
                return false;
            };
            let label = if matches!(did, Did::PickedUp(_)) {
                state.mark_dirty();
                Some(state.node(self.location).label())
            } else {
                None
            };
            (did, label)
        };

        let who = self.profession.title().to_string();
        match did {
            Did::AteBar => self.world.emit(WorldEvent::ItemConsumed {
                id: self.id,
                who,
                item: Item::EnergyBar.name().to_string(),
            }),
            Did::DrankSource => self.world.emit(WorldEvent::DrankWater {
                id: self.id,
                who,
                location: self.world.location_name(self.location),
            }),
            Did::DrankBottle => self.world.emit(WorldEvent::ItemConsumed {
                id: self.id,
                who,
                item: Item::WaterBottle.name().to_string(),
            }),
            Did::PickedUp(item) => self.world.emit(WorldEvent::ItemPickedUp {
                id: self.id,
                who,
                item: item.name().to_string(),
                location: self.world.location_name(self.location),
            }),
        }
        if let Some(label) = label {
            self.world.relabel(self.location, label);
        }
        true
    }

    /// Travel to a random neighbor, honoring the edge weight as travel time.
    fn wander(&mut self) -> Tick {
        let plan = {
            let state = self.world.read();
            let neighbors: Vec<LocationId> = state.neighbors(self.location).collect();
            neighbors
                .choose(&mut self.rng)
                .map(|&dest| (dest, state.edge_weight(self.location, dest)))
        };
        let Some((dest, weight)) = plan else {
            return Tick::Continue;
        };

        let travel_unit = self.world.config().timing.travel_unit_ms;
        thread::sleep(Duration::from_millis(u64::from(weight) * travel_unit));

        // A kill that arrived in transit wins over the move; the agent must
        // never appear at the destination after dying.
        if let Some(cause) = self.inbox.try_kill() {
            return self.die(cause);
        }
        if let Some((from, to)) = self.world.move_person(self.id, self.location, dest) {
            self.location = dest;
            self.world.emit(WorldEvent::Moved {
                id: self.id,
                who: self.profession.title().to_string(),
                from,
                to,
            });
        }
        Tick::Continue
    }

    fn die(&mut self, cause: String) -> Tick {
        // Removal is idempotent: an infection may already have erased the
        // record, in which case the cached location names the place of death.
        let location = self
            .world
            .remove_person(self.id)
            .unwrap_or_else(|| self.world.location_name(self.location));
        self.world.emit(WorldEvent::Died {
            id: self.id,
            who: self.profession.title().to_string(),
            cause,
            location,
        });
        Tick::Dead
    }
}
