//! Initial survivor population for a freshly loaded map.
//!
//! Maps only persist topology, so the owning application repopulates the
//! world after loading. Locations whose names look like a workplace get
//! matching professionals; everywhere else gets household clusters drawn
//! heavily toward civilians.

use rand::Rng;

use crate::entity::Profession;
use crate::graph::World;

/// How densely to populate the map.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// Chance (out of `occupied_den`) that a non-workplace location has
    /// anyone at all.
    pub occupied_num: u32,
    pub occupied_den: u32,
    /// Largest household cluster.
    pub max_household: u32,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            occupied_num: 2,
            occupied_den: 3,
            max_household: 3,
        }
    }
}

/// Populate every location on the map. Returns the number of people spawned.
/// Behavior threads are not started; call `start_agents` afterwards.
pub fn seed_population(world: &World, config: &SeedConfig, rng: &mut impl Rng) -> u32 {
    let locations: Vec<_> = {
        let state = world.read();
        state
            .locations()
            .map(|l| (l.id, l.name.to_lowercase()))
            .collect()
    };

    let mut spawned = 0;
    for (id, name) in locations {
        if let Some(profession) = profession_for(&name) {
            for _ in 0..rng.gen_range(1..=2) {
                world.add_person(profession, id);
                spawned += 1;
            }
        } else if config.occupied_den > 0 && rng.gen_ratio(config.occupied_num, config.occupied_den)
        {
            for _ in 0..rng.gen_range(1..=config.max_household.max(1)) {
                world.add_person(random_profession(rng), id);
                spawned += 1;
            }
        }
    }
    spawned
}

/// Workplace keyword match, lowercase input.
fn profession_for(name: &str) -> Option<Profession> {
    if name.contains("police") {
        Some(Profession::Police)
    } else if name.contains("fire station") {
        Some(Profession::Firefighter)
    } else if name.contains("church") || name.contains("chapel") {
        Some(Profession::Priest)
    } else if name.contains("doctor") || name.contains("hospital") || name.contains("clinic") {
        Some(Profession::Doctor)
    } else if name.contains("plant") || name.contains("garage") || name.contains("warehouse") {
        Some(Profession::Engineer)
    } else if name.contains("barracks") || name.contains("armory") {
        Some(Profession::Soldier)
    } else {
        None
    }
}

/// Random profession, weighted toward `Other`: rolls past the end of the
/// profession list collapse into the catch-all.
fn random_profession(rng: &mut impl Rng) -> Profession {
    let roll = rng.gen_range(0..20usize);
    *Profession::ALL.get(roll).unwrap_or(&Profession::Other)
}
