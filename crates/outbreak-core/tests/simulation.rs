//! Cross-module behavior tests: combat, infection, survival, hunting, and a
//! concurrent stress run over the full agent stack.
//!
//! Agents are driven tick by tick where determinism matters; the stress test
//! at the bottom runs real threads.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use outbreak_core::persistence::{MapEdge, MapFile, MapNode};
use outbreak_core::{
    Item, PersonAgent, Profession, SimConfig, Tick, World, ZombieAgent,
};
use outbreak_events::{Position, WorldEvent};

/// Config with instant timing and no random wandering, so single-threaded
/// tick driving is deterministic.
fn fast_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.seed = 11;
    config.timing.tick_interval_ms = 2;
    config.timing.startup_jitter_ms = 0;
    config.timing.travel_unit_ms = 0;
    config.survival.starvation_threshold = 100_000;
    config.survival.dehydration_threshold = 100_000;
    config.survival.zombie_starvation_threshold = 100_000;
    config.survival.hungry_at = 100_000;
    config.survival.thirsty_at = 100_000;
    config.movement.move_chance = 0.0;
    config
}

fn manual_world(config: SimConfig) -> (Arc<World>, Receiver<WorldEvent>) {
    let (tx, rx) = mpsc::channel();
    let world = World::new(config, tx);
    world.set_autostart(false);
    (world, rx)
}

fn manual_world_from_map(
    config: SimConfig,
    map: MapFile,
) -> (Arc<World>, Receiver<WorldEvent>) {
    let (tx, rx) = mpsc::channel();
    let world = World::from_map(map, config, tx).unwrap();
    world.set_autostart(false);
    (world, rx)
}

fn node(id: u32, name: &str, items: Vec<Item>) -> MapNode {
    MapNode {
        id,
        name: name.to_string(),
        position: Position::default(),
        fortification: 0,
        items,
    }
}

fn events(rx: &Receiver<WorldEvent>) -> Vec<WorldEvent> {
    rx.try_iter().collect()
}

#[test]
fn test_person_with_pistol_guns_down_a_zombie() {
    let (world, rx) = manual_world(fast_config());
    let loc = world.add_location("General Store", Position::default(), 0);
    let p = world.add_person(Profession::Police, loc);
    let z = world.add_zombie(loc);

    let mut person = PersonAgent::claim(world.clone(), p).unwrap();
    let mut zombie = ZombieAgent::claim(world.clone(), z).unwrap();

    assert_eq!(person.tick(), Tick::Continue); // fires: zombie at 100 takes 50 next drain
    assert_eq!(zombie.tick(), Tick::Continue); // drains to 50, claws back
    assert_eq!(person.tick(), Tick::Continue); // absorbs the claw, fires again
    assert_eq!(zombie.tick(), Tick::Dead); // drains to 0, dies within the tick

    let snap = world.snapshot();
    assert_eq!(snap.zombie_count(), 0);
    assert_eq!(snap.person_count(), 1);
    world.validate_occupancy().unwrap();

    let all = events(&rx);
    let death = all
        .iter()
        .find_map(|e| match e {
            WorldEvent::Died { id, cause, .. } if *id == z => Some(cause.clone()),
            _ => None,
        })
        .expect("zombie death event");
    assert!(death.contains("was killed by POLICE OFFICER"));
    assert!(death.contains("PISTOL"));
}

#[test]
fn test_weak_weapon_damages_but_never_infects() {
    let map = MapFile {
        nodes: vec![node(0, "Hardware Store", vec![Item::RustyPipe])],
        edges: vec![],
    };
    let (world, rx) = manual_world_from_map(fast_config(), map);
    let loc = world.node_by_name("Hardware Store").unwrap();

    let z = world.add_zombie(loc);
    let mut zombie = ZombieAgent::claim(world.clone(), z).unwrap();
    zombie.tick(); // alone: scavenges the pipe

    let p = world.add_person(Profession::Other, loc);
    let mut person = PersonAgent::claim(world.clone(), p).unwrap();

    zombie.tick(); // 25 damage queued: less than 100 health, no conversion
    person.tick(); // absorbs it

    let snap = world.snapshot();
    assert_eq!(snap.person_count(), 1);
    assert_eq!(snap.zombie_count(), 1);
    let store = snap.location(loc).unwrap();
    assert_eq!(store.people[0].health, 75);
    assert_eq!(store.zombies[0].holding, "RUSTY PIPE");

    let all = events(&rx);
    assert!(all
        .iter()
        .any(|e| matches!(e, WorldEvent::DamageTaken { id, .. } if *id == p)));
    assert!(!all
        .iter()
        .any(|e| matches!(e, WorldEvent::Infected { .. })));
}

#[test]
fn test_overwhelming_weapon_converts_instead_of_damaging() {
    let map = MapFile {
        nodes: vec![node(0, "Armory Ruins", vec![Item::Atgm])],
        edges: vec![],
    };
    let (world, rx) = manual_world_from_map(fast_config(), map);
    let loc = world.node_by_name("Armory Ruins").unwrap();

    let z = world.add_zombie(loc);
    let mut zombie = ZombieAgent::claim(world.clone(), z).unwrap();
    zombie.tick(); // scavenges the launcher
    zombie.tick(); // starves a little, nothing else to do

    let p = world.add_person(Profession::Police, loc);
    let mut person = PersonAgent::claim(world.clone(), p).unwrap();

    zombie.tick(); // 200 damage covers 100 health: immediate conversion
    assert_eq!(person.tick(), Tick::Dead); // observes the infection kill

    let snap = world.snapshot();
    assert_eq!(snap.person_count(), 0);
    assert_eq!(snap.zombie_count(), 2);
    let ids: Vec<_> = snap.location(loc).unwrap().zombies.iter().map(|x| x.id).collect();
    assert!(ids.contains(&p), "converted zombie keeps the victim's id");
    world.validate_occupancy().unwrap();

    // The feeding zombie's vitals reset.
    let hunter = snap
        .location(loc)
        .unwrap()
        .zombies
        .iter()
        .find(|x| x.id == z)
        .unwrap();
    assert_eq!(hunter.health, 100);
    assert_eq!(hunter.hunger, 0);

    let all = events(&rx);
    assert!(all
        .iter()
        .any(|e| matches!(e, WorldEvent::Infected { victim, .. } if *victim == p)));
    let deaths = all
        .iter()
        .filter(|e| matches!(e, WorldEvent::Died { id, .. } if *id == p))
        .count();
    assert_eq!(deaths, 1, "one death, acted on exactly once");
}

#[test]
fn test_starvation_is_queued_then_honored() {
    let mut config = fast_config();
    config.survival.starvation_threshold = 3;
    config.survival.dehydration_threshold = 100;
    let (world, rx) = manual_world(config);
    let loc = world.add_location("Trailer 4", Position::default(), 0);
    let p = world.add_person(Profession::Other, loc);
    let mut person = PersonAgent::claim(world.clone(), p).unwrap();

    assert_eq!(person.tick(), Tick::Continue);
    assert_eq!(person.tick(), Tick::Continue);
    // The crossing queues a self-kill; the same tick's mailbox check honors it.
    assert_eq!(person.tick(), Tick::Dead);

    assert_eq!(world.snapshot().person_count(), 0);
    let deaths: Vec<_> = events(&rx)
        .into_iter()
        .filter_map(|e| match e {
            WorldEvent::Died { id, cause, location, .. } if id == p => Some((cause, location)),
            _ => None,
        })
        .collect();
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].0, "starved to death");
    assert_eq!(deaths[0].1, "Trailer 4");
}

#[test]
fn test_dehydration_beats_starvation_when_sooner() {
    let mut config = fast_config();
    config.survival.starvation_threshold = 100;
    config.survival.dehydration_threshold = 2;
    let (world, rx) = manual_world(config);
    let loc = world.add_location("Dry Lot", Position::default(), 0);
    let p = world.add_person(Profession::Other, loc);
    let mut person = PersonAgent::claim(world.clone(), p).unwrap();

    assert_eq!(person.tick(), Tick::Continue);
    assert_eq!(person.tick(), Tick::Dead);
    assert!(events(&rx).iter().any(|e| matches!(
        e,
        WorldEvent::Died { cause, .. } if cause == "died of dehydration"
    )));
}

#[test]
fn test_forage_eat_and_drink_cycle() {
    let mut config = fast_config();
    config.survival.hungry_at = 3;
    config.survival.thirsty_at = 4;
    config.survival.energy_bar_restore = 2;
    config.survival.water_restore = 3;
    let map = MapFile {
        nodes: vec![node(0, "Gas Station", vec![Item::EnergyBar, Item::Water])],
        edges: vec![],
    };
    let (world, rx) = manual_world_from_map(config, map);
    let loc = world.node_by_name("Gas Station").unwrap();
    let p = world.add_person(Profession::Other, loc);
    let mut person = PersonAgent::claim(world.clone(), p).unwrap();
    person.tick(); // not hungry yet: picks the bar off the shelf
    person.tick(); // nothing left to grab (water is a fixture)
    person.tick(); // hunger hits 3: eats the bar, back down to 1
    person.tick(); // thirst hits 4: drinks from the source, down to 1

    let snap = world.snapshot();
    let station = snap.location(loc).unwrap();
    assert_eq!(station.people[0].hunger, 2);
    assert_eq!(station.people[0].thirst, 1);
    // The source never depletes.
    assert!(station.items.contains(&"WATER SOURCE".to_string()));

    let all = events(&rx);
    assert!(all.iter().any(|e| matches!(e, WorldEvent::ItemPickedUp { .. })));
    assert!(all.iter().any(
        |e| matches!(e, WorldEvent::ItemConsumed { item, .. } if item == "ENERGY BAR"),
    ));
    assert!(all.iter().any(|e| matches!(e, WorldEvent::DrankWater { .. })));
}

#[test]
fn test_zombie_hunts_one_edge_at_a_time() {
    let map = MapFile {
        nodes: vec![
            node(0, "A", vec![]),
            node(1, "B", vec![]),
            node(2, "C", vec![]),
        ],
        edges: vec![
            MapEdge { from: 0, to: 1, weight: 1 },
            MapEdge { from: 1, to: 2, weight: 2 },
        ],
    };
    let (world, rx) = manual_world_from_map(fast_config(), map);
    let a = world.node_by_name("A").unwrap();
    let b = world.node_by_name("B").unwrap();
    let c = world.node_by_name("C").unwrap();

    world.add_person(Profession::Other, c);
    let z = world.add_zombie(a);
    let mut zombie = ZombieAgent::claim(world.clone(), z).unwrap();

    zombie.tick();
    assert_eq!(world.snapshot().location(b).unwrap().zombies.len(), 1);
    zombie.tick();
    assert_eq!(world.snapshot().location(c).unwrap().zombies.len(), 1);
    world.validate_occupancy().unwrap();

    // Third tick: prey shares the location, so it attacks instead of moving.
    zombie.tick();
    assert_eq!(world.snapshot().location(c).unwrap().zombies.len(), 1);
    let all = events(&rx);
    assert_eq!(
        all.iter()
            .filter(|e| matches!(e, WorldEvent::Moved { id, .. } if *id == z))
            .count(),
        2
    );
    assert!(all.iter().any(|e| matches!(e, WorldEvent::Attacked { attacker, .. } if *attacker == z)));
}

#[test]
fn test_zombie_waits_when_no_person_is_reachable() {
    let map = MapFile {
        nodes: vec![node(0, "A", vec![]), node(1, "B", vec![])],
        edges: vec![MapEdge { from: 0, to: 1, weight: 1 }],
    };
    let (world, _rx) = manual_world_from_map(fast_config(), map);
    let a = world.node_by_name("A").unwrap();
    let z = world.add_zombie(a);
    let mut zombie = ZombieAgent::claim(world.clone(), z).unwrap();

    zombie.tick();
    zombie.tick();
    assert_eq!(world.snapshot().location(a).unwrap().zombies.len(), 1);
}

#[test]
fn test_editor_infection_kills_the_running_agent_once() {
    let (world, rx) = manual_world(fast_config());
    let loc = world.add_location("Church", Position::default(), 0);
    let p = world.add_person(Profession::Priest, loc);
    let mut person = PersonAgent::claim(world.clone(), p).unwrap();

    assert!(world.infect_person(p));
    assert_eq!(person.tick(), Tick::Dead);

    let snap = world.snapshot();
    assert_eq!(snap.person_count(), 0);
    assert_eq!(snap.zombie_count(), 1);
    assert_eq!(snap.location(loc).unwrap().zombies[0].id, p);
    world.validate_occupancy().unwrap();

    let all = events(&rx);
    assert!(all.iter().any(|e| matches!(
        e,
        WorldEvent::Died { id, cause, .. } if *id == p && cause.contains("infected")
    )));
}

#[test]
fn test_concurrent_stress_keeps_occupancy_consistent() {
    let mut config = fast_config();
    config.timing.tick_interval_ms = 2;
    config.timing.startup_jitter_ms = 2;
    config.movement.move_chance = 0.3;
    config.survival.starvation_threshold = 60;
    config.survival.dehydration_threshold = 80;
    config.survival.zombie_starvation_threshold = 90;

    let (tx, rx) = mpsc::channel();
    let world = World::new(config, tx);

    // Ten fully connected locations.
    let locations: Vec<_> = (0..10)
        .map(|i| world.add_location(format!("Block {i}"), Position::default(), i % 3))
        .collect();
    for (i, &a) in locations.iter().enumerate() {
        for &b in &locations[i + 1..] {
            world.add_path(a, b, 1);
        }
    }

    let mut rng = SmallRng::seed_from_u64(99);
    for i in 0..100 {
        let profession = Profession::ALL[i % Profession::ALL.len()];
        let loc = locations[rng.gen_range(0..locations.len())];
        world.add_person(profession, loc);
    }
    world.start_agents();
    for _ in 0..5 {
        let loc = locations[rng.gen_range(0..locations.len())];
        world.add_zombie(loc);
    }

    // Editor keeps mutating while agents run.
    let extra = world.add_location("New Block", Position::default(), 2);
    world.add_path(extra, locations[0], 1);
    thread::sleep(Duration::from_millis(150));
    world.remove_path(extra, locations[0]);
    world.add_zombie(locations[3]);
    thread::sleep(Duration::from_millis(150));

    world.validate_occupancy().unwrap();
    let snap = world.snapshot();
    assert!(snap.person_count() + snap.zombie_count() <= 106);

    // The run produced events, and the graph lock survived unpoisoned
    // (snapshot and validation above would have panicked otherwise).
    assert!(rx.try_iter().count() > 0);
}
