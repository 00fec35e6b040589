//! The shared world graph: locations, paths, occupants, and the lock that
//! guards them all.
//!
//! `World` is the single shared mutable resource of the simulation. Every
//! structural or occupant mutation takes the write lock; lookups, neighbor
//! queries and pathfinding take the read lock and may run concurrently.
//! Nothing holds a lock across a sleep.
//!
//! Unknown-id lookups panic: they mean an invariant is already broken, and
//! continuing would corrupt the world further.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::thread;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{error, warn};

use outbreak_events::{EntityId, LocationId, Position, WorldEvent};

use crate::behavior::{PersonAgent, ZombieAgent};
use crate::config::SimConfig;
use crate::entity::{AgentInbox, Person, Profession, Zombie};
use crate::item::Item;

/// Hook invoked (outside the lock) when a location's display label changes.
pub type RelabelHook = Box<dyn Fn(LocationId, String) + Send + Sync>;

/// A place in the world. Holds its occupants and loose items.
#[derive(Debug)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub position: Position,
    /// Defense bonus: slows a zombie breaking in while people are inside.
    pub fortification: u32,
    pub people: Vec<Person>,
    pub zombies: Vec<Zombie>,
    pub items: Vec<Item>,
}

impl Location {
    pub(crate) fn new(id: LocationId, name: String, position: Position, fortification: u32) -> Self {
        Self {
            id,
            name,
            position,
            fortification,
            people: Vec::new(),
            zombies: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn has_people(&self) -> bool {
        !self.people.is_empty()
    }

    /// Display label: the name, the distinct item codes present, and the
    /// fortification weight on a second line. Duplicate items appear once.
    pub fn label(&self) -> String {
        let mut label = self.name.clone();
        if !self.items.is_empty() {
            let mut seen: Vec<Item> = Vec::new();
            let mut codes: Vec<&str> = Vec::new();
            for &item in &self.items {
                if !seen.contains(&item) {
                    seen.push(item);
                    codes.push(item.code());
                }
            }
            label.push_str(&format!(" ({})", codes.join(", ")));
        }
        format!("{}\n{}", label, self.fortification)
    }
}

/// Everything behind the world's readers-writer lock.
#[derive(Debug, Default)]
pub struct GraphState {
    nodes: HashMap<LocationId, Location>,
    adjacency: HashMap<LocationId, HashMap<LocationId, u32>>,
    next_location: u32,
    next_entity: u64,
    dirty: bool,
}

impl GraphState {
    /// Look up a location. Panics on an unknown id: that is a broken
    /// invariant, not a recoverable condition.
    pub fn node(&self, id: LocationId) -> &Location {
        self.nodes
            .get(&id)
            .unwrap_or_else(|| panic!("unknown location id {id}: world graph is inconsistent"))
    }

    pub(crate) fn node_mut(&mut self, id: LocationId) -> &mut Location {
        self.nodes
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown location id {id}: world graph is inconsistent"))
    }

    /// All locations, in no particular order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.nodes.values()
    }

    /// Ids of the locations directly connected to `id`.
    pub fn neighbors(&self, id: LocationId) -> impl Iterator<Item = LocationId> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|m| m.keys().copied())
    }

    /// Weight of the path between two locations. Panics when no such path
    /// exists.
    pub fn edge_weight(&self, a: LocationId, b: LocationId) -> u32 {
        self.edge_weight_opt(a, b)
            .unwrap_or_else(|| panic!("no path between {a} and {b}: world graph is inconsistent"))
    }

    pub(crate) fn edge_weight_opt(&self, a: LocationId, b: LocationId) -> Option<u32> {
        self.adjacency.get(&a).and_then(|m| m.get(&b)).copied()
    }

    pub(crate) fn find_person(&self, id: EntityId) -> Option<(LocationId, usize)> {
        for (loc_id, loc) in &self.nodes {
            if let Some(idx) = loc.people.iter().position(|p| p.id == id) {
                return Some((*loc_id, idx));
            }
        }
        None
    }

    pub(crate) fn find_zombie(&self, id: EntityId) -> Option<(LocationId, usize)> {
        for (loc_id, loc) in &self.nodes {
            if let Some(idx) = loc.zombies.iter().position(|z| z.id == id) {
                return Some((*loc_id, idx));
            }
        }
        None
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn insert_node(&mut self, node: Location) {
        self.adjacency.entry(node.id).or_default();
        if node.id.0 >= self.next_location {
            self.next_location = node.id.0 + 1;
        }
        self.nodes.insert(node.id, node);
        self.dirty = true;
    }

    pub(crate) fn insert_edge(&mut self, a: LocationId, b: LocationId, weight: u32) {
        self.adjacency.entry(a).or_default().insert(b, weight);
        self.adjacency.entry(b).or_default().insert(a, weight);
        self.dirty = true;
    }

    pub(crate) fn edges(&self) -> Vec<(LocationId, LocationId, u32)> {
        let mut edges = Vec::new();
        for (&a, neighbors) in &self.adjacency {
            for (&b, &w) in neighbors {
                if a < b {
                    edges.push((a, b, w));
                }
            }
        }
        edges
    }
}

/// Handle to the shared world. Cheap to clone via `Arc`; owns the graph
/// lock, the agent inbox registry, the log channel, and the configuration.
pub struct World {
    state: RwLock<GraphState>,
    /// Receiving mailbox halves, waiting for their behavior thread.
    inboxes: Mutex<HashMap<EntityId, AgentInbox>>,
    log: Sender<WorldEvent>,
    relabel: Mutex<Option<RelabelHook>>,
    /// When false, editor spawns and infections do not start behavior
    /// threads; tests drive agents by hand instead.
    autostart: AtomicBool,
    config: SimConfig,
    /// Self-handle for spawning behavior threads that share the world.
    this: Weak<World>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("autostart", &self.autostart)
            .finish_non_exhaustive()
    }
}

impl World {
    pub fn new(config: SimConfig, log: Sender<WorldEvent>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            state: RwLock::new(GraphState::default()),
            inboxes: Mutex::new(HashMap::new()),
            log,
            relabel: Mutex::new(None),
            autostart: AtomicBool::new(true),
            config,
            this: this.clone(),
        })
    }

    fn handle(&self) -> Arc<World> {
        self.this.upgrade().expect("world dropped while in use")
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Acquire the shared read lock on the graph.
    pub fn read(&self) -> RwLockReadGuard<'_, GraphState> {
        self.state.read().expect("world lock poisoned")
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, GraphState> {
        self.state.write().expect("world lock poisoned")
    }

    /// Install the hook called when a location label changes.
    pub fn set_relabel_hook(&self, hook: RelabelHook) {
        *self.relabel.lock().expect("relabel hook lock poisoned") = Some(hook);
    }

    /// Control whether editor spawns and infections start behavior threads.
    pub fn set_autostart(&self, enabled: bool) {
        self.autostart.store(enabled, Ordering::Relaxed);
    }

    pub(crate) fn emit(&self, event: WorldEvent) {
        // A disconnected sink means the surrounding application went away;
        // the simulation keeps running regardless.
        let _ = self.log.send(event);
    }

    pub(crate) fn relabel(&self, id: LocationId, label: String) {
        let hook = self.relabel.lock().expect("relabel hook lock poisoned");
        if let Some(hook) = hook.as_ref() {
            hook(id, label);
        }
    }

    /// Deterministic per-agent random generator, derived from the base seed.
    pub(crate) fn agent_rng(&self, id: EntityId) -> SmallRng {
        SmallRng::seed_from_u64(self.config.seed ^ id.0.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    // ---- structure ----------------------------------------------------

    pub fn add_location(
        &self,
        name: impl Into<String>,
        position: Position,
        fortification: u32,
    ) -> LocationId {
        let mut state = self.write();
        let id = LocationId(state.next_location);
        state.next_location += 1;
        state
            .nodes
            .insert(id, Location::new(id, name.into(), position, fortification));
        state.adjacency.entry(id).or_default();
        state.dirty = true;
        id
    }

    /// Connect two locations. Re-adding an existing pair replaces the weight
    /// (the graph stays simple). Unknown endpoints and self-paths are
    /// invariant violations.
    pub fn add_path(&self, a: LocationId, b: LocationId, weight: u32) {
        assert!(a != b, "location {a} cannot have a path to itself");
        let mut state = self.write();
        assert!(state.nodes.contains_key(&a), "unknown location id {a}");
        assert!(state.nodes.contains_key(&b), "unknown location id {b}");
        state.insert_edge(a, b, weight);
    }

    /// Disconnect two locations. Removing a path that does not exist is
    /// logged and ignored (the editor may race itself).
    pub fn remove_path(&self, a: LocationId, b: LocationId) {
        let mut state = self.write();
        let removed = state
            .adjacency
            .get_mut(&a)
            .is_some_and(|m| m.remove(&b).is_some());
        if let Some(m) = state.adjacency.get_mut(&b) {
            m.remove(&a);
        }
        if removed {
            state.dirty = true;
        } else {
            warn!(%a, %b, "remove_path: no such path");
        }
    }

    /// Find a location by display name.
    pub fn node_by_name(&self, name: &str) -> Option<LocationId> {
        self.read()
            .locations()
            .find(|l| l.name == name)
            .map(|l| l.id)
    }

    pub fn location_name(&self, id: LocationId) -> String {
        self.read().node(id).name.clone()
    }

    pub fn location_ids(&self) -> Vec<LocationId> {
        self.read().nodes.keys().copied().collect()
    }

    /// Read and clear the dirty flag. The renderer calls this once per frame.
    pub fn take_dirty(&self) -> bool {
        let mut state = self.write();
        std::mem::take(&mut state.dirty)
    }

    // ---- occupants ----------------------------------------------------

    /// Spawn a person at a location. The behavior thread is started later by
    /// `start_agents`.
    pub fn add_person(&self, profession: Profession, location: LocationId) -> EntityId {
        let (id, location_name) = {
            let mut state = self.write();
            let id = EntityId(state.next_entity);
            state.next_entity += 1;
            let mut rng = self.agent_rng(id);
            let (person, inbox) =
                Person::new(id, profession, location, &self.config.mailbox, &mut rng);
            let node = state.node_mut(location);
            let name = node.name.clone();
            node.people.push(person);
            state.dirty = true;
            self.inboxes
                .lock()
                .expect("inbox registry lock poisoned")
                .insert(id, inbox);
            (id, name)
        };
        self.emit(WorldEvent::PersonSpawned {
            id,
            profession: profession.title().to_string(),
            location: location_name,
        });
        id
    }

    /// Spawn an empty-handed zombie at a location and start its behavior
    /// thread (editor entry point).
    pub fn add_zombie(&self, location: LocationId) -> EntityId {
        let (id, location_name) = {
            let mut state = self.write();
            let id = EntityId(state.next_entity);
            state.next_entity += 1;
            let (zombie, inbox) = Zombie::new(id, location, &self.config.mailbox);
            let node = state.node_mut(location);
            let name = node.name.clone();
            node.zombies.push(zombie);
            state.dirty = true;
            self.inboxes
                .lock()
                .expect("inbox registry lock poisoned")
                .insert(id, inbox);
            (id, name)
        };
        self.emit(WorldEvent::ZombieSpawned {
            id,
            location: location_name,
        });
        if self.autostart.load(Ordering::Relaxed) {
            self.spawn_zombie_thread(id);
        }
        id
    }

    /// Convert a person into a zombie at its location.
    ///
    /// Under one write lock: the victim leaves its occupant list, receives a
    /// kill event, and a zombie with the victim's id and one random item from
    /// its inventory joins the same location. Returns false if the person is
    /// no longer in the world — infecting the already-dead is a no-op, which
    /// is what makes the victim task's own removal safe to race.
    pub fn infect_person(&self, id: EntityId) -> bool {
        let location = {
            let mut state = self.write();
            let Some((location, idx)) = state.find_person(id) else {
                return false;
            };
            let victim = state.node_mut(location).people.swap_remove(idx);
            victim.mailboxes.send_kill("was infected by a zombie bite");
            let mut rng = self.agent_rng(id);
            let (zombie, inbox) = Zombie::from_person(&victim, &self.config.mailbox, &mut rng);
            state.node_mut(location).zombies.push(zombie);
            state.dirty = true;
            self.inboxes
                .lock()
                .expect("inbox registry lock poisoned")
                .insert(id, inbox);
            location
        };
        self.emit(WorldEvent::Infected {
            victim: id,
            location: self.location_name(location),
        });
        if self.autostart.load(Ordering::Relaxed) {
            self.spawn_zombie_thread(id);
        }
        true
    }

    /// Erase a person from its occupant list. Idempotent: the record may
    /// already be gone if an infection raced the agent's own death. Returns
    /// the location name for the death log.
    pub fn remove_person(&self, id: EntityId) -> Option<String> {
        let mut state = self.write();
        let (location, idx) = state.find_person(id)?;
        let node = state.node_mut(location);
        node.people.swap_remove(idx);
        let name = node.name.clone();
        state.dirty = true;
        Some(name)
    }

    /// Erase a zombie from its occupant list. Idempotent like
    /// `remove_person`.
    pub fn remove_zombie(&self, id: EntityId) -> Option<String> {
        let mut state = self.write();
        let (location, idx) = state.find_zombie(id)?;
        let node = state.node_mut(location);
        node.zombies.swap_remove(idx);
        let name = node.name.clone();
        state.dirty = true;
        Some(name)
    }

    pub(crate) fn with_person_mut<R>(
        &self,
        id: EntityId,
        f: impl FnOnce(&mut Person) -> R,
    ) -> Option<R> {
        let mut state = self.write();
        let (location, idx) = state.find_person(id)?;
        Some(f(&mut state.node_mut(location).people[idx]))
    }

    pub(crate) fn with_zombie_mut<R>(
        &self,
        id: EntityId,
        f: impl FnOnce(&mut Zombie) -> R,
    ) -> Option<R> {
        let mut state = self.write();
        let (location, idx) = state.find_zombie(id)?;
        Some(f(&mut state.node_mut(location).zombies[idx]))
    }

    /// Relocate a person from `from` to `to` under one write lock. Returns
    /// the two location names, or `None` when the person vanished mid-transit
    /// (killed or infected while traveling) — in that case nothing changes.
    pub(crate) fn move_person(
        &self,
        id: EntityId,
        from: LocationId,
        to: LocationId,
    ) -> Option<(String, String)> {
        let mut state = self.write();
        assert!(state.nodes.contains_key(&to), "unknown location id {to}");
        let from_node = state.node_mut(from);
        let idx = from_node.people.iter().position(|p| p.id == id)?;
        let mut person = from_node.people.swap_remove(idx);
        let from_name = from_node.name.clone();
        person.location = to;
        let to_node = state.node_mut(to);
        let to_name = to_node.name.clone();
        to_node.people.push(person);
        state.dirty = true;
        Some((from_name, to_name))
    }

    pub(crate) fn move_zombie(
        &self,
        id: EntityId,
        from: LocationId,
        to: LocationId,
    ) -> Option<(String, String)> {
        let mut state = self.write();
        assert!(state.nodes.contains_key(&to), "unknown location id {to}");
        let from_node = state.node_mut(from);
        let idx = from_node.zombies.iter().position(|z| z.id == id)?;
        let mut zombie = from_node.zombies.swap_remove(idx);
        let from_name = from_node.name.clone();
        zombie.location = to;
        let to_node = state.node_mut(to);
        let to_name = to_node.name.clone();
        to_node.zombies.push(zombie);
        state.dirty = true;
        Some((from_name, to_name))
    }

    // ---- behavior threads ---------------------------------------------

    /// Take an agent's inbox out of the registry. Each inbox can be claimed
    /// once; a second claim returns `None`.
    pub(crate) fn claim_inbox(&self, id: EntityId) -> Option<AgentInbox> {
        self.inboxes
            .lock()
            .expect("inbox registry lock poisoned")
            .remove(&id)
    }

    /// Start one behavior thread for every occupant whose inbox is still
    /// unclaimed. Called once after loading and seeding a world.
    pub fn start_agents(&self) {
        let (people, zombies) = {
            let state = self.read();
            let mut people = Vec::new();
            let mut zombies = Vec::new();
            for location in state.locations() {
                people.extend(location.people.iter().map(|p| p.id));
                zombies.extend(location.zombies.iter().map(|z| z.id));
            }
            (people, zombies)
        };
        for id in people {
            self.spawn_person_thread(id);
        }
        for id in zombies {
            self.spawn_zombie_thread(id);
        }
    }

    fn spawn_person_thread(&self, id: EntityId) {
        let Some(agent) = PersonAgent::claim(self.handle(), id) else {
            return;
        };
        let builder = thread::Builder::new().name(format!("person-{id}"));
        if let Err(e) = builder.spawn(move || agent.run()) {
            error!(%id, error = %e, "failed to spawn person thread");
        }
    }

    fn spawn_zombie_thread(&self, id: EntityId) {
        let Some(agent) = ZombieAgent::claim(self.handle(), id) else {
            return;
        };
        let builder = thread::Builder::new().name(format!("zombie-{id}"));
        if let Err(e) = builder.spawn(move || agent.run()) {
            error!(%id, error = %e, "failed to spawn zombie thread");
        }
    }

    // ---- invariants ----------------------------------------------------

    /// Check that every occupant's `location` field matches the list it sits
    /// in, and that no id appears twice anywhere in the world.
    pub fn validate_occupancy(&self) -> Result<(), String> {
        let state = self.read();
        let mut seen: HashMap<EntityId, LocationId> = HashMap::new();
        for location in state.locations() {
            for person in &location.people {
                if person.location != location.id {
                    return Err(format!(
                        "person {} sits in {} but claims location {}",
                        person.id, location.id, person.location
                    ));
                }
                if let Some(previous) = seen.insert(person.id, location.id) {
                    return Err(format!(
                        "entity {} present in both {} and {}",
                        person.id, previous, location.id
                    ));
                }
            }
            for zombie in &location.zombies {
                if zombie.location != location.id {
                    return Err(format!(
                        "zombie {} sits in {} but claims location {}",
                        zombie.id, location.id, zombie.location
                    ));
                }
                if let Some(previous) = seen.insert(zombie.id, location.id) {
                    return Err(format!(
                        "entity {} present in both {} and {}",
                        zombie.id, previous, location.id
                    ));
                }
            }
        }
        Ok(())
    }
}
