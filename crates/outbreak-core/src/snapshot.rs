//! Read-only world snapshots for renderers and inspectors.

use outbreak_events::{
    EdgeSnapshot, LocationSnapshot, PersonSnapshot, WorldSnapshot, ZombieSnapshot,
};

use crate::graph::World;

impl World {
    /// Copy the whole world out under one read guard. Occupant vitals are
    /// included; mailboxes and other live plumbing are not.
    pub fn snapshot(&self) -> WorldSnapshot {
        let state = self.read();
        let mut locations: Vec<LocationSnapshot> = state
            .locations()
            .map(|location| LocationSnapshot {
                id: location.id,
                name: location.name.clone(),
                label: location.label(),
                position: location.position,
                fortification: location.fortification,
                people: location
                    .people
                    .iter()
                    .map(|p| PersonSnapshot {
                        id: p.id,
                        profession: p.profession.title().to_string(),
                        health: p.health,
                        hunger: p.hunger,
                        thirst: p.thirst,
                        items: p.items.iter().map(|i| i.name().to_string()).collect(),
                    })
                    .collect(),
                zombies: location
                    .zombies
                    .iter()
                    .map(|z| ZombieSnapshot {
                        id: z.id,
                        health: z.health,
                        hunger: z.hunger,
                        holding: z.holding.name().to_string(),
                    })
                    .collect(),
                items: location.items.iter().map(|i| i.name().to_string()).collect(),
            })
            .collect();
        locations.sort_by_key(|l| l.id);

        let mut edges: Vec<EdgeSnapshot> = state
            .edges()
            .into_iter()
            .map(|(from, to, weight)| EdgeSnapshot { from, to, weight })
            .collect();
        edges.sort_by_key(|e| (e.from, e.to));

        WorldSnapshot { locations, edges }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SimConfig;
    use crate::entity::Profession;
    use crate::graph::World;
    use crate::item::Item;
    use outbreak_events::Position;
    use std::sync::mpsc;

    #[test]
    fn test_snapshot_reflects_world() {
        let (tx, _rx) = mpsc::channel();
        let world = World::new(SimConfig::default(), tx);
        world.set_autostart(false);

        let a = world.add_location("Church", Position::new(1.0, 2.0), 3);
        let b = world.add_location("Store", Position::default(), 0);
        world.add_path(a, b, 4);
        {
            let mut state = world.write();
            state.node_mut(a).items.push(Item::Water);
        }
        world.add_person(Profession::Priest, a);
        world.add_zombie(b);

        let snap = world.snapshot();
        assert_eq!(snap.person_count(), 1);
        assert_eq!(snap.zombie_count(), 1);
        assert_eq!(snap.edges.len(), 1);

        let church = snap.location(a).unwrap();
        assert_eq!(church.name, "Church");
        assert_eq!(church.label, "Church (WS)\n3");
        assert_eq!(church.people[0].profession, "PRIEST");
        assert_eq!(church.people[0].health, 100);

        let store = snap.location(b).unwrap();
        assert_eq!(store.zombies[0].holding, "NOTHING");
    }
}
