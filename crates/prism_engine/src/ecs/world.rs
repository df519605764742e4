//! ECS World implementation

use std::any::{Any, TypeId};
use std::collections::HashMap;

use slotmap::{SecondaryMap, SlotMap};

use super::Component;

slotmap::new_key_type! {
    /// Generational entity key; stale keys from destroyed entities never
    /// alias newly created ones
    pub struct Entity;
}

trait AnyStorage {
    fn remove_entity(&mut self, entity: Entity);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Storage<T: Component> {
    components: SecondaryMap<Entity, T>,
}

impl<T: Component> Storage<T> {
    fn new() -> Self {
        Self { components: SecondaryMap::new() }
    }
}

impl<T: Component> AnyStorage for Storage<T> {
    fn remove_entity(&mut self, entity: Entity) {
        self.components.remove(entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// ECS World containing all entities and components
#[derive(Default)]
pub struct World {
    entities: SlotMap<Entity, ()>,
    storages: HashMap<TypeId, Box<dyn AnyStorage>>,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entity
    pub fn create_entity(&mut self) -> Entity {
        self.entities.insert(())
    }

    /// Destroy an entity and detach all of its components
    pub fn destroy_entity(&mut self, entity: Entity) {
        if self.entities.remove(entity).is_some() {
            for storage in self.storages.values_mut() {
                storage.remove_entity(entity);
            }
        }
    }

    /// Whether an entity key still refers to a live entity
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Attach a component to an entity, replacing any existing one of the
    /// same type
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) {
        debug_assert!(self.is_alive(entity), "component attached to a dead entity");
        let storage = self
            .storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Storage::<T>::new()));
        let storage = storage
            .as_any_mut()
            .downcast_mut::<Storage<T>>()
            .expect("storage type mismatch");
        storage.components.insert(entity, component);
    }

    /// Detach a component from an entity, returning it if present
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let storage = self.storages.get_mut(&TypeId::of::<T>())?;
        storage
            .as_any_mut()
            .downcast_mut::<Storage<T>>()
            .expect("storage type mismatch")
            .components
            .remove(entity)
    }

    /// Get a component from an entity
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        let storage = self.storages.get(&TypeId::of::<T>())?;
        storage
            .as_any()
            .downcast_ref::<Storage<T>>()
            .expect("storage type mismatch")
            .components
            .get(entity)
    }

    /// Get a mutable component from an entity
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let storage = self.storages.get_mut(&TypeId::of::<T>())?;
        storage
            .as_any_mut()
            .downcast_mut::<Storage<T>>()
            .expect("storage type mismatch")
            .components
            .get_mut(entity)
    }

    /// Whether an entity carries a component of the given type
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.get_component::<T>(entity).is_some()
    }

    /// Iterate over all live entities
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health(u32);
    impl Component for Health {}

    struct Tag;
    impl Component for Tag {}

    #[test]
    fn components_round_trip() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Health(10));

        assert_eq!(world.get_component::<Health>(entity).unwrap().0, 10);
        world.get_component_mut::<Health>(entity).unwrap().0 = 20;
        assert_eq!(world.get_component::<Health>(entity).unwrap().0, 20);
        assert_eq!(world.remove_component::<Health>(entity).unwrap().0, 20);
        assert!(!world.has_component::<Health>(entity));
    }

    #[test]
    fn destroy_detaches_components_and_invalidates_key() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Health(1));
        world.add_component(entity, Tag);

        world.destroy_entity(entity);
        assert!(!world.is_alive(entity));
        assert!(world.get_component::<Health>(entity).is_none());

        // A recycled slot must not resurrect the old key.
        let replacement = world.create_entity();
        assert_ne!(entity, replacement);
        assert!(!world.is_alive(entity));
    }

    #[test]
    fn entities_iterates_live_only() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.destroy_entity(a);

        let live: Vec<Entity> = world.entities().collect();
        assert_eq!(live, vec![b]);
        assert_eq!(world.entity_count(), 1);
    }
}
