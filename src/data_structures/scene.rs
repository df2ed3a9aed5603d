//! An ordered list of render entities and the lights that illuminate them.

use crate::data_structures::{
    light_manager::LightManager,
    render_entity::{EntityId, RenderEntity},
};

#[derive(Debug, Default)]
pub struct Scene {
    entities: Vec<RenderEntity>,
    light_manager: LightManager,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `entity`; entities draw in insertion order.
    pub fn add_entity(&mut self, entity: RenderEntity) -> EntityId {
        let id = entity.id();
        self.entities.push(entity);
        id
    }

    /// Removes and returns the entity with `id`, keeping the order of the rest.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<RenderEntity> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        Some(self.entities.remove(index))
    }

    pub fn entity(&self, id: EntityId) -> Option<&RenderEntity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut RenderEntity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    pub fn entities(&self) -> &[RenderEntity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [RenderEntity] {
        &mut self.entities
    }

    pub fn light_manager(&self) -> &LightManager {
        &self.light_manager
    }

    pub fn light_manager_mut(&mut self) -> &mut LightManager {
        &mut self.light_manager
    }

    /// Entities and lights, borrowed separately.
    pub fn split_mut(&mut self) -> (&[RenderEntity], &mut LightManager) {
        (&self.entities, &mut self.light_manager)
    }
}
