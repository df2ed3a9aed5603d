//! A drawable object: one mesh, one material and a transform.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::data_structures::{material::Material, mesh::Mesh, transform::Transform};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique entity id, assigned in creation order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    fn next() -> Self {
        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct RenderEntity {
    id: EntityId,
    transform: Transform,
    mesh: Mesh,
    material: Material,
}

impl RenderEntity {
    pub fn new(mesh: Mesh, material: Material) -> Self {
        Self {
            id: EntityId::next(),
            transform: Transform::default(),
            mesh,
            material,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Replaces the mesh, returning the previous one.
    pub fn set_mesh(&mut self, mesh: Mesh) -> Mesh {
        std::mem::replace(&mut self.mesh, mesh)
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    /// Replaces the material, returning the previous one.
    pub fn set_material(&mut self, material: Material) -> Material {
        std::mem::replace(&mut self.material, material)
    }
}
