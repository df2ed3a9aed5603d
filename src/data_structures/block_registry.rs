//! Catalog of drawable block types, keyed by block id.

use std::collections::HashMap;

use crate::{
    data_structures::{
        block::{BlockMeshGenerator, BlockType},
        material::Material,
        render_entity::RenderEntity,
        shader::ShaderProvider,
        texture::Texture,
        texture_atlas::TextureAtlas,
    },
    errors::{RenderError, Result},
    gpu::Gpu,
};

/// Owns the built texture atlas and one [`RenderEntity`] per registered
/// block. Every block's material samples the shared atlas texture.
#[derive(Debug)]
pub struct BlockRegistry {
    atlas: TextureAtlas,
    atlas_texture: Texture,
    blocks: HashMap<String, RenderEntity>,
}

impl BlockRegistry {
    /// `atlas` must already be built.
    pub fn new(atlas: TextureAtlas) -> Result<Self> {
        let atlas_texture = atlas.texture()?;
        Ok(Self {
            atlas,
            atlas_texture,
            blocks: HashMap::new(),
        })
    }

    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    /// Generates the block's mesh and material and stores them under `id`,
    /// replacing any earlier registration.
    pub fn register_block(
        &mut self,
        gpu: &mut Gpu,
        shaders: &ShaderProvider,
        id: impl Into<String>,
        block_type: &BlockType,
    ) -> Result<()> {
        let id = id.into();
        block_type.validate();
        let shader = shaders.get_shader(block_type.shader_type).inspect_err(|e| {
            log::error!("Cannot register block `{id}`: {e}");
        })?;

        let mesh = BlockMeshGenerator::build_block_mesh(gpu, block_type, &self.atlas);
        let mut material = Material::new(shader, self.atlas_texture.share());
        if block_type.emissive {
            material.set_emissive_texture(Some(self.atlas_texture.share()));
        }

        if self
            .blocks
            .insert(id.clone(), RenderEntity::new(mesh, material))
            .is_some()
        {
            log::warn!("Block `{id}` registered twice, replacing the earlier entry");
        }
        Ok(())
    }

    pub fn get_block_render_entity(&self, id: &str) -> Result<&RenderEntity> {
        self.blocks.get(id).ok_or_else(|| not_found(id))
    }

    pub fn get_block_render_entity_mut(&mut self, id: &str) -> Result<&mut RenderEntity> {
        self.blocks.get_mut(id).ok_or_else(|| not_found(id))
    }

    pub fn has_block(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn block_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.blocks.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

fn not_found(id: &str) -> RenderError {
    log::error!("Block `{id}` not found");
    RenderError::BlockNotFound(id.to_string())
}
