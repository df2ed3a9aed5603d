use cgmath::{Vector2, Vector3};

use crate::{
    data_structures::{
        mesh::{Mesh, MeshData},
        shader::ShaderType,
        texture_atlas::{TextureAtlas, UvRegion},
    },
    gpu::{Gpu, VertexAttribute},
};

/// Floats per block vertex: position (3), uv (2), normal (3).
pub const BLOCK_VERTEX_FLOATS: usize = 8;
pub const BLOCK_VERTEX_STRIDE: u32 = (BLOCK_VERTEX_FLOATS * std::mem::size_of::<f32>()) as u32;
/// Six faces of two triangles each.
pub const BLOCK_VERTEX_COUNT: usize = 36;

/// Layout of the vertices emitted by [`BlockMeshGenerator`].
pub fn block_vertex_attributes() -> Vec<VertexAttribute> {
    vec![
        VertexAttribute::float(0, 3, BLOCK_VERTEX_STRIDE, 0),
        VertexAttribute::float(1, 2, BLOCK_VERTEX_STRIDE, 3 * 4),
        VertexAttribute::float(2, 3, BLOCK_VERTEX_STRIDE, 5 * 4),
    ]
}

/**
 * A `BlockType` names the atlas texture of each of a unit cube's six faces.
 *
 * South faces -z, north +z, east +x and west -x. The shader type selects the
 * shader variant the block is registered with, and emissive blocks glow with
 * their own texture.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockType {
    pub top: String,
    pub bottom: String,
    pub north: String,
    pub south: String,
    pub east: String,
    pub west: String,
    pub shader_type: ShaderType,
    pub emissive: bool,
}

impl BlockType {
    /// Same texture on every face.
    pub fn uniform(texture: impl Into<String>) -> Self {
        let texture = texture.into();
        Self::top_bottom_side(texture.clone(), texture.clone(), texture)
    }

    /// One texture for top and bottom, one for the four sides.
    pub fn top_bottom_sides(y_faces: impl Into<String>, sides: impl Into<String>) -> Self {
        let y_faces = y_faces.into();
        Self::top_bottom_side(y_faces.clone(), y_faces, sides)
    }

    pub fn top_bottom_side(top: impl Into<String>, bottom: impl Into<String>, sides: impl Into<String>) -> Self {
        let sides = sides.into();
        Self::explicit(
            top,
            bottom,
            sides.clone(),
            sides.clone(),
            sides.clone(),
            sides,
        )
    }

    pub fn explicit(
        top: impl Into<String>,
        bottom: impl Into<String>,
        north: impl Into<String>,
        south: impl Into<String>,
        east: impl Into<String>,
        west: impl Into<String>,
    ) -> Self {
        Self {
            top: top.into(),
            bottom: bottom.into(),
            north: north.into(),
            south: south.into(),
            east: east.into(),
            west: west.into(),
            shader_type: ShaderType::default(),
            emissive: false,
        }
    }

    pub fn with_shader(mut self, shader_type: ShaderType) -> Self {
        self.shader_type = shader_type;
        self
    }

    pub fn with_emissive(mut self, emissive: bool) -> Self {
        self.emissive = emissive;
        self
    }

    /// Logs every face without a texture name. Returns whether all faces
    /// are named.
    pub fn validate(&self) -> bool {
        let faces = [
            ("top", &self.top),
            ("bottom", &self.bottom),
            ("north", &self.north),
            ("south", &self.south),
            ("east", &self.east),
            ("west", &self.west),
        ];
        let mut valid = true;
        for (face, name) in faces {
            if name.is_empty() {
                log::error!("Block face `{face}` has no texture name");
                valid = false;
            }
        }
        valid
    }
}

/// Corners of one quad as seen from outside the cube.
struct Face {
    bottom_left: Vector3<f32>,
    bottom_right: Vector3<f32>,
    top_left: Vector3<f32>,
    top_right: Vector3<f32>,
    normal: Vector3<f32>,
}

const fn v(x: f32, y: f32, z: f32) -> Vector3<f32> {
    Vector3::new(x, y, z)
}

const TOP: Face = Face {
    bottom_left: v(-0.5, 0.5, 0.5),
    bottom_right: v(0.5, 0.5, 0.5),
    top_left: v(-0.5, 0.5, -0.5),
    top_right: v(0.5, 0.5, -0.5),
    normal: v(0.0, 1.0, 0.0),
};
const SOUTH: Face = Face {
    bottom_left: v(0.5, -0.5, -0.5),
    bottom_right: v(-0.5, -0.5, -0.5),
    top_left: v(0.5, 0.5, -0.5),
    top_right: v(-0.5, 0.5, -0.5),
    normal: v(0.0, 0.0, -1.0),
};
const NORTH: Face = Face {
    bottom_left: v(-0.5, -0.5, 0.5),
    bottom_right: v(0.5, -0.5, 0.5),
    top_left: v(-0.5, 0.5, 0.5),
    top_right: v(0.5, 0.5, 0.5),
    normal: v(0.0, 0.0, 1.0),
};
const EAST: Face = Face {
    bottom_left: v(0.5, -0.5, 0.5),
    bottom_right: v(0.5, -0.5, -0.5),
    top_left: v(0.5, 0.5, 0.5),
    top_right: v(0.5, 0.5, -0.5),
    normal: v(1.0, 0.0, 0.0),
};
const WEST: Face = Face {
    bottom_left: v(-0.5, -0.5, -0.5),
    bottom_right: v(-0.5, -0.5, 0.5),
    top_left: v(-0.5, 0.5, -0.5),
    top_right: v(-0.5, 0.5, 0.5),
    normal: v(-1.0, 0.0, 0.0),
};
const BOTTOM: Face = Face {
    bottom_left: v(-0.5, -0.5, -0.5),
    bottom_right: v(0.5, -0.5, -0.5),
    top_left: v(-0.5, -0.5, 0.5),
    top_right: v(0.5, -0.5, 0.5),
    normal: v(0.0, -1.0, 0.0),
};

/// Builds textured unit cubes centred on the origin.
pub struct BlockMeshGenerator;

impl BlockMeshGenerator {
    /// 36 non-indexed vertices, faces in the order top, south, north, east,
    /// west, bottom. Triangles wind counter-clockwise seen from outside.
    pub fn generate_block_mesh(block_type: &BlockType, atlas: &TextureAtlas) -> MeshData {
        let faces = [
            (&TOP, &block_type.top),
            (&SOUTH, &block_type.south),
            (&NORTH, &block_type.north),
            (&EAST, &block_type.east),
            (&WEST, &block_type.west),
            (&BOTTOM, &block_type.bottom),
        ];
        let mut vertices = Vec::with_capacity(BLOCK_VERTEX_COUNT * BLOCK_VERTEX_FLOATS);
        for (face, texture) in faces {
            Self::generate_cube_face(&mut vertices, face, atlas.uv_region(texture));
        }
        MeshData::new(vertices, block_vertex_attributes(), None)
    }

    /// Generates the block and uploads it.
    pub fn build_block_mesh(gpu: &mut Gpu, block_type: &BlockType, atlas: &TextureAtlas) -> Mesh {
        Mesh::new(gpu, Self::generate_block_mesh(block_type, atlas))
    }

    fn generate_cube_face(out: &mut Vec<f32>, face: &Face, uv: UvRegion) {
        let bl = Vector2::new(uv.u_min, uv.v_max);
        let br = Vector2::new(uv.u_max, uv.v_max);
        let tl = Vector2::new(uv.u_min, uv.v_min);
        let tr = Vector2::new(uv.u_max, uv.v_min);
        let corners = [
            (face.bottom_left, bl),
            (face.bottom_right, br),
            (face.top_right, tr),
            (face.top_right, tr),
            (face.top_left, tl),
            (face.bottom_left, bl),
        ];
        for (position, tex_coords) in corners {
            out.extend_from_slice(&[position.x, position.y, position.z, tex_coords.x, tex_coords.y]);
            out.extend_from_slice(&[face.normal.x, face.normal.y, face.normal.z]);
        }
    }
}
