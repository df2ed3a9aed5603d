//! Named uniform values and their byte layout.
//!
//! A [`UniformLayout`] lists the uniforms a program declares, in the order
//! of the WGSL struct that backs them, and assigns each one the offset WGSL
//! gives it in the uniform address space. Backends stage uniform values by
//! name into a byte block built from this layout.

use cgmath::{Matrix2, Matrix3, Matrix4, Vector2, Vector3, Vector4};
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// Stored as a `u32` since WGSL has no host-shareable bool.
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl UniformKind {
    pub const fn align(self) -> u32 {
        match self {
            UniformKind::Bool | UniformKind::Int | UniformKind::Float => 4,
            UniformKind::Vec2 | UniformKind::Mat2 => 8,
            UniformKind::Vec3 | UniformKind::Vec4 | UniformKind::Mat3 | UniformKind::Mat4 => 16,
        }
    }

    pub const fn size(self) -> u32 {
        match self {
            UniformKind::Bool | UniformKind::Int | UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 | UniformKind::Mat2 => 16,
            UniformKind::Mat3 => 48,
            UniformKind::Mat4 => 64,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([[f32; 2]; 2]),
    Mat3([[f32; 3]; 3]),
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Bool(_) => UniformKind::Bool,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat2(_) => UniformKind::Mat2,
            UniformValue::Mat3(_) => UniformKind::Mat3,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// Writes the value at the start of `out`, which must hold at least
    /// `self.kind().size()` bytes.
    fn encode(&self, out: &mut [u8]) {
        let mut put = |index: usize, bytes: [u8; 4]| {
            out[index * 4..index * 4 + 4].copy_from_slice(&bytes);
        };
        match *self {
            UniformValue::Bool(v) => put(0, (v as u32).to_ne_bytes()),
            UniformValue::Int(v) => put(0, v.to_ne_bytes()),
            UniformValue::Float(v) => put(0, v.to_ne_bytes()),
            UniformValue::Vec2(v) => v.iter().enumerate().for_each(|(i, f)| put(i, f.to_ne_bytes())),
            UniformValue::Vec3(v) => v.iter().enumerate().for_each(|(i, f)| put(i, f.to_ne_bytes())),
            UniformValue::Vec4(v) => v.iter().enumerate().for_each(|(i, f)| put(i, f.to_ne_bytes())),
            UniformValue::Mat2(m) => {
                for (c, column) in m.iter().enumerate() {
                    for (r, f) in column.iter().enumerate() {
                        put(c * 2 + r, f.to_ne_bytes());
                    }
                }
            }
            // mat3x3 columns are vec3s padded to 16 bytes
            UniformValue::Mat3(m) => {
                for (c, column) in m.iter().enumerate() {
                    for (r, f) in column.iter().enumerate() {
                        put(c * 4 + r, f.to_ne_bytes());
                    }
                }
            }
            UniformValue::Mat4(m) => {
                for (c, column) in m.iter().enumerate() {
                    for (r, f) in column.iter().enumerate() {
                        put(c * 4 + r, f.to_ne_bytes());
                    }
                }
            }
        }
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}
impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}
impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}
impl From<Vector2<f32>> for UniformValue {
    fn from(v: Vector2<f32>) -> Self {
        UniformValue::Vec2(v.into())
    }
}
impl From<Vector3<f32>> for UniformValue {
    fn from(v: Vector3<f32>) -> Self {
        UniformValue::Vec3(v.into())
    }
}
impl From<Vector4<f32>> for UniformValue {
    fn from(v: Vector4<f32>) -> Self {
        UniformValue::Vec4(v.into())
    }
}
impl From<Matrix2<f32>> for UniformValue {
    fn from(m: Matrix2<f32>) -> Self {
        UniformValue::Mat2(m.into())
    }
}
impl From<Matrix3<f32>> for UniformValue {
    fn from(m: Matrix3<f32>) -> Self {
        UniformValue::Mat3(m.into())
    }
}
impl From<Matrix4<f32>> for UniformValue {
    fn from(m: Matrix4<f32>) -> Self {
        UniformValue::Mat4(m.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformEntry {
    pub name: String,
    pub kind: UniformKind,
    pub offset: u32,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UniformMismatch {
    #[error("no uniform named `{0}`")]
    UnknownName(String),
    #[error("uniform `{name}` is declared as {declared:?} but was given {given:?}")]
    Kind {
        name: String,
        declared: UniformKind,
        given: UniformKind,
    },
}

/// The uniforms of one program, laid out like the WGSL struct declaring them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniformLayout {
    entries: Vec<UniformEntry>,
    size: u32,
}

fn align_to(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

impl UniformLayout {
    pub fn new(declarations: &[(&str, UniformKind)]) -> Self {
        let mut offset = 0;
        let mut entries = Vec::with_capacity(declarations.len());
        for &(name, kind) in declarations {
            offset = align_to(offset, kind.align());
            entries.push(UniformEntry {
                name: name.to_string(),
                kind,
                offset,
            });
            offset += kind.size();
        }
        // Structs in the uniform address space round up to 16 bytes.
        let size = align_to(offset.max(16), 16);
        Self { entries, size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn entries(&self) -> &[UniformEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&UniformEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Stages `value` into `block`, a buffer of at least [`Self::size`] bytes.
    pub fn write(
        &self,
        block: &mut [u8],
        name: &str,
        value: &UniformValue,
    ) -> Result<(), UniformMismatch> {
        let entry = self
            .entry(name)
            .ok_or_else(|| UniformMismatch::UnknownName(name.to_string()))?;
        if entry.kind != value.kind() {
            return Err(UniformMismatch::Kind {
                name: name.to_string(),
                declared: entry.kind,
                given: value.kind(),
            });
        }
        let start = entry.offset as usize;
        value.encode(&mut block[start..start + entry.kind.size() as usize]);
        Ok(())
    }
}
