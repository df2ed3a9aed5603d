//! Position, rotation and scale of a render entity.
//!
//! The model matrix is memoized: setters only mark it stale and the next
//! [`Transform::model_matrix`] call recomputes it.

use std::cell::Cell;

use cgmath::{Deg, Matrix4, Quaternion, Rotation3, Vector3};

/// Quaternion for Euler angles in degrees, rotating about X first, then Y,
/// then Z.
pub fn euler_to_quaternion(degrees: Vector3<f32>) -> Quaternion<f32> {
    Quaternion::from_angle_z(Deg(degrees.z))
        * Quaternion::from_angle_y(Deg(degrees.y))
        * Quaternion::from_angle_x(Deg(degrees.x))
}

#[derive(Clone, Debug)]
pub struct Transform {
    position: Vector3<f32>,
    rotation: Vector3<f32>,
    scale: Vector3<f32>,
    model: Cell<Option<Matrix4<f32>>>,
}

impl Transform {
    pub fn new(position: Vector3<f32>, rotation: Vector3<f32>, scale: Vector3<f32>) -> Self {
        Self {
            position,
            rotation,
            scale,
            model: Cell::new(None),
        }
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    /// Euler angles in degrees.
    pub fn rotation(&self) -> Vector3<f32> {
        self.rotation
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn set_position(&mut self, position: impl Into<Vector3<f32>>) {
        self.position = position.into();
        self.model.set(None);
    }

    pub fn set_rotation(&mut self, degrees: impl Into<Vector3<f32>>) {
        self.rotation = degrees.into();
        self.model.set(None);
    }

    pub fn set_scale(&mut self, scale: impl Into<Vector3<f32>>) {
        self.scale = scale.into();
        self.model.set(None);
    }

    pub fn is_dirty(&self) -> bool {
        self.model.get().is_none()
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        if let Some(model) = self.model.get() {
            return model;
        }
        let model = Matrix4::from_translation(self.position)
            * Matrix4::from(euler_to_quaternion(self.rotation))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        self.model.set(Some(model));
        model
    }
}

impl Default for Transform {
    /// Identity: no translation, no rotation, unit scale.
    fn default() -> Self {
        Self::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
        )
    }
}
