//! Euler-angle fly-through camera.
//!
//! The camera keeps yaw/pitch in degrees and derives an orthonormal
//! `front`/`right`/`up` basis from them. By default it walks: horizontal
//! movement keeps the height constant unless fly mode is enabled.

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3};
use instant::Duration;

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = -16.0;
pub const DEFAULT_SPEED: f32 = 6.0;
pub const DEFAULT_SENSITIVITY: f32 = 0.065;
pub const DEFAULT_ZOOM: f32 = 45.0;

pub const PITCH_LIMIT: f32 = 89.98;
pub const MIN_ZOOM: f32 = 0.2;
pub const MAX_ZOOM: f32 = 45.0;

/// Maps OpenGL clip depth `[-1, 1]` to wgpu's `[0, 1]`.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    world_up: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    fly: bool,
    front: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    projection: Option<Matrix4<f32>>,
}

impl Camera {
    pub fn new(position: Vector3<f32>, world_up: Vector3<f32>, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            world_up,
            yaw,
            pitch,
            zoom: DEFAULT_ZOOM,
            fly: false,
            front: Vector3::new(0.0, 0.0, -1.0),
            right: Vector3::new(1.0, 0.0, 0.0),
            up: world_up,
            projection: None,
        };
        camera.update_camera_vectors();
        camera
    }

    /// Camera at `position` looking with the default yaw and pitch, Y up.
    pub fn at(position: impl Into<Vector3<f32>>) -> Self {
        Self::new(
            position.into(),
            Vector3::unit_y(),
            DEFAULT_YAW,
            DEFAULT_PITCH,
        )
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn world_up(&self) -> Vector3<f32> {
        self.world_up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn is_flying(&self) -> bool {
        self.fly
    }

    pub fn set_fly(&mut self, fly: bool) {
        self.fly = fly;
    }

    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_camera_vectors();
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: Duration) {
        let velocity = self.movement_speed * dt.as_secs_f32();
        let height = self.position.y;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
            CameraMovement::Up => {
                self.position += self.up * velocity;
                return;
            }
            CameraMovement::Down => {
                self.position -= self.up * velocity;
                return;
            }
        }
        if !self.fly {
            self.position.y = height;
        }
    }

    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;
        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self.update_camera_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom + y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Look-at matrix towards `position + front`.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        build_look_at(self.position, self.position + self.front, self.world_up)
    }

    pub fn set_projection_matrix(&mut self, fov_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Some(
            OPENGL_TO_WGPU_MATRIX * cgmath::perspective(cgmath::Deg(fov_degrees), aspect, near, far),
        );
    }

    pub fn has_projection(&self) -> bool {
        self.projection.is_some()
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.projection {
            Some(projection) => projection,
            None => {
                log::error!("Projection matrix not set, using identity");
                Matrix4::identity()
            }
        }
    }

    fn update_camera_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vector3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::at((0.0, 0.0, 0.0))
    }
}

/// Right-handed look-at: rows of the rotation are the camera basis, followed
/// by a translation to the eye.
pub fn build_look_at(eye: Vector3<f32>, target: Vector3<f32>, world_up: Vector3<f32>) -> Matrix4<f32> {
    let z = (eye - target).normalize();
    let x = world_up.cross(z).normalize();
    let y = z.cross(x);
    #[rustfmt::skip]
    let rotation = Matrix4::new(
        x.x, y.x, z.x, 0.0,
        x.y, y.y, z.y, 0.0,
        x.z, y.z, z.z, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    rotation * Matrix4::from_translation(-eye)
}
