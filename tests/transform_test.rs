mod common;

use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};
use common::test_utils::{assert_vec3_eq, EPSILON};
use voxel_ngin::data_structures::transform::{euler_to_quaternion, Transform};

fn apply(model: Matrix4<f32>, point: Vector3<f32>) -> Vector3<f32> {
    (model * Vector4::new(point.x, point.y, point.z, 1.0)).truncate()
}

#[test]
fn default_transform_is_identity() {
    let transform = Transform::default();
    let model = transform.model_matrix();
    let identity = Matrix4::<f32>::identity();
    for col in 0..4 {
        for row in 0..4 {
            assert!((model[col][row] - identity[col][row]).abs() < EPSILON);
        }
    }
}

#[test]
fn model_matrix_scales_then_rotates_then_translates() {
    let mut transform = Transform::default();
    transform.set_scale((2.0, 2.0, 2.0));
    transform.set_rotation((0.0, 0.0, 90.0));
    transform.set_position((10.0, 0.0, 0.0));

    // (1,0,0) -> scaled (2,0,0) -> rotated (0,2,0) -> translated (10,2,0)
    let moved = apply(transform.model_matrix(), Vector3::new(1.0, 0.0, 0.0));
    assert_vec3_eq(moved, Vector3::new(10.0, 2.0, 0.0));
}

#[test]
fn model_matrix_is_memoized_until_a_setter_runs() {
    let mut transform = Transform::default();
    assert!(transform.is_dirty());

    let first = transform.model_matrix();
    assert!(!transform.is_dirty());
    assert_eq!(first, transform.model_matrix());

    transform.set_position((0.0, 3.0, 0.0));
    assert!(transform.is_dirty());
    let moved = apply(transform.model_matrix(), Vector3::new(0.0, 0.0, 0.0));
    assert_vec3_eq(moved, Vector3::new(0.0, 3.0, 0.0));
}

#[test]
fn euler_angles_rotate_x_before_y_before_z() {
    let q = euler_to_quaternion(Vector3::new(90.0, 0.0, 90.0));
    // X turns +y into +z, Z leaves +z alone
    assert_vec3_eq(q * Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
    // X leaves +x alone, Z turns it into +y
    assert_vec3_eq(q * Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
}
