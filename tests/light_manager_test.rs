mod common;

use cgmath::Vector3;
use common::test_utils::{assert_f32_eq, assert_vec3_eq, headless_gpu, test_camera, test_entity};
use voxel_ngin::{
    data_structures::{
        color::Color,
        light::{
            DirectionalLight, LightKind, PointLight, SpotLight, LIGHT_DATA_SIZE,
            MAX_DIRECTIONAL_LIGHTS,
        },
        light_manager::{point_light_influence_radius, LightManager, LIGHT_BLOCK_SLOT},
    },
    errors::RenderError,
    gpu::{headless::GpuCommand, BufferUsage},
};

fn sun() -> DirectionalLight {
    DirectionalLight::new(Vector3::new(0.0, -1.0, 0.0), Color::grey(0.5), Color::grey(0.5))
}

#[test]
fn influence_radius_solves_the_attenuation_equation() {
    let light = PointLight::at(Vector3::new(0.0, 0.0, 0.0));
    let radius = point_light_influence_radius(&light, 0.01);
    assert!((radius - 54.233).abs() < 1e-2, "radius {radius}");

    let attenuation =
        1.0 / (light.constant + light.linear * radius + light.quadratic * radius * radius);
    assert!((attenuation - 0.01).abs() < 1e-5);
}

#[test]
fn light_without_falloff_reaches_everywhere() {
    let light = PointLight::at(Vector3::new(0.0, 0.0, 0.0)).with_attenuation(1.0, 0.0, 0.0);
    assert_eq!(point_light_influence_radius(&light, 0.01), f32::MAX);
}

#[test]
fn linear_falloff_has_a_closed_form_radius() {
    let light = PointLight::at(Vector3::new(0.0, 0.0, 0.0)).with_attenuation(1.0, 1.0, 0.0);
    assert_f32_eq(point_light_influence_radius(&light, 0.5), 1.0);
}

#[test]
fn point_lights_apply_up_to_and_including_their_radius() {
    let (mut gpu, _probe) = headless_gpu();
    let mut lights = LightManager::new();
    lights.set_influence_threshold(0.5);
    lights
        .add_point_light(PointLight::at(Vector3::new(0.0, 0.0, 0.0)).with_attenuation(1.0, 1.0, 0.0))
        .expect("capacity");
    assert_f32_eq(lights.point_light_radii()[0], 1.0);

    let mut entity = test_entity(&mut gpu);
    entity.transform_mut().set_position((1.0, 0.0, 0.0));
    assert_eq!(lights.applicable_point_lights(&entity), vec![0]);

    entity.transform_mut().set_position((2.0, 0.0, 0.0));
    assert!(lights.applicable_point_lights(&entity).is_empty());
}

#[test]
fn changing_the_threshold_recomputes_radii() {
    let mut lights = LightManager::new();
    lights
        .add_point_light(PointLight::at(Vector3::new(0.0, 0.0, 0.0)).with_attenuation(1.0, 1.0, 0.0))
        .expect("capacity");
    assert_f32_eq(lights.point_light_radii()[0], 99.0);

    lights.set_influence_threshold(0.25);
    assert_f32_eq(lights.point_light_radii()[0], 3.0);
}

#[test]
fn spot_lights_apply_inside_their_cone() {
    let (mut gpu, _probe) = headless_gpu();
    let mut lights = LightManager::new();
    lights
        .add_spot_light(SpotLight::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            12.5,
            17.5,
        ))
        .expect("capacity");

    let mut entity = test_entity(&mut gpu);
    entity.transform_mut().set_position((0.0, -5.0, 0.0));
    assert_eq!(lights.applicable_spot_lights(&entity), vec![0]);

    entity.transform_mut().set_position((5.0, 0.0, 0.0));
    assert!(lights.applicable_spot_lights(&entity).is_empty());
}

#[test]
fn directional_lights_apply_everywhere() {
    let (mut gpu, _probe) = headless_gpu();
    let mut lights = LightManager::new();
    lights.add_directional_light(sun()).expect("capacity");
    lights.add_directional_light(sun()).expect("capacity");
    let entity = test_entity(&mut gpu);
    assert_eq!(lights.applicable_directional_lights(&entity), vec![0, 1]);
}

#[test]
fn adding_past_capacity_is_an_error() {
    let mut lights = LightManager::new();
    for i in 0..MAX_DIRECTIONAL_LIGHTS {
        assert_eq!(lights.add_directional_light(sun()).expect("below capacity"), i);
    }
    assert!(matches!(
        lights.add_directional_light(sun()),
        Err(RenderError::LightCapacityExceeded {
            kind: LightKind::Directional,
            capacity: MAX_DIRECTIONAL_LIGHTS
        })
    ));
    assert_eq!(lights.directional_lights().len(), MAX_DIRECTIONAL_LIGHTS);
}

#[test]
fn updates_check_the_list_they_touch() {
    let mut lights = LightManager::new();
    lights
        .add_point_light(PointLight::at(Vector3::new(0.0, 0.0, 0.0)))
        .expect("capacity");

    let spot = SpotLight::new(Vector3::new(0.0, 0.0, 0.0), Vector3::unit_x(), 10.0, 15.0);
    assert!(matches!(
        lights.update_spot_light(0, spot),
        Err(RenderError::LightIndexOutOfRange { kind: LightKind::Spot, index: 0, len: 0 })
    ));

    let moved = PointLight::at(Vector3::new(1.0, 2.0, 3.0));
    lights.update_point_light(0, moved).expect("in range");
    assert_eq!(lights.point_lights()[0].position, Vector3::new(1.0, 2.0, 3.0));
    assert!(matches!(
        lights.update_point_light(1, moved),
        Err(RenderError::LightIndexOutOfRange { kind: LightKind::Point, index: 1, len: 1 })
    ));
}

#[test]
fn light_data_is_in_view_space() {
    let mut lights = LightManager::new();
    lights.add_directional_light(sun()).expect("capacity");
    lights
        .add_point_light(PointLight::at(Vector3::new(0.0, 0.0, 0.0)))
        .expect("capacity");
    let camera = test_camera(Vector3::new(0.0, 0.0, 5.0));

    let data = lights.light_data(&camera);
    assert_eq!(data.num_directional, 1);
    assert_eq!(data.num_point, 1);
    assert_eq!(data.num_spot, 0);
    assert_vec3_eq(data.point[0].position.into(), Vector3::new(0.0, 0.0, -5.0));
    // directions ignore the camera's translation
    assert_vec3_eq(data.directional[0].direction.into(), Vector3::new(0.0, -1.0, 0.0));
    assert_f32_eq(data.point[0].quadratic, 0.032);
}

#[test]
fn ubo_is_created_once_then_rewritten() {
    let (mut gpu, probe) = headless_gpu();
    let mut lights = LightManager::new();
    lights
        .add_point_light(PointLight::at(Vector3::new(0.0, 0.0, 0.0)))
        .expect("capacity");
    let camera = test_camera(Vector3::new(0.0, 0.0, 5.0));
    assert!(lights.ubo().is_none());

    lights.update_ubo(&mut gpu, &camera);
    let ubo = lights.ubo().expect("created");
    lights.update_ubo(&mut gpu, &camera);
    assert_eq!(lights.ubo(), Some(ubo));

    assert_eq!(
        probe.count(|c| matches!(
            c,
            GpuCommand::CreateBuffer { usage: BufferUsage::Uniform, len, .. } if *len == LIGHT_DATA_SIZE
        )),
        1
    );
    assert_eq!(probe.count(|c| matches!(c, GpuCommand::WriteBuffer { buffer, .. } if *buffer == ubo)), 1);
    assert_eq!(
        probe.count(|c| *c == GpuCommand::BindUniformBlock { slot: LIGHT_BLOCK_SLOT, buffer: ubo }),
        2
    );

    let bytes = probe.buffer(ubo).expect("live buffer");
    assert_eq!(bytes.len(), LIGHT_DATA_SIZE);
    // num_point follows the three light arrays and num_directional
    let num_point = i32::from_le_bytes(bytes[55300..55304].try_into().expect("4 bytes"));
    assert_eq!(num_point, 1);
}

#[test]
fn dropping_the_manager_releases_the_ubo() {
    let (mut gpu, probe) = headless_gpu();
    let mut lights = LightManager::new();
    lights.update_ubo(&mut gpu, &test_camera(Vector3::new(0.0, 0.0, 0.0)));
    let ubo = lights.ubo().expect("created");

    drop(lights);
    gpu.collect_garbage();
    assert!(!probe.is_live(ubo));
}
