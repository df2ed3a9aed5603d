mod common;

use common::test_utils::headless_gpu;
use figment::Jail;
use voxel_ngin::{
    data_structures::shader::{Shader, entity_uniform_layout},
    gpu::{UniformValue, headless::GpuCommand},
    resources::{load_shader_source, load_string, resolve},
};

const VERTEX: &str = "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }";
const FRAGMENT: &str = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";

#[test]
fn shader_files_load_and_compile() {
    Jail::expect_with(|jail| {
        jail.create_file("tint.vert.wgsl", VERTEX)?;
        jail.create_file("tint.frag.wgsl", FRAGMENT)?;
        let dir = jail.directory();

        let source = load_shader_source(
            "Tint Shader",
            dir.join("tint.vert.wgsl"),
            dir.join("tint.frag.wgsl"),
            entity_uniform_layout(),
        )
        .map_err(|e| e.to_string())?;
        assert_eq!(source.vertex, VERTEX);
        assert_eq!(source.fragment, FRAGMENT);

        let (mut gpu, probe) = headless_gpu();
        let shader = Shader::new(&mut gpu, source).map_err(|e| e.to_string())?;
        assert_eq!(shader.label(), "Tint Shader");
        assert!(probe.commands().contains(&GpuCommand::CreateProgram {
            program: shader.program(),
            label: "Tint Shader".to_string(),
        }));

        shader.set_float(&mut gpu, "material.shininess", 8.0);
        assert_eq!(
            probe.uniform(shader.program(), "material.shininess"),
            Some(UniformValue::Float(8.0))
        );
        Ok(())
    });
}

#[test]
fn missing_stage_file_names_the_path() {
    Jail::expect_with(|jail| {
        jail.create_file("only.vert.wgsl", VERTEX)?;
        let dir = jail.directory();

        let error = load_shader_source(
            "Broken",
            dir.join("only.vert.wgsl"),
            dir.join("only.frag.wgsl"),
            entity_uniform_layout(),
        )
        .expect_err("fragment file is missing");
        assert!(error.to_string().contains("only.frag.wgsl"), "{error}");

        assert!(load_string(dir.join("nothing.txt")).is_err());
        assert_eq!(load_string(dir.join("only.vert.wgsl")).map_err(|e| e.to_string())?, VERTEX);
        Ok(())
    });
}

#[test]
fn relative_paths_resolve_against_the_root() {
    let root = std::path::Path::new("assets");
    assert_eq!(resolve(root, "stone.png"), root.join("stone.png"));

    let absolute = std::env::temp_dir().join("stone.png");
    assert_eq!(resolve(root, &absolute), absolute);
}
