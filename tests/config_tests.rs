use std::io::Write;

use particle_field::{
    AlphaMask, Blending, Error, Preset, RenderStyle, SamplingPolicy, Scene, SceneConfig, Viewport,
};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::NamedTempFile;
use test_case::test_case;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test_case(Preset::Ring ; "ring")]
#[test_case(Preset::Cube ; "cube")]
#[test_case(Preset::Glow ; "glow")]
fn preset_survives_a_yaml_file(preset: Preset) {
    let config = SceneConfig::preset(preset);
    let file = write_temp(&config.to_yaml().unwrap());

    let loaded = SceneConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn glow_yaml_uses_readable_tags() {
    let yaml = r#"
particle_count: 1000
sampling:
  kind: uniform_cube
  half_extent: 3.0
style:
  size: 0.5
  alpha_mask:
    kind: soft_circle
    feather: 0.25
  transparent: true
  depth_test: false
  blending: additive
rotation_rate: -0.3
"#;
    let file = write_temp(yaml);
    let config = SceneConfig::from_yaml_file(file.path()).unwrap();

    assert_eq!(config.sampling, SamplingPolicy::UniformCube { half_extent: 3.0 });
    assert_eq!(config.style.alpha_mask, Some(AlphaMask::SoftCircle { feather: 0.25 }));
    assert_eq!(config.style.blending, Blending::Additive);
    assert!(!config.style.depth_test);
    assert!(config.style.vertex_colors);
    assert_eq!(config.rotation_rate, -0.3);

    let scene = Scene::with_rng(&config, Viewport::new(320, 240, 1.0), &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(scene.renderable().point_count(), 1000);
    assert_eq!(scene.renderable().style(), &config.style);
}

#[test_case("particle_count: 0\n" ; "zero particles")]
#[test_case("sampling:\n  kind: annular_disc\n  r_min: 4.0\n  r_max: 2.0\n  height: 1.0\n" ; "inverted radii")]
#[test_case("style:\n  size: 0.0\n" ; "zero point size")]
#[test_case("camera:\n  near: 10.0\n  far: 1.0\n" ; "inverted planes")]
fn invalid_files_are_rejected(yaml: &str) {
    let file = write_temp(yaml);
    assert!(matches!(
        SceneConfig::from_yaml_file(file.path()),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn malformed_yaml_is_a_config_error() {
    let file = write_temp("sampling:\n  kind: sphere\n");
    assert!(matches!(
        SceneConfig::from_yaml_file(file.path()),
        Err(Error::Yaml(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        SceneConfig::from_yaml_file(dir.path().join("absent.yaml")),
        Err(Error::Io(_))
    ));
}

#[test]
fn empty_mapping_is_the_ring() {
    let file = write_temp("{}\n");
    let config = SceneConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config, SceneConfig::default());
    assert_eq!(config.style, RenderStyle::default());
}
