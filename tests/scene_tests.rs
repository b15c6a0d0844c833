use particle_field::{
    DriverState, Error, FrameDriver, GpuFrame, ParticleField, Presenter, RenderStyle,
    SamplingPolicy, Scene, SceneConfig, SurfaceSize, Viewport,
};
use particle_field::layout::{FLAG_ALPHA_MASK, FLAG_SIZE_ATTENUATION, FLAG_VERTEX_COLORS};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use test_case::test_case;

/// Records everything handed to the external renderer.
#[derive(Default)]
struct RecordingPresenter {
    surfaces: Vec<SurfaceSize>,
    presented_angles: Vec<f32>,
    presented_aspects: Vec<f32>,
    fail_after: Option<usize>,
}

impl Presenter for RecordingPresenter {
    fn resize_surface(&mut self, surface: SurfaceSize) {
        self.surfaces.push(surface);
    }

    fn present(&mut self, scene: &Scene) -> particle_field::Result<()> {
        if self.fail_after == Some(self.presented_angles.len()) {
            return Err(Error::ExternalRuntimeFailure("context lost".to_string()));
        }
        self.presented_angles
            .push(scene.renderable().transform.rotation.y.0);
        self.presented_aspects.push(scene.camera().aspect());
        Ok(())
    }
}

fn small_scene() -> Scene {
    let config = SceneConfig {
        particle_count: 64,
        ..SceneConfig::default()
    };
    Scene::with_rng(&config, Viewport::new(800, 600, 1.0), &mut StdRng::seed_from_u64(5)).unwrap()
}

// ==================================================================================
// Viewport and resize
// ==================================================================================

#[test]
fn resize_is_idempotent() {
    let mut once = small_scene();
    let mut twice = small_scene();
    let mut presenter = RecordingPresenter::default();

    let a = once.resize(1280, 720, &mut presenter);
    twice.resize(1280, 720, &mut presenter);
    let b = twice.resize(1280, 720, &mut presenter);

    assert_eq!(a, b);
    assert_eq!(once.viewport().aspect(), twice.viewport().aspect());
    assert_eq!(once.camera().projection_matrix(), twice.camera().projection_matrix());
}

#[test]
fn malformed_resize_clamps_to_one_pixel() {
    let mut scene = small_scene();
    let mut presenter = RecordingPresenter::default();

    scene.resize(800, 600, &mut presenter);
    let surface = scene.resize(0, 0, &mut presenter);

    assert_eq!(scene.viewport().current_size(), (1, 1));
    assert_eq!((surface.width, surface.height), (1, 1));
    assert_eq!(scene.viewport().aspect(), 1.0);
    assert_eq!(scene.camera().aspect(), 1.0);
    assert!(scene.camera().projection_matrix().x.x.is_finite());
}

#[test]
fn resize_reaches_camera_and_surface_together() {
    let mut scene = small_scene();
    let mut presenter = RecordingPresenter::default();
    let mut driver = FrameDriver::default();

    scene.resize(1000, 500, &mut presenter);
    driver.tick(&mut scene, 0.0, &mut presenter).unwrap();

    assert_eq!(presenter.surfaces.len(), 1);
    assert_eq!(presenter.surfaces[0].width, 1000);
    assert_eq!(presenter.presented_aspects, vec![2.0]);
}

#[test_case(1.0, 1.0 ; "standard display")]
#[test_case(2.0, 2.0 ; "retina display")]
#[test_case(3.0, 2.0 ; "dense display is capped")]
fn surface_uses_capped_pixel_ratio(device_ratio: f32, expected: f32) {
    let mut scene = small_scene();
    let mut presenter = RecordingPresenter::default();

    scene.set_device_pixel_ratio(device_ratio, &mut presenter);
    let surface = scene.resize(400, 300, &mut presenter);

    assert_eq!(surface.pixel_ratio, expected);
    assert_eq!(surface.physical_width, (400.0 * expected) as u32);
    assert_eq!(surface.physical_height, (300.0 * expected) as u32);
}

// ==================================================================================
// Frame driver
// ==================================================================================

#[test_case(1 ; "single step")]
#[test_case(10 ; "one step per second")]
#[test_case(600 ; "sixty frames per second")]
#[test_case(1000 ; "thousand frames")]
fn rotation_after_ten_seconds_is_one_radian(steps: usize) {
    let mut scene = small_scene();
    let mut presenter = RecordingPresenter::default();
    let mut driver = FrameDriver::new(0.1);

    driver.start();
    let dt = 10.0 / steps as f64;
    for _ in 0..steps {
        driver.tick(&mut scene, dt, &mut presenter).unwrap();
    }

    assert!((driver.elapsed() - 10.0).abs() < 1e-9);
    let angle = scene.renderable().transform.rotation.y.0;
    assert!((angle - 1.0).abs() < 1e-5, "angle {angle}");
}

#[test]
fn rotation_is_monotonic_and_proportional() {
    let mut scene = small_scene();
    let mut presenter = RecordingPresenter::default();
    let mut driver = FrameDriver::new(0.1);

    let deltas = [0.016, 0.017, 0.0, 0.5, -0.2, 0.033, 2.0];
    for dt in deltas {
        driver.tick(&mut scene, dt, &mut presenter).unwrap();
        let expected = (f64::from(driver.rotation_rate()) * driver.elapsed()) as f32;
        assert_eq!(scene.renderable().transform.rotation.y.0, expected);
    }

    assert!(
        presenter
            .presented_angles
            .windows(2)
            .all(|pair| pair[0] <= pair[1])
    );
}

#[test]
fn first_tick_starts_at_zero() {
    let mut scene = small_scene();
    let mut presenter = RecordingPresenter::default();
    let mut driver = FrameDriver::default();

    assert_eq!(driver.state(), DriverState::Idle);
    driver.tick(&mut scene, 5.0, &mut presenter).unwrap();

    assert_eq!(driver.state(), DriverState::Running);
    assert_eq!(driver.elapsed(), 0.0);
    assert_eq!(presenter.presented_angles, vec![0.0]);
    assert_eq!(driver.frames(), 1);
}

#[test]
fn presenter_failure_is_propagated() {
    let mut scene = small_scene();
    let mut presenter = RecordingPresenter {
        fail_after: Some(2),
        ..RecordingPresenter::default()
    };
    let mut driver = FrameDriver::default();

    driver.tick(&mut scene, 0.016, &mut presenter).unwrap();
    driver.tick(&mut scene, 0.016, &mut presenter).unwrap();
    let err = driver.tick(&mut scene, 0.016, &mut presenter).unwrap_err();

    assert!(matches!(err, Error::ExternalRuntimeFailure(_)));
    assert_eq!(driver.frames(), 2);
}

// ==================================================================================
// Buffers under transform
// ==================================================================================

#[test]
fn transforms_never_touch_buffers() {
    let config = SceneConfig {
        particle_count: 256,
        ..SceneConfig::default()
    };
    let original =
        ParticleField::generate_with(256, config.sampling, &mut StdRng::seed_from_u64(21)).unwrap();
    let mut scene =
        Scene::with_rng(&config, Viewport::new(640, 480, 1.0), &mut StdRng::seed_from_u64(21)).unwrap();
    let mut presenter = RecordingPresenter::default();
    let mut driver = FrameDriver::default();

    for _ in 0..100 {
        driver.tick(&mut scene, 0.25, &mut presenter).unwrap();
    }
    scene.renderable_mut().transform.position.x = 3.0;
    scene.renderable_mut().transform.scale.y = 2.0;

    assert_eq!(scene.renderable().positions(), original.positions());
    assert_eq!(scene.renderable().colors(), original.colors());
    assert_eq!(scene.renderable().revision(), 0);
    assert!(scene.renderable().transform.rotation.y.0 > 0.0);
}

#[test]
fn regeneration_replaces_both_buffers() {
    let mut scene = small_scene();
    scene
        .regenerate(10, SamplingPolicy::UniformCube { half_extent: 1.0 })
        .unwrap();

    assert_eq!(scene.renderable().point_count(), 10);
    assert_eq!(scene.renderable().positions().len(), 30);
    assert_eq!(scene.renderable().colors().len(), 30);
    assert_eq!(scene.renderable().revision(), 1);

    assert!(scene.regenerate(0, SamplingPolicy::default()).is_err());
    assert_eq!(scene.renderable().point_count(), 10);
}

#[test]
fn frame_uniform_reflects_style_and_surface() {
    let mut config = SceneConfig::default();
    config.particle_count = 8;
    config.style = RenderStyle::glow(0.4);
    let scene =
        Scene::with_rng(&config, Viewport::new(300, 200, 3.0), &mut StdRng::seed_from_u64(2)).unwrap();

    let frame = GpuFrame::new(&scene, scene.viewport().surface_size());
    assert_eq!(frame.point_size, 0.4);
    assert_eq!(frame.pixel_ratio, 2.0);
    assert_eq!((frame.viewport.x, frame.viewport.y), (600.0, 400.0));
    assert_eq!(
        frame.flags,
        FLAG_SIZE_ATTENUATION | FLAG_VERTEX_COLORS | FLAG_ALPHA_MASK
    );
    assert_eq!(frame.to_bytes().unwrap().len(), 240);
}
