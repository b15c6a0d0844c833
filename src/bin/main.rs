use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use eframe::egui;
use eframe::egui_wgpu::{self, wgpu};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use particle_field::gpu::{DEPTH_FORMAT, PointCloudRenderer};
use particle_field::panel::DebugPanel;
use particle_field::{
    Error, FrameDriver, FrameTimer, GpuFrame, PointUpload, Presenter, Preset, Scene, SceneConfig,
    SurfaceSize, Viewport,
};

#[derive(Parser, Debug)]
#[command(about = "Animated GPU particle field")]
struct Args {
    /// YAML scene description; overrides --preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in scene: ring, cube or glow
    #[arg(short, long, default_value = "ring")]
    preset: Preset,

    /// Override the particle count
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Show the debug panel
    #[arg(long)]
    debug: bool,
}

/// Presenter-side state that outlives a single frame.
struct SurfaceState {
    surface: SurfaceSize,
    uploaded_revision: Option<u64>,
}

/// Hands a frame to egui as a wgpu paint callback.
struct PaintPresenter<'a> {
    painter: &'a egui::Painter,
    rect: egui::Rect,
    state: &'a mut SurfaceState,
}

impl Presenter for PaintPresenter<'_> {
    fn resize_surface(&mut self, surface: SurfaceSize) {
        self.state.surface = surface;
    }

    fn present(&mut self, scene: &Scene) -> particle_field::Result<()> {
        let frame = GpuFrame::new(scene, self.state.surface).to_bytes()?;

        let renderable = scene.renderable();
        let upload = if self.state.uploaded_revision != Some(renderable.revision()) {
            let upload = PointUpload::new(renderable)?;
            self.state.uploaded_revision = Some(upload.revision);
            Some(Arc::new(upload))
        } else {
            None
        };
        let pipeline_key = renderable.style().pipeline_key();

        self.painter.add(egui::PaintCallback {
            rect: self.rect,
            callback: Arc::new(
                egui_wgpu::CallbackFn::new()
                    .prepare(move |device, queue, _encoder, paint_callback_resources| {
                        match paint_callback_resources.get_mut::<PointCloudRenderer>() {
                            Some(renderer) => renderer.prepare(
                                &frame,
                                upload.as_deref(),
                                pipeline_key,
                                device,
                                queue,
                            ),
                            None => vec![],
                        }
                    })
                    .paint(move |_info, render_pass, paint_callback_resources| {
                        if let Some(renderer) = paint_callback_resources.get::<PointCloudRenderer>() {
                            renderer.paint(render_pass);
                        }
                    }),
            ),
        });
        Ok(())
    }
}

struct ParticleFieldApp {
    scene: Scene,
    driver: FrameDriver,
    timer: FrameTimer,
    surface_state: SurfaceState,
    panel: Option<DebugPanel>,
    fatal: Option<Error>,
}

impl ParticleFieldApp {
    fn new(cc: &eframe::CreationContext, config: SceneConfig, debug: bool) -> particle_field::Result<Self> {
        let render_state = cc.wgpu_render_state.as_ref().ok_or_else(|| {
            Error::ResourceUnavailable("wgpu render state is not available".to_string())
        })?;

        let screen = cc.egui_ctx.screen_rect();
        let viewport = Viewport::new(
            screen.width().round() as i32,
            screen.height().round() as i32,
            cc.egui_ctx.pixels_per_point(),
        );
        let scene = Scene::new(&config, viewport)?;

        let renderer = PointCloudRenderer::new(render_state, scene.renderable().style());
        render_state
            .renderer
            .write()
            .paint_callback_resources
            .insert(renderer);

        let panel = debug.then(|| DebugPanel::new(&scene, config.sampling));
        let surface_state = SurfaceState {
            surface: scene.viewport().surface_size(),
            uploaded_revision: None,
        };

        Ok(Self {
            scene,
            driver: FrameDriver::new(config.rotation_rate),
            timer: FrameTimer::new(),
            surface_state,
            panel,
            fatal: None,
        })
    }
}

impl eframe::App for ParticleFieldApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(err) = &self.fatal {
            show_error(ctx, err);
            return;
        }

        let dt = self.timer.lap();

        if let Some(panel) = &mut self.panel {
            panel.show(ctx, &mut self.scene, &mut self.driver, dt.as_secs_f32());
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let (rect, _response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());

                let mut presenter = PaintPresenter {
                    painter: ui.painter(),
                    rect,
                    state: &mut self.surface_state,
                };

                let width = rect.width().round() as i32;
                let height = rect.height().round() as i32;
                let (current_width, current_height) = self.scene.viewport().current_size();
                if (current_width as i32, current_height as i32) != (width.max(1), height.max(1)) {
                    self.scene.resize(width, height, &mut presenter);
                }
                self.scene
                    .set_device_pixel_ratio(ctx.pixels_per_point(), &mut presenter);

                if let Err(err) = self.driver.tick(&mut self.scene, dt.as_secs_f64(), &mut presenter) {
                    error!(error = %err, "Presentation failed");
                    self.fatal = Some(err);
                }
            });

        // Next tick on the next display refresh
        ctx.request_repaint();
    }
}

/// Shown in place of the scene when startup or presentation fails.
struct StartupFailure(Error);

impl eframe::App for StartupFailure {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        show_error(ctx, &self.0);
    }
}

fn show_error(ctx: &egui::Context, err: &Error) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.colored_label(egui::Color32::LIGHT_RED, err.to_string());
    });
}

fn load_config(args: &Args) -> Result<SceneConfig> {
    let mut config = match &args.config {
        Some(path) => SceneConfig::from_yaml_file(path)?,
        None => SceneConfig::preset(args.preset),
    };
    if let Some(count) = args.count {
        config.particle_count = count;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,particle_field=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        preset = args.preset.name(),
        particles = config.particle_count,
        debug = args.debug,
        "Starting particle field"
    );

    let debug = args.debug;
    eframe::run_native(
        "Particle Field",
        eframe::NativeOptions {
            renderer: eframe::Renderer::Wgpu,
            wgpu_options: egui_wgpu::WgpuConfiguration {
                present_mode: wgpu::PresentMode::AutoVsync,
                depth_format: Some(DEPTH_FORMAT),
                ..Default::default()
            },
            vsync: true,
            depth_buffer: 32,
            ..Default::default()
        },
        Box::new(move |cc| match ParticleFieldApp::new(cc, config, debug) {
            Ok(app) => Box::new(app) as Box<dyn eframe::App>,
            Err(err) => {
                error!(error = %err, "Failed to start renderer");
                Box::new(StartupFailure(err))
            }
        }),
    )
    .map_err(|e| Error::ResourceUnavailable(e.to_string()))?;

    Ok(())
}
