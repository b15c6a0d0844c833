//! Debug side panel with live-tunable scene parameters.

use eframe::egui;
use tracing::warn;

use crate::driver::FrameDriver;
use crate::field::SamplingPolicy;
use crate::scene::Scene;
use crate::style::{AlphaMask, Blending};

pub struct DebugPanel {
    particle_count: usize,
    sampling: SamplingPolicy,
    last_error: Option<String>,
}

impl DebugPanel {
    pub fn new(scene: &Scene, sampling: SamplingPolicy) -> Self {
        Self {
            particle_count: scene.renderable().point_count(),
            sampling,
            last_error: None,
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, scene: &mut Scene, driver: &mut FrameDriver, frame_time: f32) {
        egui::SidePanel::left("Debug Panel").show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_stats(ui, scene, driver, frame_time);
                ui.separator();
                self.render_animation(ui, driver);
                ui.separator();
                self.render_style(ui, scene);
                ui.separator();
                self.render_field(ui, scene);

                if let Some(error) = &self.last_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, error.as_str());
                }
                ui.allocate_space(ui.available_size());
            });
        });
    }

    fn render_stats(&self, ui: &mut egui::Ui, scene: &Scene, driver: &FrameDriver, frame_time: f32) {
        ui.label(format!("FPS: {:.1}", 1.0 / frame_time.max(f32::EPSILON)));
        ui.label(format!("Frame Time: {:.3}ms", frame_time * 1000.0));
        ui.label(format!("Elapsed: {:.2}s", driver.elapsed()));
        ui.label(format!("Points: {}", scene.renderable().point_count()));
        let (width, height) = scene.viewport().current_size();
        ui.label(format!(
            "Viewport: {width}x{height} @ {:.2}x",
            scene.viewport().pixel_ratio()
        ));
    }

    fn render_animation(&self, ui: &mut egui::Ui, driver: &mut FrameDriver) {
        let mut rate = driver.rotation_rate();
        ui.horizontal(|ui| {
            ui.label("Rotation Rate: ");
            ui.add(egui::Slider::new(&mut rate, -2.0..=2.0));
        });
        if rate != driver.rotation_rate() {
            driver.set_rotation_rate(rate);
        }
    }

    fn render_style(&mut self, ui: &mut egui::Ui, scene: &mut Scene) {
        let mut style = scene.renderable().style().clone();

        ui.horizontal(|ui| {
            ui.label("Point Size: ");
            ui.add(
                egui::DragValue::new(&mut style.size)
                    .speed(0.01)
                    .clamp_range(0.001..=50.0),
            );
        });
        ui.checkbox(&mut style.size_attenuation, "Size attenuation");
        ui.checkbox(&mut style.vertex_colors, "Vertex colors");
        if !style.vertex_colors {
            ui.horizontal(|ui| {
                ui.label("Color: ");
                ui.color_edit_button_rgb(&mut style.color);
            });
        }

        let mut masked = style.alpha_mask.is_some();
        ui.checkbox(&mut masked, "Soft circular sprites");
        style.alpha_mask = match (masked, style.alpha_mask) {
            (false, _) => None,
            (true, Some(AlphaMask::SoftCircle { mut feather })) => {
                ui.horizontal(|ui| {
                    ui.label("Feather: ");
                    ui.add(egui::Slider::new(&mut feather, 0.0..=1.0));
                });
                Some(AlphaMask::SoftCircle { feather })
            }
            (true, None) => Some(AlphaMask::SoftCircle { feather: 0.5 }),
        };

        ui.checkbox(&mut style.transparent, "Transparent");
        ui.checkbox(&mut style.depth_test, "Depth test");
        ui.checkbox(&mut style.depth_write, "Depth write");
        ui.horizontal(|ui| {
            ui.label("Blending: ");
            ui.radio_value(&mut style.blending, Blending::Normal, "Normal");
            ui.radio_value(&mut style.blending, Blending::Additive, "Additive");
        });

        if &style != scene.renderable().style() {
            if let Err(err) = scene.renderable_mut().set_style(style) {
                warn!(error = %err, "Rejected style change");
                self.last_error = Some(err.to_string());
            }
        }
    }

    fn render_field(&mut self, ui: &mut egui::Ui, scene: &mut Scene) {
        ui.horizontal(|ui| {
            ui.label("Particles: ");
            ui.add(
                egui::DragValue::new(&mut self.particle_count)
                    .speed(1000.0)
                    .clamp_range(1..=5_000_000),
            );
        });

        let mut disc = matches!(self.sampling, SamplingPolicy::AnnularDisc { .. });
        ui.horizontal(|ui| {
            ui.radio_value(&mut disc, true, "Disc");
            ui.radio_value(&mut disc, false, "Cube");
        });

        self.sampling = match (disc, self.sampling) {
            (true, SamplingPolicy::AnnularDisc { mut r_min, mut r_max, mut height }) => {
                drag(ui, "Inner Radius: ", &mut r_min);
                drag(ui, "Outer Radius: ", &mut r_max);
                drag(ui, "Height: ", &mut height);
                SamplingPolicy::AnnularDisc { r_min, r_max, height }
            }
            (false, SamplingPolicy::UniformCube { mut half_extent }) => {
                drag(ui, "Half Extent: ", &mut half_extent);
                SamplingPolicy::UniformCube { half_extent }
            }
            (true, SamplingPolicy::UniformCube { .. }) => SamplingPolicy::default(),
            (false, SamplingPolicy::AnnularDisc { .. }) => SamplingPolicy::UniformCube { half_extent: 5.0 },
        };

        if ui.button("Regenerate").clicked() {
            self.last_error = scene
                .regenerate(self.particle_count, self.sampling)
                .err()
                .map(|err| {
                    warn!(error = %err, "Regeneration failed");
                    err.to_string()
                });
        }
    }
}

fn drag(ui: &mut egui::Ui, label: &str, value: &mut f32) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::DragValue::new(value).speed(0.1).clamp_range(0.0..=1000.0));
    });
}
