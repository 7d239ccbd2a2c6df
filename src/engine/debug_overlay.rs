use egui::epaint::Shadow;

/// Where hand frames are coming from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    /// Keyboard and mouse stand in for the hand.
    Simulator,
    /// External landmark command is streaming.
    Running,
    /// External command exited; the scene holds its last mode.
    Ended,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simulator => "simulator (F fist, O open, mouse = hand)",
            Self::Running => "landmark model",
            Self::Ended => "landmark model ended",
        }
    }
}

pub struct HudStats {
    pub fps: u32,
    pub frame_time_avg_ms: f32,
    pub frame_time_max_ms: f32,
    pub mode: &'static str,
    /// `None` while no hand is in frame.
    pub pose: Option<&'static str>,
    pub fingers: u8,
    pub hand: (f32, f32),
    pub photo_count: usize,
    pub focus: usize,
    pub entity_count: usize,
    pub draw_calls: u32,
    /// Yaw and pitch in degrees, then distance.
    pub camera: (f32, f32, f32),
    pub source: SourceStatus,
}

pub const HELP_LINE: &str =
    "1/2/3 tree/scatter/zoom · ←/→ photos · R reset · F3 HUD · Esc quit · drop images to add";

pub struct HudOverlay {
    pub visible: bool,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl HudOverlay {
    pub fn new(
        window: &winit::window::Window,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let egui_ctx = egui::Context::default();

        // Style: dark, semi-transparent, small monospace white font
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgba_premultiplied(0, 0, 0, 180);
        visuals.window_stroke = egui::Stroke::NONE;
        visuals.window_shadow = Shadow::NONE;
        visuals.override_text_color = Some(egui::Color32::WHITE);
        egui_ctx.set_visuals(visuals);

        let mut style = (*egui_ctx.style()).clone();
        style.override_font_id = Some(egui::FontId::monospace(13.0));
        egui_ctx.set_style(style);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            None,  // no depth
            1,     // msaa samples
            false, // no dithering
        );

        Self {
            visible: true,
            egui_ctx,
            egui_state,
            egui_renderer,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn handle_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// Render one egui frame. The mode banner is always drawn; the stats
    /// panel and help line only while `visible`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &winit::window::Window,
        view: &wgpu::TextureView,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        stats: &HudStats,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);
        let visible = self.visible;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            // ── Mode banner, top centre ──────────────────────────────────────
            egui::Area::new(egui::Id::new("mode_banner"))
                .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 12.0))
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(stats.mode)
                            .size(22.0)
                            .color(egui::Color32::from_rgb(255, 214, 120)),
                    );
                });

            if !visible {
                return;
            }

            // ── F3: stats panel ──────────────────────────────────────────────
            egui::Area::new(egui::Id::new("hud_stats"))
                .fixed_pos(egui::pos2(10.0, 10.0))
                .show(ctx, |ui| {
                    egui::Frame::none()
                        .fill(egui::Color32::from_rgba_premultiplied(0, 0, 0, 180))
                        .inner_margin(egui::Margin::same(8.0))
                        .rounding(4.0)
                        .show(ui, |ui: &mut egui::Ui| {
                            ui.label(format!("FPS: {}", stats.fps));
                            ui.label(format!(
                                "Frame: {:.2} ms (max: {:.1})",
                                stats.frame_time_avg_ms, stats.frame_time_max_ms
                            ));
                            ui.label(format!("Mode: {}", stats.mode));
                            match stats.pose {
                                Some(pose) => ui.label(format!(
                                    "Hand: {pose} ({} fingers) at ({:+.2}, {:+.2})",
                                    stats.fingers, stats.hand.0, stats.hand.1
                                )),
                                None => ui.label("Hand: none"),
                            };
                            if stats.photo_count > 0 {
                                ui.label(format!(
                                    "Photos: {}  focus {}/{}",
                                    stats.photo_count,
                                    stats.focus + 1,
                                    stats.photo_count
                                ));
                            } else {
                                ui.label("Photos: none (drop images on the window)");
                            }
                            ui.label(format!("Entities: {}", stats.entity_count));
                            ui.label(format!("Draw calls: {}", stats.draw_calls));
                            ui.label(format!(
                                "Camera: yaw {:.0}°  pitch {:.0}°  dist {:.1}",
                                stats.camera.0, stats.camera.1, stats.camera.2
                            ));
                            ui.label(format!("Source: {}", stats.source.as_str()));
                        });
                });

            // ── Help line, bottom left ───────────────────────────────────────
            egui::Area::new(egui::Id::new("hud_help"))
                .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(10.0, -10.0))
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(HELP_LINE)
                            .color(egui::Color32::from_rgba_unmultiplied(255, 255, 255, 170)),
                    );
                });
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, &tris, screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("HUD Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.egui_renderer
                .render(&mut render_pass.forget_lifetime(), &tris, screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_labels_are_distinct() {
        let labels = [SourceStatus::Simulator, SourceStatus::Running, SourceStatus::Ended]
            .map(|s| s.as_str());
        assert_ne!(labels[0], labels[1]);
        assert_ne!(labels[1], labels[2]);
        assert!(HELP_LINE.contains("R reset"));
    }
}
