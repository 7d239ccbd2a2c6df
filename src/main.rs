// Memory tree: a gesture-driven 3D tree of ornaments, lights and photos.
//
// Per frame:
//   hand frames (landmark model or simulator) → classify → AppState
//   → SceneState / SceneClock / ViewAnchor resources → ECS schedule → render

mod app_state;
mod config;
mod engine;
mod gesture;
mod landmarks;
mod photos;
mod positions;
mod renderer;
mod scene;

use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use anyhow::Context;
use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use winit::{
    event::{ElementState, Event as WinitEvent, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use app_state::{AppEvent, AppState, Mode};
use config::{AppConfig, Invocation, USAGE};
use engine::camera::OrbitCamera;
use engine::debug_overlay::{HudStats, SourceStatus};
use engine::input::InputState;
use engine::systems::build_schedule;
use engine::{SceneClock, SceneState, ViewAnchor};
use landmarks::{HandFrame, ProcessLandmarkSource, StampedFrame, spawn_landmark_source};
use photos::PhotoLibrary;
use renderer::Renderer;

/// Longest frame step fed to the simulation, seconds.
const MAX_FRAME_DT: f32 = 0.1;

// ============================================================================
// FRAME TIMING
// ============================================================================

#[derive(Default)]
struct FrameStats {
    frames: u32,
    accum: f32,
    worst: f32,
    fps: u32,
    avg_ms: f32,
    max_ms: f32,
}

impl FrameStats {
    fn record(&mut self, dt: f32) {
        self.frames += 1;
        self.accum += dt;
        self.worst = self.worst.max(dt);
        if self.accum >= 1.0 {
            self.fps = self.frames;
            self.avg_ms = self.accum / self.frames as f32 * 1000.0;
            self.max_ms = self.worst * 1000.0;
            log::debug!("FPS: {} | frame {:.2} ms (max {:.1})", self.fps, self.avg_ms, self.max_ms);
            self.frames = 0;
            self.accum = 0.0;
            self.worst = 0.0;
        }
    }
}

// ============================================================================
// APPLICATION
// ============================================================================

struct App {
    renderer: Renderer,
    world: World,
    schedule: Schedule,
    camera: OrbitCamera,
    input: InputState,
    state: AppState,
    library: PhotoLibrary,
    config: AppConfig,

    /// `None` runs the keyboard/mouse simulator.
    landmarks: Option<Receiver<StampedFrame>>,
    source: SourceStatus,
    rng: StdRng,

    start: Instant,
    last_update: Instant,
    elapsed: f32,
    frame_stats: FrameStats,
}

impl App {
    fn new(renderer: Renderer, config: AppConfig) -> Self {
        let mut world = World::new();
        scene::populate(&mut world, &config.scene);

        let landmarks = config
            .landmarks
            .as_ref()
            .map(|command| spawn_landmark_source(ProcessLandmarkSource::new(command.clone())));
        let source = if landmarks.is_some() { SourceStatus::Running } else { SourceStatus::Simulator };

        let mut input = InputState::new();
        let size = renderer.size();
        input.window_size = (size.width, size.height);
        let library = PhotoLibrary::new(config.photo.clone(), renderer.max_texture_side());

        let now = Instant::now();
        Self {
            renderer,
            world,
            schedule: build_schedule(),
            camera: OrbitCamera::new(),
            input,
            state: AppState::new(&config.gesture),
            library,
            rng: StdRng::seed_from_u64(config.scene.seed.wrapping_add(1)),
            config,
            landmarks,
            source,
            start: now,
            last_update: now,
            elapsed: 0.0,
            frame_stats: FrameStats::default(),
        }
    }

    // ── Photos ──────────────────────────────────────────────────────────────

    fn add_photo(&mut self, path: &Path) {
        let slot = match self.library.add_from_path(path) {
            Ok(slot) => slot,
            Err(e) => {
                log::warn!("photo skipped: {e}");
                return;
            }
        };
        let Some(photo) = self.library.get(slot) else {
            return;
        };
        let texture_slot = self.renderer.add_photo_texture(photo);
        debug_assert_eq!(texture_slot, slot);
        scene::spawn_photo(&mut self.world, slot, photo.aspect(), &self.config.scene);

        let events = self.state.photos_changed(self.library.len());
        self.apply(events);
    }

    fn reset(&mut self) {
        let removed = scene::clear_photos(&mut self.world);
        self.library.clear();
        self.renderer.clear_photo_textures();
        if removed > 0 {
            log::info!("cleared {removed} photos");
        }

        let mut events = self.state.reset();
        events.extend(self.state.photos_changed(0));
        self.apply(events);
    }

    // ── Per-frame update ────────────────────────────────────────────────────

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_update).as_secs_f32().min(MAX_FRAME_DT);
        self.last_update = now;
        self.elapsed = (now - self.start).as_secs_f32();

        self.handle_keys();
        self.feed_gestures();

        self.camera.update(&self.input, self.state.mode(), self.state.hand(), dt);

        *self.world.resource_mut::<SceneClock>() = SceneClock { elapsed: self.elapsed, dt };
        *self.world.resource_mut::<SceneState>() = SceneState {
            mode: self.state.mode(),
            focus: self.state.focus(),
            photo_count: self.state.photo_count(),
        };
        *self.world.resource_mut::<ViewAnchor>() = ViewAnchor {
            zoom_point: self.camera.zoom_point(),
            eye: self.camera.eye(),
        };

        self.schedule.run(&mut self.world);
        self.frame_stats.record(dt);
    }

    fn handle_keys(&mut self) {
        if self.input.just_pressed(KeyCode::F3) {
            self.renderer.hud.toggle();
        }
        if self.input.just_pressed(KeyCode::KeyR) {
            log::info!("reset");
            self.reset();
        }

        let forced = [
            (KeyCode::Digit1, Mode::Tree),
            (KeyCode::Digit2, Mode::Scattered),
            (KeyCode::Digit3, Mode::Zoom),
        ];
        for (key, mode) in forced {
            if self.input.just_pressed(key) {
                let event = self.state.force_mode(mode);
                self.apply(event.into_iter().collect());
            }
        }

        for (key, step) in [(KeyCode::ArrowLeft, -1), (KeyCode::ArrowRight, 1)] {
            if self.input.just_pressed(key) {
                let event = self.state.cycle_focus(step);
                self.apply(event.into_iter().collect());
            }
        }
    }

    fn feed_gestures(&mut self) {
        let Some(rx) = &self.landmarks else {
            let events = self.state.update(self.input.simulated_reading(), self.elapsed);
            self.apply(events);
            return;
        };

        let frames: Vec<StampedFrame> = rx.try_iter().collect();
        for StampedFrame { at, frame } in frames {
            let t = at.saturating_duration_since(self.start).as_secs_f32();
            let events = match frame {
                HandFrame::Detected(hand) => {
                    let reading = gesture::classify(&hand, &self.config.gesture);
                    self.state.update(Some(reading), t)
                }
                HandFrame::NoHand => self.state.update(None, t),
                HandFrame::Ended => {
                    if self.source != SourceStatus::Ended {
                        log::warn!("landmark source ended; holding the current mode");
                        self.source = SourceStatus::Ended;
                    }
                    Vec::new()
                }
            };
            self.apply(events);
        }

        // No more frames will come: let the remembered hand relax.
        if self.source == SourceStatus::Ended {
            let events = self.state.update(None, self.elapsed);
            self.apply(events);
        }
    }

    fn apply(&mut self, events: Vec<AppEvent>) {
        for event in events {
            match event {
                AppEvent::ModeChanged { from, to } => {
                    log::info!("mode {} -> {}", from.as_str(), to.as_str());
                    scene::spawn_burst(&mut self.world, &mut self.rng, Vec3::ZERO, self.config.scene.burst);
                }
                AppEvent::FocusChanged { index } => {
                    log::info!("focus photo {}/{}", index + 1, self.library.len());
                }
                AppEvent::PoseCommitted(_) => {}
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────────────────

    fn hud_stats(&self) -> HudStats {
        let reading = self.state.last_reading();
        let hand = self.state.hand();
        HudStats {
            fps: self.frame_stats.fps,
            frame_time_avg_ms: self.frame_stats.avg_ms,
            frame_time_max_ms: self.frame_stats.max_ms,
            mode: self.state.mode().as_str(),
            pose: reading.map(|r| r.pose().as_str()),
            fingers: reading.map_or(0, |r| r.fingers),
            hand: (hand.x, hand.y),
            photo_count: self.library.len(),
            focus: self.state.focus(),
            entity_count: self.world.entities().len() as usize,
            draw_calls: 0,
            camera: (
                self.camera.yaw().to_degrees(),
                self.camera.pitch().to_degrees(),
                self.camera.distance(),
            ),
            source: self.source,
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let mut stats = self.hud_stats();
        self.renderer
            .render(&mut self.world, &self.camera, self.elapsed, &mut stats)
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"),
    )
    .init();

    let config = match AppConfig::from_args(std::env::args().skip(1))? {
        Invocation::Help => {
            print!("{USAGE}");
            return Ok(());
        }
        Invocation::Run(config) => config,
    };

    let event_loop = EventLoop::new().context("creating event loop")?;

    let window_attributes = Window::default_attributes()
        .with_title("Memory Tree")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

    let window = Arc::new(
        event_loop
            .create_window(window_attributes)
            .context("creating window")?,
    );

    let renderer = pollster::block_on(Renderer::new(window.clone())).context("initialising GPU")?;

    let startup_photos = config.photos.clone();
    let mut app = App::new(renderer, config);
    for path in &startup_photos {
        app.add_photo(path);
    }

    log::info!(
        "memory tree ready: {} photos, hand source: {}",
        app.library.len(),
        app.source.as_str()
    );
    if app.library.is_empty() {
        log::info!("no photos yet; drop image files onto the window to add some");
    }

    event_loop
        .run(move |event, control_flow| match event {
            WinitEvent::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => {
                let _ = app.renderer.hud.handle_window_event(&window, event);
                app.input.process_event(event);

                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: PhysicalKey::Code(KeyCode::Escape),
                                ..
                            },
                        ..
                    } => control_flow.exit(),
                    WindowEvent::Resized(physical_size) => {
                        app.renderer.resize(*physical_size);
                    }
                    WindowEvent::DroppedFile(path) => {
                        app.add_photo(path);
                    }
                    WindowEvent::RedrawRequested => {
                        app.update();
                        match app.render() {
                            Ok(()) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                let size = app.renderer.size();
                                app.renderer.resize(size);
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("GPU out of memory");
                                control_flow.exit();
                            }
                            Err(e) => log::warn!("surface error: {e:?}"),
                        }
                        app.input.end_frame();
                    }
                    _ => {}
                }
            }
            WinitEvent::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        })
        .context("running event loop")?;

    Ok(())
}
