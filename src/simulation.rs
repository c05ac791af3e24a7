//! Simulation builder and runner

use crate::config::SceneConfig;
use crate::error::SimulationError;
use crate::field::{FieldConfig, ParticleField};
use crate::glyph::{
    AlphaMask, BitmapFont, FontSpec, GlyphRasterizer, GlyphSampler, LayoutConfig, OutlineFont,
};
use crate::gpu::{Camera, Renderer};
use crate::input::{Action, Input};
use crate::time::{Clock, ClockMode};
use crate::visuals::VisualConfig;
use glam::{Vec2, Vec3};
use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Radians of orbit per pixel of drag.
const ORBIT_SENSITIVITY: f32 = 0.005;

/// Builds a text-formation scene and runs it.
///
/// Use method chaining to configure, then call `.run()` to open a window or
/// `.run_headless(frames)` to simulate without one.
///
/// ```ignore
/// Simulation::new()
///     .with_text("HAPPY\nBIRTHDAY")
///     .with_layout(LayoutConfig::poster())
///     .with_visuals(|v| {
///         v.point_size(0.03).opacity(0.9);
///     })
///     .run()?;
/// ```
pub struct Simulation {
    scene: SceneConfig,
    title: String,
}

impl Simulation {
    /// Create a new simulation with default settings.
    pub fn new() -> Self {
        Self::from_scene(SceneConfig::default())
    }

    /// Start from a loaded scene file.
    pub fn from_scene(scene: SceneConfig) -> Self {
        Self {
            scene,
            title: "glyphfield".to_string(),
        }
    }

    /// Set the text to form. Lines are separated by `\n`.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.scene.text = text.into();
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.scene.layout = layout;
        self
    }

    /// Override only the font of the current layout.
    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.scene.layout.font = font;
        self
    }

    /// Draw glyphs from a TrueType/OpenType file instead of the built-in font.
    pub fn with_font_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.scene.font_file = Some(path.into());
        self
    }

    pub fn with_field(mut self, field: FieldConfig) -> Self {
        self.scene.field = field;
        self
    }

    /// Configure rendering in place.
    pub fn with_visuals<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut VisualConfig),
    {
        configure(&mut self.scene.visuals);
        self
    }

    pub fn with_clock(mut self, mode: ClockMode) -> Self {
        self.scene.clock = mode;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    /// The font file if one is set, else the layout's family looked up
    /// among the installed fonts. Anything that fails to load falls back to
    /// the built-in bitmap font.
    fn rasterizer(&self) -> Rasterizer {
        let spec = &self.scene.layout.font;
        let (loaded, source) = match &self.scene.font_file {
            Some(path) => (OutlineFont::from_file(path), path.display().to_string()),
            None if spec.is_builtin() => return Rasterizer::Bitmap(BitmapFont),
            None => (OutlineFont::from_system(spec), spec.family.clone()),
        };
        match loaded {
            Ok(font) => {
                log::debug!("using outline font {}", source);
                Rasterizer::Outline(font)
            }
            Err(e) => {
                log::warn!("{} ({}); using built-in bitmap font", e, source);
                Rasterizer::Bitmap(BitmapFont)
            }
        }
    }

    /// Draw the scene's text onto a fresh alpha surface.
    pub fn rasterize(&self) -> AlphaMask {
        GlyphSampler::new(self.rasterizer()).rasterize(&self.scene.text, &self.scene.layout)
    }

    /// Sample the scene's text into world-space target points.
    pub fn build_targets(&self) -> Vec<Vec3> {
        let sampler = GlyphSampler::new(self.rasterizer());
        let mut sampler = match self.scene.field.seed {
            Some(seed) => sampler.with_seed(seed),
            None => sampler,
        };
        sampler.sample(&self.scene.text, &self.scene.layout)
    }

    /// Sample the text and scatter a field bound to it.
    pub fn build_field(&self) -> ParticleField {
        let targets = self.build_targets();
        if targets.is_empty() {
            log::warn!("text produced no target points; every particle will idle");
        }
        ParticleField::new(self.scene.field.clone(), targets)
    }

    /// Step a fresh field `frames` times at the clock's nominal rate.
    pub fn run_headless(&self, frames: u64) -> ParticleField {
        let mut field = self.build_field();
        let dt = self.scene.clock.nominal_step();
        for _ in 0..frames {
            field.step(dt);
        }
        field
    }

    /// Open a window and animate until it is closed.
    pub fn run(self) -> Result<(), SimulationError> {
        let field = self.build_field();

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(field, self.scene, self.title);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

/// Font chosen at startup.
enum Rasterizer {
    Bitmap(BitmapFont),
    Outline(OutlineFont),
}

impl GlyphRasterizer for Rasterizer {
    fn line_height(&self, font: &FontSpec) -> f32 {
        match self {
            Rasterizer::Bitmap(r) => r.line_height(font),
            Rasterizer::Outline(r) => r.line_height(font),
        }
    }

    fn line_width(&self, line: &str, font: &FontSpec) -> f32 {
        match self {
            Rasterizer::Bitmap(r) => r.line_width(line, font),
            Rasterizer::Outline(r) => r.line_width(line, font),
        }
    }

    fn draw_line(&self, mask: &mut AlphaMask, line: &str, font: &FontSpec, center: Vec2) {
        match self {
            Rasterizer::Bitmap(r) => r.draw_line(mask, line, font, center),
            Rasterizer::Outline(r) => r.draw_line(mask, line, font, center),
        }
    }

    fn face_weight(&self) -> u16 {
        match self {
            Rasterizer::Bitmap(r) => r.face_weight(),
            Rasterizer::Outline(r) => r.face_weight(),
        }
    }
}

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    field: ParticleField,
    clock: Clock,
    camera: Camera,
    input: Input,
    visuals: VisualConfig,
    title: String,
    rotation: f32,
    last_title_frame: u64,
    error: Option<SimulationError>,
}

impl App {
    fn new(field: ParticleField, scene: SceneConfig, title: String) -> Self {
        Self {
            window: None,
            renderer: None,
            field,
            clock: Clock::new(scene.clock),
            camera: Camera::new(),
            input: Input::new(),
            visuals: scene.visuals,
            title,
            rotation: 0.0,
            last_title_frame: 0,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());

        let renderer =
            pollster::block_on(Renderer::new(window, self.field.colors(), &self.visuals))?;
        renderer.upload_positions(self.field.positions());
        self.renderer = Some(renderer);
        Ok(())
    }

    fn apply_input(&mut self, event_loop: &ActiveEventLoop) {
        let drag = self.input.drag_delta();
        if drag != Vec2::ZERO {
            self.camera
                .rotate(-drag.x * ORBIT_SENSITIVITY, drag.y * ORBIT_SENSITIVITY);
        }
        let scroll = self.input.scroll_delta();
        if scroll != 0.0 {
            self.camera.zoom(scroll);
        }

        let actions: Vec<Action> = self.input.actions().collect();
        for action in actions {
            match action {
                Action::TogglePause => {
                    self.clock.toggle_pause();
                    log::debug!("paused: {}", self.clock.is_paused());
                }
                Action::Reset => {
                    self.field.reset();
                    log::debug!("field reset");
                }
                Action::Quit => event_loop.exit(),
            }
        }
        self.input.begin_frame();
    }

    fn update_title(&mut self) {
        // fps is refreshed twice a second; no need to touch the title every frame
        if self.clock.frame() - self.last_title_frame < 30 {
            return;
        }
        self.last_title_frame = self.clock.frame();
        if let Some(window) = &self.window {
            let state = if self.clock.is_paused() { " [paused]" } else { "" };
            window.set_title(&format!(
                "{} - {:.0} fps{}",
                self.title,
                self.clock.fps(),
                state
            ));
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.apply_input(event_loop);

        let dt = self.clock.tick();
        if dt > 0.0 {
            self.field.step(dt);
            self.rotation += self.visuals.auto_rotate;
        }
        self.camera.update();
        self.update_title();

        let Some(renderer) = &mut self.renderer else {
            return;
        };
        renderer.upload_positions(self.field.positions());
        match renderer.render(&self.camera, self.rotation) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = winit::dpi::PhysicalSize {
                    width: renderer.config.width,
                    height: renderer.config.height,
                };
                renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::error!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
