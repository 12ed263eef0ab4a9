//! Application state and main loop

use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{UVec2, Vec2};
use hashbrown::HashSet;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use terrain_core::{
    Action, CameraRig, Config, FrameClock, FrameUniforms, InputSnapshot, KeyMap,
    SceneParameterStore, TerrainMesh,
};

use crate::cursor::{CursorTracker, WindowCursor};
use crate::graphics::TerrainRenderer;

pub struct App {
    config: Config,
    mesh: TerrainMesh,
    key_map: KeyMap,
    camera: CameraRig,
    scene: SceneParameterStore,
    clock: FrameClock,
    /// Keys currently down, for continuous movement
    held_keys: HashSet<KeyCode>,
    cursor: CursorTracker,
    focused: bool,
    window: Option<Arc<Window>>,
    renderer: Option<TerrainRenderer>,
    should_exit: bool,
    /// Startup failure, reported after the event loop returns
    init_error: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config, mesh: TerrainMesh, key_map: KeyMap) -> Self {
        let camera = CameraRig::new(config.camera);
        let scene = SceneParameterStore::new(config.scene);
        Self {
            config,
            mesh,
            key_map,
            camera,
            scene,
            clock: FrameClock::new(),
            held_keys: HashSet::new(),
            cursor: CursorTracker::default(),
            focused: true,
            window: None,
            renderer: None,
            should_exit: false,
            init_error: None,
        }
    }

    fn fail(&mut self, error: anyhow::Error) {
        tracing::error!("{:#}", error);
        self.init_error = Some(error);
        self.should_exit = true;
    }

    fn capture_cursor(window: &Window) {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
        if let Err(e) = grabbed {
            tracing::warn!("Cursor grab unavailable: {}", e);
        }
        window.set_cursor_visible(false);
    }

    fn handle_key_input(&mut self, key_event: KeyEvent) {
        let PhysicalKey::Code(key_code) = key_event.physical_key else {
            return;
        };

        match key_event.state {
            ElementState::Pressed => {
                self.held_keys.insert(key_code);
                if key_event.repeat {
                    return;
                }
                if let Some(action) = self.key_map.action_for(key_code) {
                    self.handle_action(action);
                }
            }
            ElementState::Released => {
                self.held_keys.remove(&key_code);
            }
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                tracing::info!("Quit requested");
                self.should_exit = true;
            }
            Action::ReloadShader => {
                let Some(renderer) = &mut self.renderer else {
                    return;
                };
                if let Err(e) = renderer.reload_shader(&self.config.assets.shader) {
                    tracing::error!("Shader reload failed, keeping previous shader: {}", e);
                }
            }
            Action::Scene(action) => self.scene.apply(action),
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(new_size.width, new_size.height);
        }
        self.cursor.set_center(window_center(new_size));
    }

    fn render(&mut self) {
        let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
            return;
        };

        let elapsed = self.clock.tick();
        let size = window.inner_size();
        let input = InputSnapshot {
            movement: self.key_map.movement(&self.held_keys),
            window_size: UVec2::new(size.width, size.height),
        };

        let mut cursor = WindowCursor::new(window, &mut self.cursor, self.focused);
        self.camera.advance(&input, &mut cursor, elapsed);

        let uniforms = FrameUniforms::assemble(&self.camera, &self.scene, &self.mesh);
        renderer.render(&uniforms, self.scene.wireframe());
    }
}

fn window_center(size: PhysicalSize<u32>) -> Vec2 {
    InputSnapshot {
        window_size: UVec2::new(size.width, size.height),
        ..Default::default()
    }
    .window_center()
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(anyhow::Error::new(e).context("Failed to create window"));
                event_loop.exit();
                return;
            }
        };

        Self::capture_cursor(&window);
        self.cursor = CursorTracker::new(window_center(window.inner_size()));

        let renderer = match TerrainRenderer::new(
            window.clone(),
            self.config.window.vsync,
            &self.mesh,
            &self.config.assets.directory,
            &self.config.assets.shader,
        ) {
            Ok(r) => r,
            Err(e) => {
                self.fail(e.context("Failed to initialize graphics"));
                event_loop.exit();
                return;
            }
        };

        tracing::info!(
            points = self.mesh.point_count(),
            faces = self.mesh.face_count(),
            "Terrain ready"
        );
        self.renderer = Some(renderer);
        self.window = Some(window);
        self.clock.reset();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                self.should_exit = true;
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!("Window resized to {:?}", new_size);
                self.handle_resize(new_size);
            }
            WindowEvent::Focused(focused) => {
                self.focused = focused;
                self.cursor.reset();
                if !focused {
                    self.held_keys.clear();
                } else if let Some(window) = &self.window {
                    Self::capture_cursor(window);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor
                    .moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                self.handle_key_input(key_event);
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            _ => {}
        }

        if self.should_exit {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Request redraw for continuous rendering
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Open the window and run until quit or close.
///
/// # Errors
///
/// Returns an error if the event loop cannot start or the window or GPU
/// cannot be initialized.
pub fn run(config: Config, mesh: TerrainMesh, key_map: KeyMap) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, mesh, key_map);
    event_loop.run_app(&mut app).context("Event loop error")?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_center_halves_size() {
        assert_eq!(
            window_center(PhysicalSize::new(1268, 720)),
            Vec2::new(634.0, 360.0)
        );
        assert_eq!(window_center(PhysicalSize::new(5, 3)), Vec2::new(2.0, 1.0));
    }
}
