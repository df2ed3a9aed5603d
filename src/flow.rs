//! Flow control and application event loop.
//!
//! A "flow" is the application on top of the engine: it builds its scene in
//! `on_init`, reacts to input and updates simulation state each frame, and
//! issues its draws in `on_render`. [`run`] owns the window, the wgpu
//! [`Context`] and the [`Renderer`] and drives the flow from winit events.
//!
//! # Lifecycle Flow
//!
//! Each frame the event loop:
//! 1. Forwards window/device events to the flow and tracks pressed keys
//! 2. Moves the active camera from the keyboard and mouse
//! 3. Calls `on_update` with the frame delta
//! 4. Starts the frame, calls `on_render` and presents

use std::{collections::HashSet, fmt::Debug, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    camera::{Camera, CameraMovement},
    config::EngineConfig,
    context::Context,
    gpu::Gpu,
    render::Renderer,
};

/// Pixels of a touchpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 20.0;

/// Keys that move the active camera.
pub const MOVEMENT_BINDINGS: [(KeyCode, CameraMovement); 7] = [
    (KeyCode::KeyW, CameraMovement::Forward),
    (KeyCode::KeyS, CameraMovement::Backward),
    (KeyCode::KeyA, CameraMovement::Left),
    (KeyCode::KeyD, CameraMovement::Right),
    (KeyCode::Space, CameraMovement::Up),
    (KeyCode::ControlLeft, CameraMovement::Down),
    (KeyCode::ControlRight, CameraMovement::Down),
];

///
/// Output of the per-event hooks.
///
/// `Out::Configure` runs a closure against the renderer, for instance to
/// switch cameras or toggle wireframe rendering.
///
/// `Out::Exit` closes the window and ends the event loop.
///
/// `Empty` is the default output used when nothing needs to happen.
///
#[derive(Default)]
pub enum Out {
    Configure(Box<dyn FnOnce(&mut Renderer)>),
    Exit,
    #[default]
    Empty,
}

impl Debug for Out {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configure(_) => f.write_str("Configure(|&mut Renderer| {...})"),
            Self::Exit => f.write_str("Exit"),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

/// Trait for implementing the application drawn by [`run`].
pub trait GraphicsFlow {
    /// Called once after the window, the context and the configured camera
    /// exist. An error here ends the event loop and is returned by [`run`].
    fn on_init(&mut self, renderer: &mut Renderer, config: &EngineConfig) -> anyhow::Result<()>;

    /// Called every frame before rendering. The active camera already moved
    /// according to `input`.
    fn on_update(&mut self, _renderer: &mut Renderer, _input: &InputState, _dt: Duration) -> Out {
        Out::Empty
    }

    fn on_device_events(&mut self, _renderer: &mut Renderer, _event: &DeviceEvent) -> Out {
        Out::Empty
    }

    fn on_window_events(&mut self, _renderer: &mut Renderer, _event: &WindowEvent) -> Out {
        Out::Empty
    }

    /// Issues the frame's draws. The frame is cleared before and presented
    /// after this call.
    fn on_render(&mut self, renderer: &mut Renderer);
}

/// Keyboard and mouse state accumulated from window events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed: HashSet<KeyCode>,
    mouse_look: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press(code),
                        ElementState::Released => self.release(code),
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Right,
                ..
            } => self.mouse_look = state.is_pressed(),
            WindowEvent::Focused(false) => {
                self.pressed.clear();
                self.mouse_look = false;
            }
            _ => {}
        }
    }

    pub fn press(&mut self, key: KeyCode) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.pressed.remove(&key);
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn pressed_keys(&self) -> impl Iterator<Item = &KeyCode> {
        self.pressed.iter()
    }

    /// Whether mouse motion currently turns the camera (right button held).
    pub fn is_mouse_look(&self) -> bool {
        self.mouse_look
    }

    pub fn set_mouse_look(&mut self, enabled: bool) {
        self.mouse_look = enabled;
    }
}

/// Moves `camera` for every held movement key.
pub fn apply_camera_input(camera: &mut Camera, input: &InputState, dt: Duration) {
    let mut applied = HashSet::new();
    for (key, movement) in MOVEMENT_BINDINGS {
        // both control keys map to Down, move once
        if input.is_pressed(key) && applied.insert(movement) {
            camera.process_keyboard(movement, dt);
        }
    }
}

struct AppState {
    window: Arc<Window>,
    renderer: Renderer,
    width: u32,
    height: u32,
}

impl AppState {
    fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.renderer.gpu_mut().api_mut().set_viewport(width, height);
    }
}

struct App<F: GraphicsFlow> {
    config: EngineConfig,
    flow: F,
    state: Option<AppState>,
    input: InputState,
    last_time: Instant,
    error: Option<anyhow::Error>,
}

impl<F: GraphicsFlow> App<F> {
    fn new(config: EngineConfig, flow: F) -> Self {
        Self {
            config,
            flow,
            state: None,
            input: InputState::new(),
            last_time: Instant::now(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppState> {
        let window_config = &self.config.window;
        let window_attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let context = futures::executor::block_on(Context::new(window.clone(), window_config.vsync))?;
        let (width, height) = context.size();
        let mut renderer = Renderer::new(Gpu::new(context));
        renderer.set_wireframe_rendering(self.config.rendering.wireframe);

        let mut state = AppState {
            window,
            renderer,
            width,
            height,
        };
        let camera = self.config.camera.build(state.aspect());
        state.renderer.add_camera(camera);

        self.flow.on_init(&mut state.renderer, &self.config)?;
        log::info!("Initialized {}x{} window", width, height);
        Ok(state)
    }
}

impl<F: GraphicsFlow> ApplicationHandler for App<F> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
                self.last_time = Instant::now();
            }
            Err(e) => {
                log::error!("Initialization failed: {e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if self.input.is_mouse_look() {
                if let Some(camera) = state.renderer.active_camera_mut() {
                    // screen y grows downwards, pitch grows upwards
                    camera.process_mouse_movement(dx as f32, -dy as f32, true);
                }
            }
        }
        let out = self.flow.on_device_events(&mut state.renderer, &event);
        handle_flow_output(out, &mut state.renderer, event_loop);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        self.input.handle_window_event(&event);
        let out = self.flow.on_window_events(&mut state.renderer, &event);
        handle_flow_output(out, &mut state.renderer, event_loop);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                if let Some(camera) = state.renderer.active_camera_mut() {
                    // scrolling up narrows the field of view
                    camera.process_mouse_scroll(-lines);
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                let aspect = state.aspect();
                let camera_config = &self.config.camera;
                if let Some(camera) = state.renderer.active_camera_mut() {
                    apply_camera_input(camera, &self.input, dt);
                    camera.set_projection_matrix(camera.zoom(), aspect, camera_config.near, camera_config.far);
                }

                let out = self.flow.on_update(&mut state.renderer, &self.input, dt);
                handle_flow_output(out, &mut state.renderer, event_loop);

                state.renderer.init_frame(self.config.rendering.clear_color());
                self.flow.on_render(&mut state.renderer);
                if let Err(e) = state.renderer.end_frame() {
                    log::error!("Unable to render {e:#}");
                }
                state.window.request_redraw();
            }
            _ => {}
        }
    }
}

fn handle_flow_output(out: Out, renderer: &mut Renderer, event_loop: &ActiveEventLoop) {
    match out {
        Out::Configure(f) => f(renderer),
        Out::Exit => event_loop.exit(),
        Out::Empty => (),
    }
}

/// Opens a window and runs `flow` until the window closes. Fails only if the
/// event loop, the window or the graphics context cannot be created, or if
/// `on_init` fails.
pub fn run(config: EngineConfig, flow: impl GraphicsFlow) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, flow);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
