//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Input handling and cursor capture
//! - The per-frame update and redraw
//! - Application lifecycle events

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{Graphics, GraphicsBuilder, MaybeGraphics};
use input_manager::InputManager;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{
    engine_state::{rendering::RenderStatus, EngineState},
    settings::Settings,
};

/// The main application state container that manages the application's lifecycle.
///
/// This struct holds the current state of the application, including graphics resources,
/// input handling, and window management. It implements `ApplicationHandler` to handle
/// window and device events.
pub struct ApplicationState {
    /// The current graphics state, which may be initializing or already handed over
    pub graphics: MaybeGraphics,

    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState>,

    /// Startup settings
    pub settings: Settings,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The core game engine state and logic
    pub engine_state: EngineState,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: web_time::Instant,
}

/// Captures and hides the cursor, or releases it.
///
/// `Locked` is not supported everywhere, so `Confined` is tried next.
fn apply_cursor_lock(window: &Window, locked: bool) {
    let result = if locked {
        window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };

    if let Err(err) = result {
        warn!("Could not change cursor grab: {}", err);
    }
    window.set_cursor_visible(!locked);
}

impl ApplicationState {
    /// Creates the application, waiting for the first `resumed` to build graphics.
    pub fn new(event_loop_proxy: EventLoopProxy<Graphics>, settings: Settings) -> Self {
        Self {
            graphics: MaybeGraphics::Builder(GraphicsBuilder::new(event_loop_proxy)),
            state: None,
            settings,
        }
    }

    /// Hands the graphics resources to a new engine.
    fn initialize_application_state(&mut self, event_loop: &ActiveEventLoop, gfx: Graphics) {
        let window = gfx.window;
        let engine_state = EngineState::new(
            gfx.surface,
            gfx.surface_config,
            gfx.device,
            gfx.queue,
            self.settings.clone(),
            gfx.assets,
        );

        match engine_state {
            Ok(engine_state) => {
                info!("Engine initialized; press Escape to capture the mouse");
                self.state = Some(InitializedApplicationState {
                    engine_state,
                    window,
                    input_manager: InputManager::new(),
                    last_wait_time: web_time::Instant::now(),
                });
            }
            Err(err) => {
                error!("Failed to initialize engine: {:#}", err);
                event_loop.exit();
            }
        }
        self.graphics = MaybeGraphics::Moved;
    }
}

impl ApplicationHandler<Graphics> for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };
        let input_manager = &mut state.input_manager;
        let engine_state = &mut state.engine_state;

        input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                engine_state.resize_surface(size);
            }
            WindowEvent::Focused(is_focused) => {
                if !is_focused {
                    input_manager.release_all();
                    if engine_state.mouse_locked() {
                        engine_state.set_mouse_locked(false);
                        apply_cursor_lock(&state.window, false);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if engine_state.render() == RenderStatus::Fatal {
                    event_loop.exit();
                }
            }
            _ => (),
        }
    }

    /// Accumulates raw mouse motion for the next frame.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.input_manager.intake_mouse_motion(delta);
            }
        }
    }

    /// Starts graphics initialization the first time the application is resumed.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop, &self.settings);
        }
    }

    /// Receives the initialized graphics resources.
    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: Graphics) {
        self.initialize_application_state(event_loop, graphics);
    }

    /// Runs one frame: input, simulation, then a redraw request.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };

        let now = web_time::Instant::now();
        let wait_dt = now - state.last_wait_time;
        state.last_wait_time = now;

        let was_locked = state.engine_state.mouse_locked();
        let processed_input = state.input_manager.get_and_reset_processed_input();
        state.engine_state.set_input_commands(processed_input);
        if state.engine_state.mouse_locked() != was_locked {
            apply_cursor_lock(&state.window, state.engine_state.mouse_locked());
        }

        if let Err(err) = state.engine_state.update(wait_dt) {
            error!("Frame update failed: {}", err);
            event_loop.exit();
            return;
        }

        state.window.request_redraw();
    }
}
