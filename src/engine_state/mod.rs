//! # Engine State Module
//!
//! Ties the world, the player and the renderer together and runs one frame of the
//! game: queued block edits, player physics, the day clock and the camera upload.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns every subsystem and runs the frame
//! * `PlayerAction` - One frame of input, already mapped to game actions
//! * `voxels` - Terrain, chunks, the world and ray casting
//! * `player` / `physics` - The first-person body and its boxes
//! * `camera_state` / `rendering` - Turning all of it into pixels
//!
//! ## Frame Order
//!
//! 1. Apply queued edits within the edit budget (rebuilding the chunk mesh per edit)
//! 2. Move the player and resolve collisions
//! 3. Advance the clock
//! 4. Upload the camera uniform with the current sun height

use cgmath::{Deg, Point2, Point3};
use log::info;
use web_time::Duration;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::{
    application_state::input_state::ProcessedInputState, core::StSystem, settings::Settings,
};

use camera_state::{spawn_camera, CameraState};
use player::Player;
use rendering::{
    meshing::{ChunkDraw, GpuMeshTarget, MeshError},
    FrameContents, LoadedImage, MeshRendererManager, RenderStatus,
};
use voxels::{block::block_type::BlockType, world::World};

pub mod buffer_state;
pub mod camera_state;
pub mod day_cycle;
pub mod physics;
pub mod player;
pub mod rendering;
pub mod voxels;

/// Shader sources and textures the engine needs at startup.
pub struct EngineAssets {
    /// Block WGSL source
    pub block_shader: String,
    /// Debug line WGSL source
    pub debug_shader: String,
    /// Decoded block atlas
    pub atlas: LoadedImage,
}

/// Toggles flipped by key taps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineFlags {
    /// Whether the cursor is captured; look and movement only apply while it is
    pub mouse_locked: bool,
    /// Whether the player's boxes are outlined
    pub debug_boxes: bool,
}

/// The main state container for the sandbox.
pub struct EngineState {
    pub world: World,
    pub player: Player,
    pub camera_state: CameraState,
    pub render_manager: MeshRendererManager,
    pub buffer_state: StSystem<buffer_state::BufferState>,
    /// Block placed by a right click
    pub selected_block: BlockType,
    /// Day clock, see [`day_cycle`]
    pub time: f32,
    flags: EngineFlags,
    settings: Settings,
}

impl EngineState {
    /// Creates every subsystem and generates the chunk at the origin.
    ///
    /// # Errors
    /// Fails if the origin chunk's mesh cannot be built or the pipelines cannot
    /// be created.
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        settings: Settings,
        assets: EngineAssets,
    ) -> anyhow::Result<Self> {
        let device = StSystem::new(Box::new(device));
        let queue = StSystem::new(Box::new(queue));
        let buffer_state = StSystem::new(Box::new(buffer_state::BufferState::new(
            device.clone(),
            queue.clone(),
        )));

        let seed = settings.resolve_seed();
        info!("Generating world with seed {}", seed);

        let mut world = World::new(seed);
        let origin = Point2::new(0, 0);
        world.load_chunk(
            origin,
            Box::new(GpuMeshTarget::for_chunk(buffer_state.clone(), origin)),
        )?;

        let player = Player::new(spawn_camera());

        let camera_state = CameraState::new(
            buffer_state.clone(),
            &player.camera,
            (surface_config.width, surface_config.height),
            Deg(settings.fov_degrees),
        );

        let render_manager = MeshRendererManager::new(
            surface,
            surface_config,
            device,
            queue,
            buffer_state.clone(),
            &assets.block_shader,
            &assets.debug_shader,
            &assets.atlas,
        )?;

        Ok(Self {
            world,
            player,
            camera_state,
            render_manager,
            buffer_state,
            selected_block: BlockType::WATER,
            time: 0.0,
            flags: EngineFlags::default(),
            settings,
        })
    }

    /// Resizes the rendering surface and the projection.
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.render_manager.resize_surface(size);
        self.camera_state.resize(size.width, size.height);
    }

    /// Whether the cursor should currently be captured.
    pub fn mouse_locked(&self) -> bool {
        self.flags.mouse_locked
    }

    /// Captures or releases the cursor, e.g. when the window loses focus.
    pub fn set_mouse_locked(&mut self, locked: bool) {
        self.flags.mouse_locked = locked;
        if !locked {
            self.player.input.intake_actions(&PlayerAction::default());
        }
    }

    /// Applies one frame of input.
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        let actions = translate_processed_input(&input);
        self.apply_actions(&actions);
    }

    fn apply_actions(&mut self, actions: &PlayerAction) {
        if actions.toggle_mouse_lock {
            self.set_mouse_locked(!self.flags.mouse_locked);
            info!(
                "Mouse {}",
                if self.flags.mouse_locked { "locked" } else { "released" }
            );
        }

        if actions.toggle_debug_boxes {
            self.flags.debug_boxes = !self.flags.debug_boxes;
            let buffers = self.buffer_state.get();
            info!(
                "Debug boxes {}; GPU buffers hold {} bytes ({} used, {} writes)",
                if self.flags.debug_boxes { "on" } else { "off" },
                buffers.get_total_allocated_memory(),
                buffers.get_total_used_memory(),
                buffers.get_total_writes()
            );
        }

        if self.flags.mouse_locked {
            if let Some((dx, dy)) = actions.rotate_view {
                self.player
                    .look(dx as f32, dy as f32, self.settings.mouse_sensitivity);
            }
            self.player.input.intake_actions(actions);
        }

        if actions.scroll != 0.0 {
            self.selected_block = self
                .selected_block
                .cycle(-(actions.scroll.signum() as i32));
            info!("Selected {:?}", self.selected_block);
        }

        if actions.break_block {
            self.pick_block();
        }
        if actions.place_block {
            self.place_block();
        }
    }

    /// Queues removal of the block under the crosshair.
    pub fn pick_block(&mut self) -> Option<Point3<i32>> {
        let camera = &self.player.camera;
        self.world.pick_block(camera.position, camera.front())
    }

    /// Queues the selected block against the face under the crosshair.
    pub fn place_block(&mut self) -> Option<Point3<i32>> {
        let camera = &self.player.camera;
        self.world
            .place_block(camera.position, camera.front(), self.selected_block)
    }

    /// Advances the game by `dt`.
    ///
    /// # Errors
    /// Propagates failures to rebuild a chunk mesh after an edit.
    pub fn update(&mut self, dt: Duration) -> Result<(), MeshError> {
        self.world.process_queued_edits(self.settings.edit_budget())?;

        let dt = dt.as_secs_f32();
        self.player.update(dt, &self.world);

        self.time = day_cycle::advance(self.time, dt, self.settings.day_minutes);
        self.camera_state
            .update(&self.player.camera, day_cycle::sun_height(self.time));
        Ok(())
    }

    /// Renders the current frame.
    pub fn render(&mut self) -> RenderStatus {
        let chunks: Vec<ChunkDraw> = self
            .world
            .chunks()
            .map(|chunk| ChunkDraw {
                position: chunk.position(),
                draw_length: chunk.mesh().draw_length(),
            })
            .collect();

        let debug_boxes = if self.flags.debug_boxes {
            self.player.debug_boxes().to_vec()
        } else {
            Vec::new()
        };

        self.render_manager.render(&FrameContents {
            chunks: &chunks,
            debug_boxes: &debug_boxes,
            sky: day_cycle::sky_color(day_cycle::sun_height(self.time)),
        })
    }
}

/// Maps one frame of input to game actions.
///
/// Movement keys count while held, and also when tapped and released within the
/// frame. Toggles and clicks fire once per press.
pub fn translate_processed_input(input: &ProcessedInputState) -> PlayerAction {
    let held = |key| input.get_key_state(key).is_active() || input.key_tapped(key);

    PlayerAction {
        move_forward: held(KeyCode::KeyW),
        move_backward: held(KeyCode::KeyS),
        move_left: held(KeyCode::KeyA),
        move_right: held(KeyCode::KeyD),
        jump: held(KeyCode::Space),
        sprint: input.key_tapped(KeyCode::ControlLeft),
        rotate_view: input.get_mouse_delta(),
        break_block: input.button_tapped(MouseButton::Left),
        place_block: input.button_tapped(MouseButton::Right),
        scroll: input.scroll_lines,
        toggle_mouse_lock: input.key_tapped(KeyCode::Escape),
        toggle_debug_boxes: input.key_tapped(KeyCode::F3),
    }
}

/// Player actions derived from one frame of input.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerAction {
    /// Movement actions - true if the key is held
    pub(crate) move_forward: bool,
    pub(crate) move_backward: bool,
    pub(crate) move_left: bool,
    pub(crate) move_right: bool,
    pub(crate) jump: bool,
    /// Sprint latches on press; see [`player::MovementInput`]
    pub(crate) sprint: bool,

    /// Mouse motion this frame
    pub(crate) rotate_view: Option<(f64, f64)>,

    /// Actions that should only trigger on press, not hold
    pub(crate) break_block: bool,
    pub(crate) place_block: bool,
    pub(crate) toggle_mouse_lock: bool,
    pub(crate) toggle_debug_boxes: bool,

    /// Wheel lines; positive scrolls up
    pub(crate) scroll: f32,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::application_state::input_state::{RawInputState, Tap};

    use super::*;

    #[test]
    fn held_keys_move_and_taps_toggle() {
        let input = ProcessedInputState {
            keyboard_states: HashMap::from([
                (KeyCode::KeyW, RawInputState::Held),
                (KeyCode::KeyS, RawInputState::Released),
            ]),
            mouse_delta: Some((3.0, -2.0)),
            scroll_lines: -1.0,
            taps: vec![
                Tap::Key(KeyCode::Escape),
                Tap::Key(KeyCode::ControlLeft),
                Tap::Mouse(MouseButton::Right),
            ],
            ..ProcessedInputState::default()
        };

        let actions = translate_processed_input(&input);

        assert!(actions.move_forward && !actions.move_backward);
        assert!(actions.sprint);
        assert!(actions.toggle_mouse_lock && !actions.toggle_debug_boxes);
        assert!(actions.place_block && !actions.break_block);
        assert_eq!(actions.rotate_view, Some((3.0, -2.0)));
        assert_eq!(actions.scroll, -1.0);
    }

    #[test]
    fn a_tap_inside_one_frame_still_moves() {
        let input = ProcessedInputState {
            keyboard_states: HashMap::from([(KeyCode::Space, RawInputState::NotPressed)]),
            taps: vec![Tap::Key(KeyCode::Space)],
            ..ProcessedInputState::default()
        };

        assert!(translate_processed_input(&input).jump);
    }

    #[test]
    fn empty_input_does_nothing() {
        assert_eq!(
            translate_processed_input(&ProcessedInputState::default()),
            PlayerAction::default()
        );
    }
}
