//! # Graphics Resources Builder
//!
//! Creates the window, the WebGPU device and surface, and loads the assets the
//! engine needs before its first frame.
//!
//! The main components are:
//! - `Graphics`: Holds all graphics-related resources
//! - `GraphicsBuilder`: Runs the asynchronous initialization and posts the result
//!   back to the event loop
//! - `MaybeGraphics`: Represents the various states of graphics initialization

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use log::{error, info};
use wgpu::{Device, PresentMode, Queue, Surface, SurfaceConfiguration};
use winit::{
    dpi::PhysicalSize,
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    engine_state::{rendering::load_image, EngineAssets},
    settings::Settings,
};

/// Block shader location, relative to the working directory.
pub const BLOCK_SHADER_PATH: &str = "assets/shaders/block.wgsl";
/// Debug line shader location.
pub const DEBUG_SHADER_PATH: &str = "assets/shaders/debug.wgsl";
/// Block atlas location.
pub const ATLAS_PATH: &str = "assets/textures/atlas.png";

/// Contains all graphics-related resources required by the application.
pub struct Graphics {
    pub window: Arc<Window>,
    pub surface: Surface<'static>,
    pub surface_config: SurfaceConfiguration,
    pub device: Device,
    pub queue: Queue,
    pub assets: EngineAssets,
}

/// Picks how frames are presented.
///
/// Without vsync the fastest available mode wins, so frames stay shorter than one
/// physics tick. `Fifo` is always supported and is the fallback.
pub fn choose_present_mode(available: &[PresentMode], vsync: bool) -> PresentMode {
    if vsync {
        return PresentMode::Fifo;
    }
    [PresentMode::Mailbox, PresentMode::Immediate]
        .into_iter()
        .find(|mode| available.contains(mode))
        .unwrap_or(PresentMode::Fifo)
}

/// Reads the shaders and the atlas from disk.
pub fn load_assets() -> anyhow::Result<EngineAssets> {
    let block_shader = std::fs::read_to_string(BLOCK_SHADER_PATH)
        .with_context(|| format!("failed to read {}", BLOCK_SHADER_PATH))?;
    let debug_shader = std::fs::read_to_string(DEBUG_SHADER_PATH)
        .with_context(|| format!("failed to read {}", DEBUG_SHADER_PATH))?;
    let atlas = load_image(ATLAS_PATH)?;

    Ok(EngineAssets {
        block_shader,
        debug_shader,
        atlas,
    })
}

/// Creates the window and starts initializing the GPU for it.
///
/// # Returns
/// A `Future` that resolves to the initialized `Graphics` when complete
fn create_graphics(
    event_loop: &ActiveEventLoop,
    settings: &Settings,
) -> anyhow::Result<impl Future<Output = anyhow::Result<Graphics>> + 'static> {
    let window_attrs = Window::default_attributes()
        .with_title("Voxel Sandbox")
        .with_inner_size(PhysicalSize::new(
            settings.window_width,
            settings.window_height,
        ));

    let window = Arc::new(
        event_loop
            .create_window(window_attrs)
            .context("failed to create window")?,
    );

    // The instance is a handle to our GPU
    // Backends::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance
        .create_surface(window.clone())
        .context("failed to create surface")?;

    let vsync = settings.vsync;

    Ok(async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open GPU device")?;

        let size = window.inner_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface supports no formats")?;
        let present_mode = choose_present_mode(&surface_caps.present_modes, vsync);
        info!("Presenting with {:?}", present_mode);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let assets = load_assets()?;

        Ok(Graphics {
            window,
            surface,
            surface_config,
            device,
            queue,
            assets,
        })
    })
}

/// Helper struct for managing the asynchronous initialization of graphics resources.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<Graphics>>,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// State during asynchronous graphics initialization
    Builder(GraphicsBuilder),

    /// State after graphics resources have been handed to the engine
    Moved,
}

impl GraphicsBuilder {
    /// Creates a new GraphicsBuilder with the specified event loop proxy.
    ///
    /// # Arguments
    /// * `event_loop_proxy` - Used to send the initialized graphics resources back to the main thread
    pub fn new(event_loop_proxy: EventLoopProxy<Graphics>) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
        }
    }

    /// Builds the graphics resources and sends them to the event loop.
    ///
    /// Any failure is logged and exits the event loop.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop, settings: &Settings) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // event_loop_proxy is already spent - we already constructed Graphics
            return;
        };

        let graphics = create_graphics(event_loop, settings).and_then(pollster::block_on);
        match graphics {
            Ok(gfx) => {
                if event_loop_proxy.send_event(gfx).is_err() {
                    error!("Event loop closed before graphics were ready");
                    event_loop.exit();
                }
            }
            Err(err) => {
                error!("Failed to initialize graphics: {:#}", err);
                event_loop.exit();
            }
        }
    }
}
