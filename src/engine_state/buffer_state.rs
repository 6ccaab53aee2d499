//! # Buffer State Module
//!
//! A registry of named GPU buffers. Chunk meshes, the camera uniform and the
//! debug-box geometry all live here, addressed by name.
//!
//! ## Key Features
//!
//! * Named buffers, so any owner of the registry can bind a buffer without holding it
//! * Bounds-checked writes that report errors instead of letting wgpu panic
//! * Per-buffer memory analytics
//!
//! ## Performance Considerations
//!
//! * Re-creating a buffer under an existing name drops the old one, which lets the
//!   driver orphan its storage instead of stalling on in-flight frames
//! * Writes go through `Queue::write_buffer`, staged and flushed on the next submit

use std::collections::HashMap;
use std::fmt;

use wgpu::{util::DeviceExt, Buffer, Device, Queue};

use crate::core::StSystem;

/// Analytics data for a GPU buffer
#[derive(Debug, Default, Clone, Copy)]
struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    allocated_memory: u64,
    /// Highest byte written so far
    used_memory: u64,
    /// Number of times the buffer has been written to
    times_written: u64,
}

/// Failure to write to a registered buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// No buffer is registered under the name.
    Missing(String),
    /// The write would run past the end of the buffer.
    OutOfBounds {
        name: String,
        offset: u64,
        len: u64,
        size: u64,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::Missing(name) => write!(f, "no GPU buffer named '{}'", name),
            BufferError::OutOfBounds {
                name,
                offset,
                len,
                size,
            } => write!(
                f,
                "write of {} bytes at offset {} overruns buffer '{}' of {} bytes",
                len, offset, name, size
            ),
        }
    }
}

impl std::error::Error for BufferError {}

/// Central manager for GPU buffers
///
/// # Examples
///
/// ```ignore
/// let mut buffer_state = BufferState::new(device, queue);
///
/// buffer_state.create_buffer(
///     "chunk_0_0_vertices",
///     wgpu::BufferDescriptor {
///         label: Some("chunk_0_0_vertices"),
///         size: 1024,
///         usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
///         mapped_at_creation: false,
///     },
/// );
///
/// buffer_state.write_buffer("chunk_0_0_vertices", 0, bytemuck::cast_slice(&vertices))?;
/// ```
pub struct BufferState {
    /// Reference to the GPU device
    pub device: StSystem<Device>,
    /// Reference to the GPU command queue
    pub queue: StSystem<Queue>,
    /// Map of buffer names to buffer objects
    buffers: HashMap<String, Buffer>,
    /// Analytics data for each buffer
    buffer_analytics: HashMap<String, BufferAnalytics>,
}

impl BufferState {
    /// Creates an empty buffer registry
    ///
    /// # Arguments
    ///
    /// * `device` - Reference to the GPU device
    /// * `queue` - Reference to the GPU command queue
    pub fn new(device: StSystem<Device>, queue: StSystem<Queue>) -> Self {
        Self {
            device,
            queue,
            buffers: HashMap::new(),
            buffer_analytics: HashMap::new(),
        }
    }

    /// Creates an uninitialized buffer, replacing any buffer with the same name
    ///
    /// # Arguments
    ///
    /// * `buffer_name` - Unique name for the buffer
    /// * `buffer_descriptor` - Buffer configuration descriptor
    pub fn create_buffer(&mut self, buffer_name: &str, buffer_descriptor: wgpu::BufferDescriptor) {
        let buffer = self.device.get().create_buffer(&buffer_descriptor);
        let analytics = BufferAnalytics {
            allocated_memory: buffer_descriptor.size,
            ..BufferAnalytics::default()
        };

        self.buffers.insert(buffer_name.to_owned(), buffer);
        self.buffer_analytics
            .insert(buffer_name.to_owned(), analytics);
    }

    /// Creates a buffer and fills it with initial contents
    ///
    /// # Arguments
    ///
    /// * `buffer_name` - Unique name for the buffer
    /// * `init_descriptor` - Buffer initialization descriptor with data
    pub fn create_buffer_init(
        &mut self,
        buffer_name: &str,
        init_descriptor: wgpu::util::BufferInitDescriptor,
    ) {
        let size = init_descriptor.contents.len() as u64;
        let buffer = self.device.get().create_buffer_init(&init_descriptor);

        self.buffers.insert(buffer_name.to_owned(), buffer);
        self.buffer_analytics.insert(
            buffer_name.to_owned(),
            BufferAnalytics {
                allocated_memory: size,
                used_memory: size,
                times_written: 1,
            },
        );
    }

    /// Writes raw bytes into a buffer
    ///
    /// # Arguments
    ///
    /// * `buffer_name` - Name of the buffer to write to
    /// * `offset` - Byte offset in the buffer to start writing
    /// * `data` - Raw byte data to write
    ///
    /// # Errors
    ///
    /// Fails if the buffer does not exist or the write would exceed its bounds
    pub fn write_buffer(
        &mut self,
        buffer_name: &str,
        offset: wgpu::BufferAddress,
        data: &[u8],
    ) -> Result<(), BufferError> {
        let (Some(buffer), Some(analytics)) = (
            self.buffers.get(buffer_name),
            self.buffer_analytics.get_mut(buffer_name),
        ) else {
            return Err(BufferError::Missing(buffer_name.to_owned()));
        };

        let data_size = data.len() as u64;
        if offset + data_size > analytics.allocated_memory {
            return Err(BufferError::OutOfBounds {
                name: buffer_name.to_owned(),
                offset,
                len: data_size,
                size: analytics.allocated_memory,
            });
        }

        self.queue.get().write_buffer(buffer, offset, data);
        analytics.used_memory = analytics.used_memory.max(offset + data_size);
        analytics.times_written += 1;
        Ok(())
    }

    /// Gets a buffer by name
    pub fn get_buffer(&self, buffer_name: &str) -> Option<&Buffer> {
        self.buffers.get(buffer_name)
    }

    /// Gets a binding resource for the entire buffer
    ///
    /// # Errors
    ///
    /// Fails if the buffer does not exist
    pub fn get_entire_binding(
        &self,
        buffer_name: &str,
    ) -> Result<wgpu::BindingResource<'_>, BufferError> {
        self.buffers
            .get(buffer_name)
            .map(Buffer::as_entire_binding)
            .ok_or_else(|| BufferError::Missing(buffer_name.to_owned()))
    }

    /// Gets the total allocated memory across all buffers, in bytes
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .map(|analytics| analytics.allocated_memory)
            .sum()
    }

    /// Gets the total used memory across all buffers, in bytes
    pub fn get_total_used_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .map(|analytics| analytics.used_memory)
            .sum()
    }

    /// Gets the number of writes issued across all buffers since they were (re)created
    pub fn get_total_writes(&self) -> u64 {
        self.buffer_analytics
            .values()
            .map(|analytics| analytics.times_written)
            .sum()
    }
}
