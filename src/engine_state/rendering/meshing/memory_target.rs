//! CPU-side mesh storage so chunk meshing can be exercised without a GPU.

use std::{cell::RefCell, rc::Rc};

use super::{MeshBufferTarget, MeshError};

#[derive(Debug, Default)]
struct Storage {
    vertices: Vec<f32>,
    indices: Vec<u32>,
    allocations: usize,
}

/// Mesh storage in plain vectors. Clones share the same storage, so a test can
/// hand one clone to a `MeshBuffer` and inspect the writes through another.
#[derive(Debug, Default, Clone)]
pub struct MemoryTarget {
    storage: Rc<RefCell<Storage>>,
}

impl MemoryTarget {
    /// Snapshot of the vertex floats written since the last allocation.
    pub fn vertices(&self) -> Vec<f32> {
        self.storage.borrow().vertices.clone()
    }

    /// Snapshot of the indices written since the last allocation.
    pub fn indices(&self) -> Vec<u32> {
        self.storage.borrow().indices.clone()
    }

    /// How many times storage has been (re)allocated.
    pub fn allocations(&self) -> usize {
        self.storage.borrow().allocations
    }
}

fn write_at<T: Copy + Default>(storage: &mut Vec<T>, offset: usize, data: &[T]) {
    if storage.len() < offset + data.len() {
        storage.resize(offset + data.len(), T::default());
    }
    storage[offset..offset + data.len()].copy_from_slice(data);
}

impl MeshBufferTarget for MemoryTarget {
    fn allocate(&mut self, _vertex_capacity: usize, _index_capacity: usize) -> Result<(), MeshError> {
        let mut storage = self.storage.borrow_mut();
        storage.vertices.clear();
        storage.indices.clear();
        storage.allocations += 1;
        Ok(())
    }

    fn write_vertices(&mut self, offset: usize, vertices: &[f32]) -> Result<(), MeshError> {
        write_at(&mut self.storage.borrow_mut().vertices, offset, vertices);
        Ok(())
    }

    fn write_indices(&mut self, offset: usize, indices: &[u32]) -> Result<(), MeshError> {
        write_at(&mut self.storage.borrow_mut().indices, offset, indices);
        Ok(())
    }
}
