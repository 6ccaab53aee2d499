use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// A single-threaded, shared handle to a long-lived engine subsystem.
///
/// `StSystem` wraps `Rc<RefCell<Box<T>>>` so that GPU handles such as the device,
/// the queue and the buffer registry can be shared between the renderer, the camera
/// and every chunk mesh target without threading lifetimes through the engine.
/// All GPU work happens on the main thread, so no locking is involved.
///
/// # Examples
///
/// ```ignore
/// let counter = StSystem::new(Box::new(41u32));
/// let shared = counter.clone();
///
/// **shared.get_mut() += 1;
/// assert_eq!(**counter.get(), 42);
/// ```
///
/// # Panics
/// - `get_mut` panics while any other borrow of the same system is alive
/// - `get` panics while a mutable borrow is alive
pub struct StSystem<T: ?Sized> {
    pub system: Rc<RefCell<Box<T>>>,
}

impl<T: ?Sized> StSystem<T> {
    /// Creates a new `StSystem` containing the given boxed system.
    pub fn new(system: Box<T>) -> Self {
        Self {
            system: Rc::new(RefCell::new(system)),
        }
    }

    /// Returns an immutable borrow of the contained system.
    ///
    /// # Panics
    /// Panics if the value is currently mutably borrowed.
    pub fn get(&self) -> Ref<'_, Box<T>> {
        self.system.borrow()
    }

    /// Returns a mutable borrow of the contained system.
    ///
    /// # Panics
    /// Panics if the value is currently borrowed.
    pub fn get_mut(&self) -> RefMut<'_, Box<T>> {
        self.system.borrow_mut()
    }
}

impl<T: ?Sized> Clone for StSystem<T> {
    fn clone(&self) -> Self {
        Self {
            system: self.system.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_system() {
        let system = StSystem::new(Box::new(vec![1, 2, 3]));
        let clone = system.clone();

        clone.get_mut().push(4);

        assert_eq!(system.get().len(), 4);
    }
}
