use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crossterm::event::KeyEvent;

type Handler = Rc<RefCell<dyn FnMut(&KeyEvent)>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

/// Window-scoped keyboard listeners. Every key event the host reads is
/// offered to each registered handler before normal routing.
#[derive(Clone, Default)]
pub struct KeyListeners {
    registry: Rc<RefCell<Registry>>,
}

impl KeyListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. It stays registered until the returned guard is dropped.
    pub fn subscribe(&self, handler: impl FnMut(&KeyEvent) + 'static) -> ListenerGuard {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        let handler: Handler = Rc::new(RefCell::new(handler));
        registry.handlers.push((id, handler));
        tracing::debug!(id, "key listener registered");
        ListenerGuard {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    pub fn dispatch(&self, key: &KeyEvent) {
        // Snapshot so handlers may subscribe or drop guards while running.
        let handlers: Vec<Handler> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            if let Ok(mut h) = handler.try_borrow_mut() {
                (*h)(key);
            }
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.registry.borrow().handlers.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes its listener from the registry when dropped.
#[must_use]
pub struct ListenerGuard {
    registry: Weak<RefCell<Registry>>,
    id: u64,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        // Best effort: a guard dropped from inside a dispatch still finds the
        // registry unborrowed because dispatch works on a snapshot.
        let borrowed = registry.try_borrow_mut();
        if let Ok(mut registry) = borrowed {
            registry.handlers.retain(|(id, _)| *id != self.id);
            tracing::debug!(id = self.id, "key listener released");
        }
    }
}
