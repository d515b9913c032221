use std::cell::Cell;
use std::rc::Rc;

/// Open/closed state of the full-screen image preview, owned by whoever hosts
/// the edit form.
pub trait PreviewToggle {
    fn is_open(&self) -> bool;
    fn set_open(&self, open: bool);
}

/// Shared boolean flag. Clones observe the same value.
#[derive(Debug, Clone, Default)]
pub struct SharedFlag(Rc<Cell<bool>>);

impl SharedFlag {
    pub fn new(open: bool) -> Self {
        Self(Rc::new(Cell::new(open)))
    }
}

impl PreviewToggle for SharedFlag {
    fn is_open(&self) -> bool {
        self.0.get()
    }

    fn set_open(&self, open: bool) {
        if self.0.replace(open) != open {
            tracing::debug!(open, "image preview toggled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = SharedFlag::new(false);
        let other = flag.clone();
        other.set_open(true);
        assert!(flag.is_open());
        flag.set_open(false);
        assert!(!other.is_open());
    }
}
