//! Navigation dropdowns. At most one is open at a time.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropdownNav {
    open: Option<usize>,
    count: usize,
}

impl DropdownNav {
    pub fn new(count: usize) -> Self {
        Self { open: None, count }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }

    pub fn open_index(&self) -> Option<usize> {
        self.open
    }

    /// Toggle dropdown `index`, closing any other. Out-of-range indexes are
    /// ignored. Returns whether `index` is now open.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.count {
            return false;
        }
        self.open = if self.open == Some(index) {
            None
        } else {
            Some(index)
        };
        self.is_open(index)
    }

    pub fn click_outside(&mut self) {
        self.open = None;
    }
}
