//! Visibility gate
//!
//! The animation runs only while the page is visible, the container is on
//! screen and the user has not asked for reduced motion. Each setter reports
//! whether the combined state flipped so the caller knows to start or stop.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    reduced_motion: bool,
    page_hidden: bool,
    in_view: bool,
}

impl Gate {
    /// The container counts as in view until an observer says otherwise
    pub fn new(reduced_motion: bool, page_hidden: bool) -> Self {
        Self {
            reduced_motion,
            page_hidden,
            in_view: true,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        !self.reduced_motion && !self.page_hidden && self.in_view
    }

    /// `Some(open)` if the gate changed state
    pub fn set_page_hidden(&mut self, hidden: bool) -> Option<bool> {
        self.update(|g| g.page_hidden = hidden)
    }

    pub fn set_in_view(&mut self, in_view: bool) -> Option<bool> {
        self.update(|g| g.in_view = in_view)
    }

    fn update(&mut self, change: impl FnOnce(&mut Self)) -> Option<bool> {
        let before = self.is_open();
        change(self);
        let after = self.is_open();
        (before != after).then_some(after)
    }
}
